use application::transfer::{BookCreation, BookDto};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct BookCreatedResponse {
    id: Uuid,
}

impl IntoResponse for BookCreatedResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorMessageResponse {
    message: String,
}

impl IntoResponse for ErrorMessageResponse {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

/// Create outcomes map to 201 with the (possibly revived) identity, or 400
/// with the duplicate/validation message.
pub struct BookCreationResponse(BookCreation);

impl From<BookCreation> for BookCreationResponse {
    fn from(value: BookCreation) -> Self {
        Self(value)
    }
}

impl IntoResponse for BookCreationResponse {
    fn into_response(self) -> Response {
        match self.0.id() {
            Some(id) => BookCreatedResponse { id }.into_response(),
            None => ErrorMessageResponse {
                message: self.0.warning().unwrap_or_default(),
            }
            .into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookWarningsResponse {
    message: String,
    warnings: Vec<String>,
}

impl BookWarningsResponse {
    pub fn from_warnings(warnings: Vec<String>) -> Response {
        if warnings.is_empty() {
            StatusCode::CREATED.into_response()
        } else {
            (
                StatusCode::BAD_REQUEST,
                Json(Self {
                    message: "Some books were not added due to duplicates.".to_string(),
                    warnings,
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    id: Uuid,
    title: String,
    author_name: String,
    publication_year: i32,
    views_count: i64,
    popularity_score: f64,
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
        Self {
            id: value.id,
            title: value.title,
            author_name: value.author_name,
            publication_year: value.publication_year,
            views_count: value.views_count,
            popularity_score: value.popularity_score,
        }
    }
}

impl IntoResponse for BookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

mod request;
mod response;

use crate::error::ErrorStatus;
use crate::handler::AppModule;
use crate::route::book::request::{CreateBookRequest, GetBookPageRequest, UpdateBookRequest};
use crate::route::book::response::{BookCreationResponse, BookResponse, BookWarningsResponse};
use application::service::{
    CreateBookService, CreateManyBookService, GetBookPageService, GetBookService,
    SoftDeleteBookService, SoftDeleteManyBookService, UpdateBookService,
};
use application::transfer::{DeleteBookDto, DeleteManyBookDto, GetBookDto};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

pub trait BookRouter {
    fn route_book(self) -> Self;
}

impl BookRouter for Router<AppModule> {
    fn route_book(self) -> Self {
        self.route(
            "/books",
            get(
                |State(module): State<AppModule>, Query(req): Query<GetBookPageRequest>| async move {
                    module
                        .pgpool()
                        .get_book_page(req.into())
                        .await
                        .map(Json)
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateBookRequest>| async move {
                    module
                        .pgpool()
                        .create_book(req.into())
                        .await
                        .map(BookCreationResponse::from)
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Json(ids): Json<Vec<Uuid>>| async move {
                    module
                        .pgpool()
                        .soft_delete_many_books(DeleteManyBookDto { ids })
                        .await
                        .map(|_| StatusCode::NO_CONTENT)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/many",
            post(
                |State(module): State<AppModule>, Json(reqs): Json<Vec<CreateBookRequest>>| async move {
                    module
                        .pgpool()
                        .create_many_books(reqs.into_iter().map(Into::into).collect())
                        .await
                        .map(BookWarningsResponse::from_warnings)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/books/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    module
                        .pgpool()
                        .get_book(GetBookDto { id })
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|found| {
                            found
                                .map(BookResponse::from)
                                .map(BookResponse::into_response)
                                .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response())
                        })
                },
            )
            .put(
                |State(module): State<AppModule>,
                 Path(id): Path<Uuid>,
                 Json(req): Json<UpdateBookRequest>| async move {
                    module
                        .pgpool()
                        .update_book(req.into_dto(id))
                        .await
                        .map(|_| StatusCode::NO_CONTENT)
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<Uuid>| async move {
                    module
                        .pgpool()
                        .soft_delete_book(DeleteBookDto { id })
                        .await
                        .map(|_| StatusCode::NO_CONTENT)
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}

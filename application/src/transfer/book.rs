use uuid::Uuid;

use kernel::prelude::entity::{Book, DestructBook, PageNumber, PageSize};

#[derive(Debug, Clone, PartialEq)]
pub struct BookDto {
    pub id: Uuid,
    pub title: String,
    pub author_name: String,
    pub publication_year: i32,
    pub views_count: i64,
    pub popularity_score: f64,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        // Score is derived at conversion time; it lives only in the response.
        let score = value.popularity();
        let DestructBook {
            id,
            title,
            author,
            published_year,
            views,
            ..
        } = value.into_destruct();
        Self {
            id: id.into(),
            title: title.into(),
            author_name: author.into(),
            publication_year: published_year.into(),
            views_count: views.into(),
            popularity_score: score.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GetBookPageDto {
    pub page: PageNumber,
    pub page_size: PageSize,
}

#[derive(Debug, Clone)]
pub struct GetBookDto {
    pub id: Uuid,
}

#[derive(Debug, Clone)]
pub struct CreateBookDto {
    pub title: String,
    pub author_name: String,
    pub publication_year: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateBookDto {
    pub id: Uuid,
    pub title: String,
    pub author_name: String,
    pub publication_year: i32,
}

#[derive(Debug, Clone)]
pub struct DeleteBookDto {
    pub id: Uuid,
}

#[derive(Debug, Clone)]
pub struct DeleteManyBookDto {
    pub ids: Vec<Uuid>,
}

/// Structured outcome of a single create request. Duplicate titles and
/// invalid payloads are results rather than faults so bulk creation can keep
/// going past them.
#[derive(Debug, Clone, PartialEq)]
pub enum BookCreation {
    Created { id: Uuid },
    Revived { id: Uuid },
    Duplicate { title: String },
    Rejected { reason: String },
}

impl BookCreation {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            BookCreation::Created { id } | BookCreation::Revived { id } => Some(*id),
            _ => None,
        }
    }

    pub fn warning(&self) -> Option<String> {
        match self {
            BookCreation::Duplicate { title } => {
                Some(format!("Book with this title {title} already exists"))
            }
            BookCreation::Rejected { reason } => Some(reason.clone()),
            _ => None,
        }
    }
}

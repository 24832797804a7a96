mod author;
mod id;
mod popularity;
mod title;
mod views;
mod year;

pub use self::{author::*, id::*, popularity::*, title::*, views::*, year::*};
use crate::entity::common::{DeletedAt, IsDeleted};
use crate::KernelError;
use destructure::{Destructure, Mutation};
use error_stack::Report;
use time::OffsetDateTime;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: BookAuthor,
    published_year: PublishedYear,
    views: ViewCount,
    is_deleted: IsDeleted<Book>,
    deleted_at: Option<DeletedAt<Book>>,
}

impl Book {
    /// Rehydrates a book from already-persisted state. Invariants are assumed
    /// to hold for stored rows; new books go through [`Book::create`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookId,
        title: BookTitle,
        author: BookAuthor,
        published_year: PublishedYear,
        views: ViewCount,
        is_deleted: IsDeleted<Book>,
        deleted_at: Option<DeletedAt<Book>>,
    ) -> Self {
        Self {
            id,
            title,
            author,
            published_year,
            views,
            is_deleted,
            deleted_at,
        }
    }

    /// Validating factory for fresh books. Rejects blank titles/authors and
    /// non-positive years; everything else starts active with zero views.
    pub fn create(
        id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        published_year: i32,
    ) -> error_stack::Result<Self, KernelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Report::new(KernelError::Validation(
                "Title cannot be empty".to_string(),
            )));
        }
        let author = author.into();
        if author.trim().is_empty() {
            return Err(Report::new(KernelError::Validation(
                "Author name cannot be empty".to_string(),
            )));
        }
        if published_year <= 0 {
            return Err(Report::new(KernelError::Validation(
                "Publication year must be positive".to_string(),
            )));
        }
        Ok(Self::new(
            id,
            BookTitle::new(title),
            BookAuthor::new(author),
            PublishedYear::new(published_year),
            ViewCount::default(),
            IsDeleted::new(false),
            None,
        ))
    }

    /// Derived ranking value, evaluated against the current UTC year. Never
    /// persisted; always recomputed from views and publication age.
    pub fn popularity(&self) -> PopularityScore {
        self.popularity_at(OffsetDateTime::now_utc().year())
    }

    pub fn popularity_at(&self, current_year: i32) -> PopularityScore {
        let views = *self.views.as_ref() as f64;
        let age = (current_year - *self.published_year.as_ref()) as f64;
        PopularityScore::new(views * 0.5 + age * 2.0)
    }
}

#[cfg(test)]
mod test {
    use crate::entity::{Book, BookId, ViewCount};

    fn id() -> BookId {
        BookId::new(uuid::Uuid::new_v4())
    }

    #[test]
    fn create_rejects_blank_title() {
        assert!(Book::create(id(), "  ", "Shirley Jackson", 1959).is_err());
    }

    #[test]
    fn create_rejects_blank_author() {
        assert!(Book::create(id(), "The Haunting of Hill House", "", 1959).is_err());
    }

    #[test]
    fn create_rejects_non_positive_year() {
        assert!(Book::create(id(), "The Haunting of Hill House", "Shirley Jackson", 0).is_err());
        assert!(Book::create(id(), "The Haunting of Hill House", "Shirley Jackson", -3).is_err());
    }

    #[test]
    fn fresh_book_is_active_with_zero_views() {
        let book = Book::create(id(), "Piranesi", "Susanna Clarke", 2020).unwrap();
        assert_eq!(book.views(), &ViewCount::new(0));
        assert!(!*book.is_deleted().as_ref());
        assert!(book.deleted_at().is_none());
    }

    #[test]
    fn popularity_follows_views_and_age() {
        let book = Book::create(id(), "Piranesi", "Susanna Clarke", 2020).unwrap();
        assert_eq!(*book.popularity_at(2024).as_ref(), 8.0);

        let busier = book.clone().reconstruct(|b| b.views = ViewCount::new(10));
        assert_eq!(*busier.popularity_at(2024).as_ref(), 13.0);
    }

    #[test]
    fn popularity_is_monotone_in_views() {
        let book = Book::create(id(), "Piranesi", "Susanna Clarke", 2020).unwrap();
        let mut last = *book.popularity_at(2024).as_ref();
        for views in 1..50i64 {
            let next = book.clone().reconstruct(|b| b.views = ViewCount::new(views));
            let score = *next.popularity_at(2024).as_ref();
            assert!(score >= last);
            last = score;
        }
    }
}

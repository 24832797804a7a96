use crate::database::{DatabaseConnection, DependOnDatabaseConnection};
use crate::entity::{Book, BookId, BookTitle, PageNumber, PageSize};
use crate::KernelError;

/// Read side of the book repository.
#[async_trait::async_trait]
pub trait BookQuery: 'static + Sync + Send {
    type Connection: Send;

    /// Titles of non-deleted books ordered by descending view count (ties in
    /// storage-native order), skipping `(page - 1) * page_size` records.
    /// Normalizing out-of-range arguments is the caller's job.
    async fn list_titles_by_page(
        &self,
        con: &mut Self::Connection,
        page: &PageNumber,
        page_size: &PageSize,
    ) -> error_stack::Result<Vec<BookTitle>, KernelError>;

    /// Point lookup, filtered to non-deleted books.
    async fn find_by_id(
        &self,
        con: &mut Self::Connection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError>;

    /// Exact-match title lookup, NOT filtered by deletion state. Callers must
    /// inspect the deletion flag themselves; this is what makes
    /// revival-on-create possible.
    async fn find_by_title(
        &self,
        con: &mut Self::Connection,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError>;

    /// Every title regardless of deletion state, for diagnostic/bulk use.
    async fn list_all_titles(
        &self,
        con: &mut Self::Connection,
    ) -> error_stack::Result<Vec<BookTitle>, KernelError>;
}

pub trait DependOnBookQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookQuery: BookQuery<
        Connection = <Self::DatabaseConnection as DatabaseConnection>::Connection,
    >;
    fn book_query(&self) -> &Self::BookQuery;
}

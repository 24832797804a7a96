use crate::database::{DatabaseConnection, DependOnDatabaseConnection};
use crate::entity::{Book, BookId};
use crate::KernelError;

/// Write side of the book repository. Each operation is a single atomic
/// statement at the storage layer; no multi-record transactions exist here.
#[async_trait::async_trait]
pub trait BookModifier: 'static + Sync + Send {
    type Connection: Send;

    /// Appends a new record. Fails with [`KernelError::Conflict`] when the
    /// identity already exists (identities are caller-generated).
    async fn insert(
        &self,
        con: &mut Self::Connection,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;

    /// Best-effort bulk insert. Not atomic; partial failure is the caller's
    /// responsibility to detect through subsequent checks.
    async fn insert_many(
        &self,
        con: &mut Self::Connection,
        books: &[Book],
    ) -> error_stack::Result<(), KernelError>;

    /// Full overwrite of the record at `id`. Fails with
    /// [`KernelError::NotFound`] when the identity is absent.
    async fn replace(
        &self,
        con: &mut Self::Connection,
        id: &BookId,
        book: &Book,
    ) -> error_stack::Result<(), KernelError>;

    /// Raises the deletion flag and stamps the deletion time. No-op for
    /// absent or already-deleted identities; an earlier deletion keeps its
    /// original timestamp.
    async fn soft_delete(
        &self,
        con: &mut Self::Connection,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError>;

    async fn soft_delete_many(
        &self,
        con: &mut Self::Connection,
        ids: &[BookId],
    ) -> error_stack::Result<(), KernelError>;

    /// Atomically adds exactly 1 to the view count. No-op when absent.
    async fn increment_views(
        &self,
        con: &mut Self::Connection,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError>;
}

pub trait DependOnBookModifier: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookModifier: BookModifier<
        Connection = <Self::DatabaseConnection as DatabaseConnection>::Connection,
    >;
    fn book_modifier(&self) -> &Self::BookModifier;
}

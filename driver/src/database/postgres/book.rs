use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, Postgres};
use time::OffsetDateTime;
use uuid::Uuid;

use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{
    Book, BookAuthor, BookId, BookTitle, DeletedAt, IsDeleted, PageNumber, PageSize,
    PublishedYear, ViewCount,
};
use kernel::KernelError;

use crate::database::postgres::PostgresDatabase;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

impl DependOnBookQuery for PostgresDatabase {
    type BookQuery = PostgresBookRepository;
    fn book_query(&self) -> &PostgresBookRepository {
        self.book_repository()
    }
}

impl DependOnBookModifier for PostgresDatabase {
    type BookModifier = PostgresBookRepository;
    fn book_modifier(&self) -> &PostgresBookRepository {
        self.book_repository()
    }
}

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Connection = PoolConnection<Postgres>;

    async fn list_titles_by_page(
        &self,
        con: &mut PoolConnection<Postgres>,
        page: &PageNumber,
        page_size: &PageSize,
    ) -> error_stack::Result<Vec<BookTitle>, KernelError> {
        PgBookInternal::list_titles_by_page(con, page, page_size).await
    }

    async fn find_by_id(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_id(con, id).await
    }

    async fn find_by_title(
        &self,
        con: &mut PoolConnection<Postgres>,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_title(con, title).await
    }

    async fn list_all_titles(
        &self,
        con: &mut PoolConnection<Postgres>,
    ) -> error_stack::Result<Vec<BookTitle>, KernelError> {
        PgBookInternal::list_all_titles(con).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Connection = PoolConnection<Postgres>;

    async fn insert(
        &self,
        con: &mut PoolConnection<Postgres>,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::insert(con, book).await
    }

    async fn insert_many(
        &self,
        con: &mut PoolConnection<Postgres>,
        books: &[Book],
    ) -> error_stack::Result<(), KernelError> {
        // Best effort: plain sequential inserts, no surrounding transaction.
        for book in books {
            PgBookInternal::insert(con, book).await?;
        }
        Ok(())
    }

    async fn replace(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &BookId,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::replace(con, id, book).await
    }

    async fn soft_delete(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::soft_delete(con, id).await
    }

    async fn soft_delete_many(
        &self,
        con: &mut PoolConnection<Postgres>,
        ids: &[BookId],
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::soft_delete_many(con, ids).await
    }

    async fn increment_views(
        &self,
        con: &mut PoolConnection<Postgres>,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::increment_views(con, id).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author_name: String,
    publication_year: i32,
    views_count: i64,
    is_deleted: bool,
    deleted_at: Option<OffsetDateTime>,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookId::new(value.id),
            BookTitle::new(value.title),
            BookAuthor::new(value.author_name),
            PublishedYear::new(value.publication_year),
            ViewCount::new(value.views_count),
            IsDeleted::new(value.is_deleted),
            value.deleted_at.map(DeletedAt::new),
        )
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn list_titles_by_page(
        con: &mut PgConnection,
        page: &PageNumber,
        page_size: &PageSize,
    ) -> error_stack::Result<Vec<BookTitle>, KernelError> {
        let size = i64::from(*page_size.as_ref());
        let skip = i64::from(*page.as_ref() - 1) * size;
        let titles = sqlx::query_scalar::<_, String>(
            // language=postgresql
            r#"
            SELECT title
            FROM books
            WHERE is_deleted = FALSE
            ORDER BY views_count DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(size)
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(titles.into_iter().map(BookTitle::new).collect())
    }

    async fn find_by_id(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author_name, publication_year, views_count, is_deleted, deleted_at
            FROM books
            WHERE id = $1
              AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn find_by_title(
        con: &mut PgConnection,
        title: &BookTitle,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        // Deliberately unfiltered by is_deleted; revival depends on finding
        // soft-deleted rows here.
        let row = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT id, title, author_name, publication_year, views_count, is_deleted, deleted_at
            FROM books
            WHERE title = $1
            LIMIT 1
            "#,
        )
        .bind(title.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn list_all_titles(
        con: &mut PgConnection,
    ) -> error_stack::Result<Vec<BookTitle>, KernelError> {
        let titles = sqlx::query_scalar::<_, String>(
            // language=postgresql
            r#"
            SELECT title
            FROM books
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(titles.into_iter().map(BookTitle::new).collect())
    }

    async fn insert(con: &mut PgConnection, book: &Book) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO books (id, title, author_name, publication_year, views_count, is_deleted, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(book.id().as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.published_year().as_ref())
        .bind(book.views().as_ref())
        .bind(book.is_deleted().as_ref())
        .bind(book.deleted_at().as_ref().map(|at| *at.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn replace(
        con: &mut PgConnection,
        id: &BookId,
        book: &Book,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author_name = $3,
                publication_year = $4,
                views_count = $5,
                is_deleted = $6,
                deleted_at = $7
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .bind(book.title().as_ref())
        .bind(book.author().as_ref())
        .bind(book.published_year().as_ref())
        .bind(book.views().as_ref())
        .bind(book.is_deleted().as_ref())
        .bind(book.deleted_at().as_ref().map(|at| *at.as_ref()))
        .execute(con)
        .await
        .convert_error()?;
        if result.rows_affected() == 0 {
            return Err(error_stack::Report::new(KernelError::NotFound));
        }
        Ok(())
    }

    async fn soft_delete(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        // Already-deleted rows keep their original deleted_at.
        // language=postgresql
        sqlx::query(
            r#"
            UPDATE books
            SET is_deleted = TRUE, deleted_at = now()
            WHERE id = $1
              AND is_deleted = FALSE
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn soft_delete_many(
        con: &mut PgConnection,
        ids: &[BookId],
    ) -> error_stack::Result<(), KernelError> {
        let ids = ids.iter().map(|id| *id.as_ref()).collect::<Vec<Uuid>>();
        // language=postgresql
        sqlx::query(
            r#"
            UPDATE books
            SET is_deleted = TRUE, deleted_at = now()
            WHERE id = ANY($1)
              AND is_deleted = FALSE
            "#,
        )
        .bind(&ids)
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn increment_views(
        con: &mut PgConnection,
        id: &BookId,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            UPDATE books
            SET views_count = views_count + 1
            WHERE id = $1
            "#,
        )
        .bind(id.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::BookQuery;
    use kernel::interface::update::BookModifier;
    use kernel::prelude::entity::{Book, BookId, BookTitle, PageNumber, PageSize, ViewCount};
    use kernel::KernelError;
    use rand::distributions::{Alphanumeric, DistString};

    use crate::database::postgres::book::PostgresBookRepository;
    use crate::database::postgres::PostgresDatabase;

    fn random_title(prefix: &str) -> String {
        let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 8);
        format!("{prefix}-{suffix}")
    }

    #[test_with::env(POSTGRES_TEST)]
    #[tokio::test]
    async fn test() -> error_stack::Result<(), KernelError> {
        let db = PostgresDatabase::new().await?;
        let mut con = db.acquire().await?;
        let repository = PostgresBookRepository;

        let id = BookId::new(uuid::Uuid::new_v4());
        let title = random_title("postgres-book");
        let book = Book::create(id.clone(), title.clone(), "test author", 1999)?;
        repository.insert(&mut con, &book).await?;

        let found = repository.find_by_id(&mut con, &id).await?;
        assert_eq!(found, Some(book.clone()));

        // Identity collisions surface as conflicts.
        let collision = Book::create(id.clone(), random_title("collision"), "other", 2001)?;
        let conflict = repository.insert(&mut con, &collision).await;
        assert!(conflict.is_err());

        repository.increment_views(&mut con, &id).await?;
        let found = repository
            .find_by_id(&mut con, &id)
            .await?
            .expect("book must still exist");
        assert_eq!(found.views(), &ViewCount::new(1));

        let page = repository
            .list_titles_by_page(&mut con, &PageNumber::new(1), &PageSize::new(1000))
            .await?;
        assert!(page.contains(&BookTitle::new(title.clone())));

        repository.soft_delete(&mut con, &id).await?;
        let found = repository.find_by_id(&mut con, &id).await?;
        assert!(found.is_none());

        // Title lookup still resolves soft-deleted rows.
        let by_title = repository
            .find_by_title(&mut con, &BookTitle::new(title.clone()))
            .await?
            .expect("soft-deleted row must stay findable by title");
        assert!(*by_title.is_deleted().as_ref());
        assert!(by_title.deleted_at().is_some());

        let page = repository
            .list_titles_by_page(&mut con, &PageNumber::new(1), &PageSize::new(1000))
            .await?;
        assert!(!page.contains(&BookTitle::new(title.clone())));

        // Deleting again (or deleting unknown ids) is a no-op, not an error.
        repository
            .soft_delete_many(&mut con, &[id.clone(), BookId::new(uuid::Uuid::new_v4())])
            .await?;
        repository.soft_delete_many(&mut con, &[]).await?;

        let all = repository.list_all_titles(&mut con).await?;
        assert!(all.contains(&BookTitle::new(title)));

        Ok(())
    }
}

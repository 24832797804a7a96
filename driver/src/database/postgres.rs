use error_stack::Report;
use sqlx::pool::PoolConnection;
use sqlx::{Error, Pool, Postgres};

use kernel::interface::database::DatabaseConnection;
use kernel::KernelError;

use crate::env;
use crate::error::ConvertError;

pub use self::book::*;

mod book;

static POSTGRES_URL: &str = "POSTGRES_URL";

pub struct PostgresDatabase {
    pool: Pool<Postgres>,
    book: PostgresBookRepository,
}

impl PostgresDatabase {
    pub async fn new() -> error_stack::Result<Self, KernelError> {
        let url = env(POSTGRES_URL)?;
        let pool = Pool::connect(&url).await.convert_error()?;
        tracing::debug!("connected postgres pool");
        Ok(Self {
            pool,
            book: PostgresBookRepository,
        })
    }

    pub(in crate::database) fn book_repository(&self) -> &PostgresBookRepository {
        &self.book
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for PostgresDatabase {
    type Connection = PoolConnection<Postgres>;
    async fn acquire(&self) -> error_stack::Result<PoolConnection<Postgres>, KernelError> {
        let con = self.pool.acquire().await.convert_error()?;
        Ok(con)
    }
}

impl<T> ConvertError for Result<T, Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                Error::PoolTimedOut => KernelError::Timeout,
                Error::RowNotFound => KernelError::NotFound,
                Error::Database(db) if db.is_unique_violation() => KernelError::Conflict,
                _ => KernelError::Internal,
            };
            Report::from(error).change_context(context)
        })
    }
}

use uuid::Uuid;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{Book, BookId};
use kernel::KernelError;

use crate::transfer::{
    BookCreation, BookDto, CreateBookDto, DeleteBookDto, DeleteManyBookDto, GetBookDto,
    GetBookPageDto, UpdateBookDto,
};

/// Paginated browsing. Listing a page is itself an observable write: every
/// returned title gets exactly one view-count increment, issued after the
/// page contents are fixed, so the increments only influence later pages.
#[async_trait::async_trait]
pub trait GetBookPageService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    async fn get_book_page(
        &self,
        dto: GetBookPageDto,
    ) -> error_stack::Result<Vec<String>, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let page = dto.page.normalized();
        let page_size = dto.page_size.normalized();
        let titles = self
            .book_query()
            .list_titles_by_page(&mut connection, &page, &page_size)
            .await?;

        for title in &titles {
            // Should two books ever share a title, only the first match gets
            // the increment. Accepted ambiguity.
            let found = self
                .book_query()
                .find_by_title(&mut connection, title)
                .await?;
            if let Some(book) = found {
                self.book_modifier()
                    .increment_views(&mut connection, book.id())
                    .await?;
            }
        }

        Ok(titles.into_iter().map(Into::into).collect())
    }
}

impl<T> GetBookPageService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
}

/// Point read with the view-count side effect. The read that triggers the
/// increment and the read that produces the returned record are separate
/// round-trips; the consistency window in between is accepted.
#[async_trait::async_trait]
pub trait GetBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let id = BookId::new(dto.id);
        if self
            .book_query()
            .find_by_id(&mut connection, &id)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        self.book_modifier()
            .increment_views(&mut connection, &id)
            .await?;
        let refreshed = self.book_query().find_by_id(&mut connection, &id).await?;

        Ok(refreshed.map(BookDto::from))
    }
}

impl<T> GetBookService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
}

/// Dedup-aware creation, the central business rule: an active title blocks
/// the create, a soft-deleted one is revived under its original identity.
#[async_trait::async_trait]
pub trait CreateBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
    async fn create_book(
        &self,
        dto: CreateBookDto,
    ) -> error_stack::Result<BookCreation, KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let book = match Book::create(
            BookId::new(Uuid::new_v4()),
            dto.title,
            dto.author_name,
            dto.publication_year,
        ) {
            Ok(book) => book,
            Err(report) => {
                return match report.current_context() {
                    KernelError::Validation(reason) => Ok(BookCreation::Rejected {
                        reason: reason.clone(),
                    }),
                    _ => Err(report),
                };
            }
        };

        let existing = self
            .book_query()
            .find_by_title(&mut connection, book.title())
            .await?;

        match existing {
            Some(existing) if !*existing.is_deleted().as_ref() => Ok(BookCreation::Duplicate {
                title: existing.title().as_ref().clone(),
            }),
            Some(deleted) => {
                // Revival: adopt the deleted record's identity and overwrite
                // the whole row; flag and timestamp clear through the payload.
                let id = deleted.id().clone();
                let revived = book.reconstruct(|b| b.id = id.clone());
                self.book_modifier()
                    .replace(&mut connection, &id, &revived)
                    .await?;
                Ok(BookCreation::Revived { id: id.into() })
            }
            None => {
                let id = *book.id().as_ref();
                match self.book_modifier().insert(&mut connection, &book).await {
                    Ok(()) => Ok(BookCreation::Created { id }),
                    // Lost a creation race; resolve it the same way an
                    // up-front match would have been.
                    Err(report) if matches!(report.current_context(), KernelError::Conflict) => {
                        Ok(BookCreation::Duplicate {
                            title: book.title().as_ref().clone(),
                        })
                    }
                    Err(report) => Err(report),
                }
            }
        }
    }
}

impl<T> CreateBookService for T where
    T: DependOnDatabaseConnection + DependOnBookQuery + DependOnBookModifier
{
}

/// Sequential bulk creation. Never aborts early; failed titles turn into
/// warnings so in-batch duplicates resolve deterministically in input order.
/// There is deliberately no atomicity across the batch.
#[async_trait::async_trait]
pub trait CreateManyBookService: 'static + Sync + Send + CreateBookService {
    async fn create_many_books(
        &self,
        dtos: Vec<CreateBookDto>,
    ) -> error_stack::Result<Vec<String>, KernelError> {
        let mut warnings = Vec::new();

        for dto in dtos {
            let creation = self.create_book(dto).await?;
            if let Some(warning) = creation.warning() {
                tracing::warn!("{warning}");
                warnings.push(warning);
            }
        }

        Ok(warnings)
    }
}

impl<T> CreateManyBookService for T where T: CreateBookService {}

/// Unconditional overwrite. No duplicate-title re-check against other active
/// records is performed; the replaced row takes the payload wholesale.
#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookModifier
{
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().acquire().await?;

        let book = Book::create(
            BookId::new(dto.id),
            dto.title,
            dto.author_name,
            dto.publication_year,
        )?;
        self.book_modifier()
            .replace(&mut connection, book.id(), &book)
            .await
    }
}

impl<T> UpdateBookService for T where T: DependOnDatabaseConnection + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait SoftDeleteBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookModifier
{
    async fn soft_delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().acquire().await?;
        let id = BookId::new(dto.id);
        self.book_modifier()
            .soft_delete(&mut connection, &id)
            .await
    }
}

impl<T> SoftDeleteBookService for T where T: DependOnDatabaseConnection + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait SoftDeleteManyBookService:
    'static + Sync + Send + DependOnDatabaseConnection + DependOnBookModifier
{
    async fn soft_delete_many_books(
        &self,
        dto: DeleteManyBookDto,
    ) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().acquire().await?;
        let ids = dto.ids.into_iter().map(BookId::new).collect::<Vec<_>>();
        self.book_modifier()
            .soft_delete_many(&mut connection, &ids)
            .await
    }
}

impl<T> SoftDeleteManyBookService for T where T: DependOnDatabaseConnection + DependOnBookModifier {}

#[cfg(test)]
mod test {
    use std::cmp::Reverse;
    use std::sync::{Arc, Mutex};

    use time::OffsetDateTime;
    use uuid::Uuid;

    use kernel::interface::database::DatabaseConnection;
    use kernel::interface::query::{BookQuery, DependOnBookQuery};
    use kernel::interface::update::{BookModifier, DependOnBookModifier};
    use kernel::prelude::entity::{
        Book, BookAuthor, BookId, BookTitle, DeletedAt, IsDeleted, PageNumber, PageSize,
        PublishedYear, ViewCount,
    };
    use kernel::KernelError;

    use crate::service::{
        CreateBookService, CreateManyBookService, GetBookPageService, GetBookService,
        SoftDeleteBookService, SoftDeleteManyBookService, UpdateBookService,
    };
    use crate::transfer::{
        BookCreation, CreateBookDto, DeleteBookDto, DeleteManyBookDto, GetBookDto, GetBookPageDto,
        UpdateBookDto,
    };

    #[derive(Clone, Default)]
    struct MockBookStore {
        books: Arc<Mutex<Vec<Book>>>,
    }

    impl MockBookStore {
        fn seed(&self, book: Book) {
            self.books.lock().unwrap().push(book);
        }

        fn snapshot(&self) -> Vec<Book> {
            self.books.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl DatabaseConnection for MockBookStore {
        type Connection = ();
        async fn acquire(&self) -> error_stack::Result<(), KernelError> {
            Ok(())
        }
    }

    impl DependOnBookQuery for MockBookStore {
        type BookQuery = Self;
        fn book_query(&self) -> &Self {
            self
        }
    }

    impl DependOnBookModifier for MockBookStore {
        type BookModifier = Self;
        fn book_modifier(&self) -> &Self {
            self
        }
    }

    #[async_trait::async_trait]
    impl BookQuery for MockBookStore {
        type Connection = ();

        async fn list_titles_by_page(
            &self,
            _: &mut (),
            page: &PageNumber,
            page_size: &PageSize,
        ) -> error_stack::Result<Vec<BookTitle>, KernelError> {
            let mut active = self
                .books
                .lock()
                .unwrap()
                .iter()
                .filter(|book| !*book.is_deleted().as_ref())
                .cloned()
                .collect::<Vec<_>>();
            // Stable sort keeps insertion order for ties, mirroring
            // storage-native tie-breaking.
            active.sort_by_key(|book| Reverse(*book.views().as_ref()));
            let skip = ((*page.as_ref() - 1) * *page_size.as_ref()) as usize;
            let take = *page_size.as_ref() as usize;
            Ok(active
                .into_iter()
                .skip(skip)
                .take(take)
                .map(|book| book.title().clone())
                .collect())
        }

        async fn find_by_id(
            &self,
            _: &mut (),
            id: &BookId,
        ) -> error_stack::Result<Option<Book>, KernelError> {
            Ok(self
                .books
                .lock()
                .unwrap()
                .iter()
                .find(|book| book.id() == id && !*book.is_deleted().as_ref())
                .cloned())
        }

        async fn find_by_title(
            &self,
            _: &mut (),
            title: &BookTitle,
        ) -> error_stack::Result<Option<Book>, KernelError> {
            Ok(self
                .books
                .lock()
                .unwrap()
                .iter()
                .find(|book| book.title() == title)
                .cloned())
        }

        async fn list_all_titles(
            &self,
            _: &mut (),
        ) -> error_stack::Result<Vec<BookTitle>, KernelError> {
            Ok(self
                .books
                .lock()
                .unwrap()
                .iter()
                .map(|book| book.title().clone())
                .collect())
        }
    }

    #[async_trait::async_trait]
    impl BookModifier for MockBookStore {
        type Connection = ();

        async fn insert(&self, _: &mut (), book: &Book) -> error_stack::Result<(), KernelError> {
            let mut books = self.books.lock().unwrap();
            if books.iter().any(|stored| stored.id() == book.id()) {
                return Err(error_stack::Report::new(KernelError::Conflict));
            }
            books.push(book.clone());
            Ok(())
        }

        async fn insert_many(
            &self,
            con: &mut (),
            books: &[Book],
        ) -> error_stack::Result<(), KernelError> {
            for book in books {
                self.insert(con, book).await?;
            }
            Ok(())
        }

        async fn replace(
            &self,
            _: &mut (),
            id: &BookId,
            book: &Book,
        ) -> error_stack::Result<(), KernelError> {
            let mut books = self.books.lock().unwrap();
            let Some(stored) = books.iter_mut().find(|stored| stored.id() == id) else {
                return Err(error_stack::Report::new(KernelError::NotFound));
            };
            *stored = book.clone();
            Ok(())
        }

        async fn soft_delete(
            &self,
            _: &mut (),
            id: &BookId,
        ) -> error_stack::Result<(), KernelError> {
            let mut books = self.books.lock().unwrap();
            let Some(index) = books
                .iter()
                .position(|stored| stored.id() == id && !*stored.is_deleted().as_ref())
            else {
                return Ok(());
            };
            let deleted = books.remove(index).reconstruct(|book| {
                book.is_deleted = IsDeleted::new(true);
                book.deleted_at = Some(DeletedAt::new(OffsetDateTime::now_utc()));
            });
            books.insert(index, deleted);
            Ok(())
        }

        async fn soft_delete_many(
            &self,
            con: &mut (),
            ids: &[BookId],
        ) -> error_stack::Result<(), KernelError> {
            for id in ids {
                self.soft_delete(con, id).await?;
            }
            Ok(())
        }

        async fn increment_views(
            &self,
            _: &mut (),
            id: &BookId,
        ) -> error_stack::Result<(), KernelError> {
            let mut books = self.books.lock().unwrap();
            let Some(index) = books.iter().position(|stored| stored.id() == id) else {
                return Ok(());
            };
            let bumped = books
                .remove(index)
                .reconstruct(|book| book.views = book.views.increment());
            books.insert(index, bumped);
            Ok(())
        }
    }

    fn create_dto(title: &str) -> CreateBookDto {
        CreateBookDto {
            title: title.to_string(),
            author_name: "Ursula K. Le Guin".to_string(),
            publication_year: 1969,
        }
    }

    #[tokio::test]
    async fn create_then_get_counts_the_read() {
        let store = MockBookStore::default();

        let creation = store
            .create_book(create_dto("The Left Hand of Darkness"))
            .await
            .unwrap();
        let id = creation.id().expect("fresh title must be created");

        let dto = store
            .get_book(GetBookDto { id })
            .await
            .unwrap()
            .expect("created book must be readable");
        assert_eq!(dto.id, id);
        assert_eq!(dto.title, "The Left Hand of Darkness");
        assert_eq!(dto.author_name, "Ursula K. Le Guin");
        assert_eq!(dto.publication_year, 1969);
        // The read itself is the first view.
        assert_eq!(dto.views_count, 1);
    }

    #[tokio::test]
    async fn get_absent_id_is_none_not_an_error() {
        let store = MockBookStore::default();
        let found = store
            .get_book(GetBookDto { id: Uuid::new_v4() })
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn active_duplicate_title_is_rejected_without_mutation() {
        let store = MockBookStore::default();

        store.create_book(create_dto("Orbital")).await.unwrap();
        let second = store.create_book(create_dto("Orbital")).await.unwrap();

        assert_eq!(
            second,
            BookCreation::Duplicate {
                title: "Orbital".to_string()
            }
        );
        assert_eq!(
            second.warning().as_deref(),
            Some("Book with this title Orbital already exists")
        );
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.snapshot()[0].views(), &ViewCount::new(0));
    }

    #[tokio::test]
    async fn deleted_title_is_revived_under_its_original_identity() {
        let store = MockBookStore::default();

        let first = store.create_book(create_dto("Annihilation")).await.unwrap();
        let original_id = first.id().unwrap();

        store
            .soft_delete_book(DeleteBookDto { id: original_id })
            .await
            .unwrap();
        assert!(store
            .get_book(GetBookDto { id: original_id })
            .await
            .unwrap()
            .is_none());

        let revival = store
            .create_book(CreateBookDto {
                title: "Annihilation".to_string(),
                author_name: "Jeff VanderMeer".to_string(),
                publication_year: 2014,
            })
            .await
            .unwrap();
        assert_eq!(
            revival,
            BookCreation::Revived {
                id: original_id
            }
        );

        let revived = store
            .get_book(GetBookDto { id: original_id })
            .await
            .unwrap()
            .expect("revived book must be readable again");
        assert_eq!(revived.author_name, "Jeff VanderMeer");
        assert_eq!(revived.publication_year, 2014);
        assert_eq!(store.snapshot().len(), 1);
        assert!(store.snapshot()[0].deleted_at().is_none());
    }

    #[tokio::test]
    async fn validation_failures_are_structured_results() {
        let store = MockBookStore::default();

        let blank_title = store.create_book(create_dto("   ")).await.unwrap();
        assert_eq!(
            blank_title,
            BookCreation::Rejected {
                reason: "Title cannot be empty".to_string()
            }
        );

        let bad_year = store
            .create_book(CreateBookDto {
                title: "Roadside Picnic".to_string(),
                author_name: "Arkady Strugatsky".to_string(),
                publication_year: 0,
            })
            .await
            .unwrap();
        assert_eq!(
            bad_year,
            BookCreation::Rejected {
                reason: "Publication year must be positive".to_string()
            }
        );
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn create_many_keeps_going_and_collects_warnings() {
        let store = MockBookStore::default();

        let warnings = store
            .create_many_books(vec![
                create_dto("Solaris"),
                create_dto("Solaris"),
                create_dto(""),
                create_dto("The Dispossessed"),
            ])
            .await
            .unwrap();

        assert_eq!(
            warnings,
            vec![
                "Book with this title Solaris already exists".to_string(),
                "Title cannot be empty".to_string(),
            ]
        );
        assert_eq!(store.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn page_listing_skips_deleted_and_never_repeats_titles() {
        let store = MockBookStore::default();
        // Views spaced far enough apart that the listing's own increments
        // cannot reorder books between the two page reads.
        for index in 0..15i64 {
            store.seed(Book::new(
                BookId::new(Uuid::new_v4()),
                BookTitle::new(format!("Book {index}")),
                BookAuthor::new("Octavia E. Butler"),
                PublishedYear::new(1993),
                ViewCount::new(index * 10),
                IsDeleted::new(false),
                None,
            ));
        }
        let deleted_id = *store.snapshot()[14].id().as_ref();
        store
            .soft_delete_book(DeleteBookDto { id: deleted_id })
            .await
            .unwrap();

        let first = store
            .get_book_page(GetBookPageDto {
                page: PageNumber::new(1),
                page_size: PageSize::new(5),
            })
            .await
            .unwrap();
        let second = store
            .get_book_page(GetBookPageDto {
                page: PageNumber::new(2),
                page_size: PageSize::new(5),
            })
            .await
            .unwrap();

        assert_eq!(first, vec!["Book 13", "Book 12", "Book 11", "Book 10", "Book 9"]);
        assert_eq!(second, vec!["Book 8", "Book 7", "Book 6", "Book 5", "Book 4"]);
        assert!(!first.iter().any(|title| second.contains(title)));
        assert!(!first.contains(&"Book 14".to_string()));
    }

    #[tokio::test]
    async fn page_listing_increments_every_listed_title_once() {
        let store = MockBookStore::default();
        store.create_book(create_dto("Kindred")).await.unwrap();
        store.create_book(create_dto("Dawn")).await.unwrap();

        let titles = store
            .get_book_page(GetBookPageDto {
                page: PageNumber::new(0),
                page_size: PageSize::new(0),
            })
            .await
            .unwrap();

        // page 0 / size 0 normalize to 1 / 10.
        assert_eq!(titles.len(), 2);
        for book in store.snapshot() {
            assert_eq!(book.views(), &ViewCount::new(1));
        }
    }

    #[tokio::test]
    async fn update_overwrites_unconditionally() {
        let store = MockBookStore::default();
        let id = store
            .create_book(create_dto("The Lathe of Heaven"))
            .await
            .unwrap()
            .id()
            .unwrap();

        store
            .update_book(UpdateBookDto {
                id,
                title: "The Word for World Is Forest".to_string(),
                author_name: "Ursula K. Le Guin".to_string(),
                publication_year: 1972,
            })
            .await
            .unwrap();

        let updated = store
            .get_book(GetBookDto { id })
            .await
            .unwrap()
            .expect("updated book must be readable");
        assert_eq!(updated.title, "The Word for World Is Forest");
        assert_eq!(updated.publication_year, 1972);
    }

    #[tokio::test]
    async fn update_of_absent_identity_is_not_found() {
        let store = MockBookStore::default();
        let missing = store
            .update_book(UpdateBookDto {
                id: Uuid::new_v4(),
                title: "Nowhere".to_string(),
                author_name: "No one".to_string(),
                publication_year: 2000,
            })
            .await;
        assert!(matches!(
            missing.unwrap_err().current_context(),
            KernelError::NotFound
        ));
    }

    #[tokio::test]
    async fn soft_delete_many_tolerates_empty_and_unknown_ids() {
        let store = MockBookStore::default();
        store.create_book(create_dto("Parable of the Sower")).await.unwrap();

        store
            .soft_delete_many_books(DeleteManyBookDto { ids: vec![] })
            .await
            .unwrap();
        store
            .soft_delete_many_books(DeleteManyBookDto {
                ids: vec![Uuid::new_v4()],
            })
            .await
            .unwrap();

        assert!(!*store.snapshot()[0].is_deleted().as_ref());
    }
}

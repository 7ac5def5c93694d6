use std::collections::HashMap;
use async_trait::async_trait;
use chrono::Utc;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::books::repository::BookRepository;
use crate::catalog::domain::CatalogService;
use crate::core::domain::Configuration;
use crate::core::events::{BOOK_ADDED, BOOK_UPDATED, DomainEvent};
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::gateway::events::{EventPublisher, publish_or_warn};
use crate::loans::domain::LoanService;

pub(crate) struct CatalogServiceImpl {
    branch_id: String,
    book_repository: Box<dyn BookRepository>,
    loan_service: Box<dyn LoanService>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CatalogServiceImpl {
    pub(crate) fn new(config: &Configuration, book_repository: Box<dyn BookRepository>,
                      loan_service: Box<dyn LoanService>, events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            book_repository,
            loan_service,
            events_publisher,
        }
    }

    fn metadata(&self) -> HashMap<String, String> {
        HashMap::from([("branch_id".to_string(), self.branch_id.to_string())])
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        book.validate()?;
        let mut entity = BookEntity::from(book);
        entity.available = true;
        self.book_repository.create(&entity).await?;
        let added = BookDto::from(&entity);
        publish_or_warn(self.events_publisher.as_ref(), DomainEvent::added(
            BOOK_ADDED, "books", added.book_id.as_str(), &self.metadata(), &added)).await;
        Ok(added)
    }

    async fn remove_book(&self, id: &str) -> LibraryResult<()> {
        self.loan_service.discharge_book(id).await
    }

    async fn update_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        book.validate()?;
        let stored = self.book_repository.get(book.book_id.as_str()).await?;
        let mut entity = BookEntity::from(book);
        entity.available = stored.available;
        entity.created_at = stored.created_at;
        self.book_repository.update(&entity).await?;
        entity.version += 1;
        entity.updated_at = Utc::now().naive_utc();
        let updated = BookDto::from(&entity);
        publish_or_warn(self.events_publisher.as_ref(), DomainEvent::updated(
            BOOK_UPDATED, "books", updated.book_id.as_str(), &self.metadata(), &updated)).await;
        Ok(updated)
    }

    async fn find_book_by_id(&self, id: &str) -> LibraryResult<BookDto> {
        self.book_repository.get(id).await.map(|b| BookDto::from(&b))
    }

    async fn find_books_by_theme(&self, theme: &str,
                                 page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookDto>> {
        let res = self.book_repository.find_by_theme(theme, page, page_size).await?;
        let records = res.records.iter().map(BookDto::from).collect();
        Ok(PaginatedResult::new(page, page_size, res.next_page, records))
    }
}

impl From<&BookEntity> for BookDto {
    fn from(other: &BookEntity) -> Self {
        Self {
            book_id: other.book_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            theme: other.theme.to_string(),
            rating: other.rating,
            available: other.available,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&BookDto> for BookEntity {
    fn from(other: &BookDto) -> Self {
        Self {
            book_id: other.book_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            author: other.author.to_string(),
            theme: other.theme.to_string(),
            rating: other.rating,
            available: other.available,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use uuid::Uuid;
    use crate::books::dto::BookDto;
    use crate::catalog::domain::CatalogService;
    use crate::catalog::factory;
    use crate::core::domain::Configuration;
    use crate::core::library::LibraryError;
    use crate::core::repository::RepositoryStore;
    use crate::loans::domain::LoanService;
    use crate::loans::factory::create_loan_service;
    use crate::persons::dto::PersonDto;

    lazy_static! {
        static ref SUT_SVC: AsyncOnce<Box<dyn CatalogService>> = AsyncOnce::new(async {
                factory::create_catalog_service(&Configuration::new("test"), RepositoryStore::Memory).await
            });
        static ref LOAN_SVC: AsyncOnce<Box<dyn LoanService>> = AsyncOnce::new(async {
                create_loan_service(&Configuration::new("test"), RepositoryStore::Memory).await
            });
    }

    #[tokio::test]
    async fn test_should_add_book() {
        let catalog_svc = SUT_SVC.get().await;
        let mut book = BookDto::new("Le Rouge et le Noir", "Stendhal", "Classique", 4);
        book.available = false;
        let added = catalog_svc.add_book(&book).await.expect("should add book");
        assert!(added.available);

        let loaded = catalog_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(added, loaded);
    }

    #[tokio::test]
    async fn test_should_validate_rating() {
        let catalog_svc = SUT_SVC.get().await;
        for rating in [0, 6] {
            let book = BookDto::new("Nana", "Émile Zola", "Classique", rating);
            assert!(matches!(catalog_svc.add_book(&book).await, Err(LibraryError::Validation { .. })));
        }
    }

    #[tokio::test]
    async fn test_should_keep_availability_on_update() {
        let catalog_svc = SUT_SVC.get().await;
        let book = catalog_svc.add_book(&BookDto::new("Madame Bovary", "Gustave Flaubert", "Classique", 4))
            .await.expect("should add book");
        let person = LOAN_SVC.get().await.save_person(&PersonDto::new("Jean", "Dupont", 30, "Montreuil"))
            .await.expect("should save person");
        LOAN_SVC.get().await.borrow(person.person_id.as_str(), book.book_id.as_str()).await.expect("should borrow");

        let mut changed = catalog_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        changed.rating = 5;
        changed.available = true;
        let updated = catalog_svc.update_book(&changed).await.expect("should update book");
        assert!(!updated.available);
        assert_eq!(changed.version + 1, updated.version);

        let loaded = catalog_svc.find_book_by_id(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(5, loaded.rating);
        assert!(!loaded.available);
    }

    #[tokio::test]
    async fn test_should_find_books_by_theme() {
        let catalog_svc = SUT_SVC.get().await;
        let theme = format!("theme-{}", Uuid::new_v4());
        for i in 0..3 {
            let book = BookDto::new(format!("title_{}", i).as_str(), "author", theme.as_str(), 3);
            catalog_svc.add_book(&book).await.expect("should add book");
        }
        let res = catalog_svc.find_books_by_theme(theme.as_str(), None, 10).await.expect("should query");
        assert_eq!(3, res.records.len());
    }

    #[tokio::test]
    async fn test_should_remove_borrowed_book() {
        let catalog_svc = SUT_SVC.get().await;
        let book = catalog_svc.add_book(&BookDto::new("Candide", "Voltaire", "Classique", 4))
            .await.expect("should add book");
        let person = LOAN_SVC.get().await.save_person(&PersonDto::new("Marie", "Martin", 30, "Montreuil"))
            .await.expect("should save person");
        LOAN_SVC.get().await.borrow(person.person_id.as_str(), book.book_id.as_str()).await.expect("should borrow");

        catalog_svc.remove_book(book.book_id.as_str()).await.expect("should remove book");
        assert!(matches!(catalog_svc.find_book_by_id(book.book_id.as_str()).await, Err(LibraryError::NotFound { .. })));
        let borrower = LOAN_SVC.get().await.find_borrower(book.book_id.as_str()).await.expect("should query");
        assert!(borrower.is_none());
    }
}

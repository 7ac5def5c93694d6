use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::utils::memory::{matches_predicate, paginate, MemoryDatabase};

#[derive(Debug)]
pub struct MemoryBookRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryBookRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<BookEntity> for MemoryBookRepository {
    async fn create(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut tables = self.db.lock()?;
        if tables.books.contains_key(&entity.book_id) {
            return Err(LibraryError::duplicate_key(format!("book {} already exists", entity.book_id).as_str()));
        }
        tables.books.insert(entity.book_id.to_string(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &BookEntity) -> LibraryResult<usize> {
        let mut tables = self.db.lock()?;
        let stored = tables.books.get_mut(&entity.book_id)
            .ok_or_else(|| LibraryError::not_found(format!("book not found for {}", entity.book_id).as_str()))?;
        if stored.version != entity.version {
            return Err(LibraryError::conflict(format!("book {} changed, expected version {} but found {}",
                                                      entity.book_id, entity.version, stored.version).as_str()));
        }
        stored.title = entity.title.to_string();
        stored.author = entity.author.to_string();
        stored.theme = entity.theme.to_string();
        stored.rating = entity.rating;
        stored.version += 1;
        stored.updated_at = Utc::now().naive_utc();
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<BookEntity> {
        let tables = self.db.lock()?;
        tables.books.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("book not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut tables = self.db.lock()?;
        Ok(tables.books.remove(id).map(|_| 1).unwrap_or(0))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let tables = self.db.lock()?;
        let records = tables.books.values()
            .filter(|b| matches_predicate(*b, predicate))
            .map(|b| (b.book_id.to_string(), b.clone()))
            .collect();
        Ok(paginate(records, page, page_size))
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn find_by_theme(&self, theme: &str, page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<BookEntity>> {
        let predicate = HashMap::from([
            ("theme".to_string(), theme.to_string()),
        ]);
        self.query(&predicate, page, page_size).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::BookRepository;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::utils::memory::MemoryDatabase;

    fn sut() -> MemoryBookRepository {
        MemoryBookRepository::new(Arc::new(MemoryDatabase::new()))
    }

    #[tokio::test]
    async fn test_should_create_get_books() {
        let books_repo = sut();
        let book = BookEntity::new("Le Petit Prince", "Antoine de Saint-Exupéry", "Fiction", 5);
        assert_eq!(1, books_repo.create(&book).await.expect("should create book"));
        assert!(matches!(books_repo.create(&book).await, Err(LibraryError::DuplicateKey { .. })));

        let loaded = books_repo.get(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(book, loaded);
    }

    #[tokio::test]
    async fn test_should_update_with_version_check() {
        let books_repo = sut();
        let mut book = BookEntity::new("1984", "George Orwell", "Science-Fiction", 5);
        books_repo.create(&book).await.expect("should create book");

        book.rating = 4;
        book.available = false;
        books_repo.update(&book).await.expect("should update book");
        let loaded = books_repo.get(book.book_id.as_str()).await.expect("should return book");
        assert_eq!(4, loaded.rating);
        assert_eq!(1, loaded.version);
        assert!(loaded.available);

        let res = books_repo.update(&book).await;
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_should_query_books_by_theme() {
        let books_repo = sut();
        for i in 0..15 {
            let theme = if i % 3 == 0 { "Classique" } else { "Fiction" };
            let book = BookEntity::new(format!("title_{}", i).as_str(), "author", theme, 3);
            books_repo.create(&book).await.expect("should create book");
        }
        let res = books_repo.find_by_theme("Classique", None, 50).await.expect("should query");
        assert_eq!(5, res.records.len());

        let first = books_repo.find_by_theme("Fiction", None, 6).await.expect("should query");
        assert_eq!(6, first.records.len());
        let second = books_repo.find_by_theme("Fiction", first.next_page.as_deref(), 6).await.expect("should query");
        assert_eq!(4, second.records.len());
        assert!(second.next_page.is_none());

        let res = books_repo.query(&HashMap::from([("title".to_string(), "title_3".to_string())]), None, 50)
            .await.expect("should query");
        assert_eq!(1, res.records.len());
    }

    #[tokio::test]
    async fn test_should_delete_books() {
        let books_repo = sut();
        let book = BookEntity::new("Les Misérables", "Victor Hugo", "Classique", 4);
        books_repo.create(&book).await.expect("should create book");
        assert_eq!(1, books_repo.delete(book.book_id.as_str()).await.expect("should delete"));
        assert_eq!(0, books_repo.delete(book.book_id.as_str()).await.expect("should delete"));
        assert!(matches!(books_repo.get(book.book_id.as_str()).await, Err(LibraryError::NotFound { .. })));
    }
}

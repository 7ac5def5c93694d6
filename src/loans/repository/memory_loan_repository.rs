use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult};
use crate::loans::domain::model::{LoanTransaction, LoanWrite};
use crate::loans::repository::LoanRepository;
use crate::utils::memory::{MemoryDatabase, MemoryTables};

#[derive(Debug)]
pub struct MemoryLoanRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryLoanRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

fn check(tables: &MemoryTables, write: &LoanWrite) -> LibraryResult<()> {
    let (kind, id, found, expected) = match write {
        LoanWrite::PutPerson { person, expected_version: None } => {
            if tables.persons.contains_key(&person.person_id) {
                return Err(LibraryError::duplicate_key(format!("person {} already exists", person.person_id).as_str()));
            }
            return Ok(());
        }
        LoanWrite::PutPerson { person, expected_version: Some(expected) } => {
            ("person", &person.person_id, tables.persons.get(&person.person_id).map(|p| p.version), *expected)
        }
        LoanWrite::DeletePerson { person_id, expected_version } => {
            ("person", person_id, tables.persons.get(person_id).map(|p| p.version), *expected_version)
        }
        LoanWrite::PutBookAvailability { book_id, expected_version, .. } |
        LoanWrite::DeleteBook { book_id, expected_version } => {
            ("book", book_id, tables.books.get(book_id).map(|b| b.version), *expected_version)
        }
    };
    match found {
        Some(version) if version == expected => Ok(()),
        Some(version) => Err(LibraryError::conflict(format!("{} {} changed, expected version {} but found {}",
                                                            kind, id, expected, version).as_str())),
        None => Err(LibraryError::conflict(format!("{} {} no longer exists", kind, id).as_str())),
    }
}

fn apply(tables: &mut MemoryTables, write: &LoanWrite) {
    match write {
        LoanWrite::PutPerson { person, .. } => {
            tables.persons.insert(person.person_id.to_string(), person.clone());
        }
        LoanWrite::DeletePerson { person_id, .. } => {
            tables.persons.remove(person_id);
        }
        LoanWrite::PutBookAvailability { book_id, available, .. } => {
            if let Some(book) = tables.books.get_mut(book_id) {
                book.available = *available;
                book.version += 1;
                book.updated_at = Utc::now().naive_utc();
            }
        }
        LoanWrite::DeleteBook { book_id, .. } => {
            tables.books.remove(book_id);
        }
    }
}

#[async_trait]
impl LoanRepository for MemoryLoanRepository {
    async fn commit(&self, tx: &LoanTransaction) -> LibraryResult<usize> {
        let mut tables = self.db.lock()?;
        for write in tx.writes() {
            check(&tables, write)?;
        }
        for write in tx.writes() {
            apply(&mut tables, write);
        }
        Ok(tx.writes().len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::books::domain::model::BookEntity;
    use crate::books::repository::memory_book_repository::MemoryBookRepository;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::loans::domain::model::LoanTransaction;
    use crate::loans::repository::LoanRepository;
    use crate::loans::repository::memory_loan_repository::MemoryLoanRepository;
    use crate::persons::domain::model::PersonEntity;
    use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
    use crate::utils::memory::MemoryDatabase;

    #[tokio::test]
    async fn test_should_commit_person_and_book_together() {
        let db = Arc::new(MemoryDatabase::new());
        let books_repo = MemoryBookRepository::new(db.clone());
        let persons_repo = MemoryPersonRepository::new(db.clone());
        let loans_repo = MemoryLoanRepository::new(db.clone());

        let mut book = BookEntity::new("1984", "George Orwell", "Science-Fiction", 5);
        books_repo.create(&book).await.expect("should create book");
        let mut person = PersonEntity::new("Jean", "Dupont", 30, "Montreuil");
        person.borrowed_book_id = Some(book.book_id.to_string());
        book.available = false;

        let mut tx = LoanTransaction::new();
        tx.save_person(&person, None);
        tx.set_availability(&book);
        assert_eq!(2, loans_repo.commit(&tx).await.expect("should commit"));

        let loaded = books_repo.get(book.book_id.as_str()).await.expect("should return book");
        assert!(!loaded.available);
        assert_eq!(1, loaded.version);
        let loaded = persons_repo.get(person.person_id.as_str()).await.expect("should return person");
        assert_eq!(Some(book.book_id.clone()), loaded.borrowed_book_id);
    }

    #[tokio::test]
    async fn test_should_leave_rows_untouched_on_stale_version() {
        let db = Arc::new(MemoryDatabase::new());
        let books_repo = MemoryBookRepository::new(db.clone());
        let persons_repo = MemoryPersonRepository::new(db.clone());
        let loans_repo = MemoryLoanRepository::new(db.clone());

        let mut book = BookEntity::new("1984", "George Orwell", "Science-Fiction", 5);
        books_repo.create(&book).await.expect("should create book");
        let mut person = PersonEntity::new("Jean", "Dupont", 30, "Montreuil");
        persons_repo.create(&person).await.expect("should create person");

        // another writer bumps the book first
        books_repo.update(&book).await.expect("should update book");

        person.borrowed_book_id = Some(book.book_id.to_string());
        book.available = false;
        let mut tx = LoanTransaction::new();
        tx.save_person(&person, Some(person.version));
        tx.set_availability(&book);
        let res = loans_repo.commit(&tx).await;
        assert!(matches!(res, Err(LibraryError::CurrentlyUnavailable { .. })));
        assert!(res.err().map(|e| e.retryable()).unwrap_or(false));

        let loaded = persons_repo.get(person.person_id.as_str()).await.expect("should return person");
        assert_eq!(None, loaded.borrowed_book_id);
        assert_eq!(0, loaded.version);
        assert!(books_repo.get(book.book_id.as_str()).await.expect("should return book").available);
    }

    #[tokio::test]
    async fn test_should_reject_duplicate_person() {
        let db = Arc::new(MemoryDatabase::new());
        let persons_repo = MemoryPersonRepository::new(db.clone());
        let loans_repo = MemoryLoanRepository::new(db.clone());
        let person = PersonEntity::new("Jean", "Dupont", 30, "Montreuil");
        persons_repo.create(&person).await.expect("should create person");

        let mut tx = LoanTransaction::new();
        tx.save_person(&person, None);
        assert!(matches!(loans_repo.commit(&tx).await, Err(LibraryError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn test_should_delete_rows() {
        let db = Arc::new(MemoryDatabase::new());
        let books_repo = MemoryBookRepository::new(db.clone());
        let persons_repo = MemoryPersonRepository::new(db.clone());
        let loans_repo = MemoryLoanRepository::new(db.clone());
        let book = BookEntity::new("Les Misérables", "Victor Hugo", "Classique", 4);
        books_repo.create(&book).await.expect("should create book");
        let person = PersonEntity::new("Marie", "Martin", 25, "Montreuil");
        persons_repo.create(&person).await.expect("should create person");

        let mut tx = LoanTransaction::new();
        tx.delete_person(&person);
        tx.delete_book(&book);
        loans_repo.commit(&tx).await.expect("should commit");
        assert!(persons_repo.get(person.person_id.as_str()).await.is_err());
        assert!(books_repo.get(book.book_id.as_str()).await.is_err());

        // deleting again is a conflict since the rows are gone
        assert!(matches!(loans_repo.commit(&tx).await, Err(LibraryError::CurrentlyUnavailable { .. })));
    }
}

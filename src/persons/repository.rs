pub mod ddb_person_repository;
pub mod memory_person_repository;

use async_trait::async_trait;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;

#[async_trait]
pub trait PersonRepository: Repository<PersonEntity> {
    // find_by_borrowed_book returns the borrower of a book, if any
    async fn find_by_borrowed_book(&self, book_id: &str) -> LibraryResult<Option<PersonEntity>>;
}

// a borrowed book is only ever assigned through a loan transaction
pub(crate) fn check_no_borrowed_book(person: &PersonEntity) -> LibraryResult<()> {
    match &person.borrowed_book_id {
        Some(book_id) => Err(LibraryError::validation(
            format!("person {} cannot be created holding book {}", person.person_id, book_id).as_str(), None)),
        None => Ok(()),
    }
}

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::loans::dto::LoanDto;
use crate::persons::dto::PersonDto;

pub mod eligibility;
pub mod model;
pub mod service;

// LoanService owns every write that can change who borrows which book.
// Each operation reads the rows it needs, checks the loan rules and commits
// person and book changes as one transaction.
#[async_trait]
pub trait LoanService: Sync + Send {
    // creates or updates a person, moving their borrowed book if it changed
    async fn save_person(&self, person: &PersonDto) -> LibraryResult<PersonDto>;
    async fn borrow(&self, person_id: &str, book_id: &str) -> LibraryResult<LoanDto>;
    async fn return_book(&self, person_id: &str) -> LibraryResult<LoanDto>;
    // deletes a person and makes their book available again
    async fn discharge_person(&self, person_id: &str) -> LibraryResult<()>;
    // deletes a book and clears the reference held by its borrower
    async fn discharge_book(&self, book_id: &str) -> LibraryResult<()>;
    async fn find_borrower(&self, book_id: &str) -> LibraryResult<Option<PersonDto>>;
}

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::loans::domain::model::LoanTransaction;

pub mod ddb_loan_repository;
pub mod memory_loan_repository;

// LoanRepository applies a loan transaction across the persons and books tables
#[async_trait]
pub trait LoanRepository: Sync + Send {
    // commit applies every write or none; a failed version condition is a conflict
    async fn commit(&self, tx: &LoanTransaction) -> LibraryResult<usize>;
}

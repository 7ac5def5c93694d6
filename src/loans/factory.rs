use crate::books::factory::{BOOKS_TABLE, create_book_repository};
use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::gateway::factory::create_publisher;
use crate::loans::domain::LoanService;
use crate::loans::domain::service::LoanServiceImpl;
use crate::loans::repository::LoanRepository;
use crate::loans::repository::ddb_loan_repository::DDBLoanRepository;
use crate::loans::repository::memory_loan_repository::MemoryLoanRepository;
use crate::persons::factory::{PERSONS_TABLE, create_person_repository};
use crate::utils::ddb::build_db_client;
use crate::utils::memory::shared_memory_db;

// the loan repository writes to the tables owned by the books and persons repositories
pub async fn create_loan_repository(store: RepositoryStore) -> Box<dyn LoanRepository> {
    match store {
        RepositoryStore::DynamoDB | RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBLoanRepository::new(client, PERSONS_TABLE, BOOKS_TABLE))
        }
        RepositoryStore::Memory => {
            Box::new(MemoryLoanRepository::new(shared_memory_db()))
        }
    }
}

pub async fn create_loan_service(config: &Configuration, store: RepositoryStore) -> Box<dyn LoanService> {
    let person_repo = create_person_repository(store).await;
    let book_repo = create_book_repository(store).await;
    let loan_repo = create_loan_repository(store).await;
    let publisher = create_publisher(store.gateway_publisher()).await;
    Box::new(LoanServiceImpl::new(config, person_repo, book_repo, loan_repo, publisher))
}

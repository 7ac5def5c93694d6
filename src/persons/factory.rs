use crate::core::domain::Configuration;
use crate::core::repository::RepositoryStore;
use crate::loans::factory::create_loan_service;
use crate::persons::domain::PersonService;
use crate::persons::domain::service::PersonServiceImpl;
use crate::persons::repository::PersonRepository;
use crate::persons::repository::ddb_person_repository::DDBPersonRepository;
use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
use crate::utils::ddb::{build_db_client, create_table};
use crate::utils::memory::shared_memory_db;

pub const PERSONS_TABLE: &str = "persons";
pub const PERSONS_INDEX: &str = "persons_ndx";

pub async fn create_person_repository(store: RepositoryStore) -> Box<dyn PersonRepository> {
    match store {
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Box::new(DDBPersonRepository::new(client, PERSONS_TABLE, PERSONS_INDEX))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let _ = create_table(&client, PERSONS_TABLE, "person_id", "borrowed_book_id", "person_id").await;
            Box::new(DDBPersonRepository::new(client, PERSONS_TABLE, PERSONS_INDEX))
        }
        RepositoryStore::Memory => {
            Box::new(MemoryPersonRepository::new(shared_memory_db()))
        }
    }
}

pub async fn create_person_service(config: &Configuration, store: RepositoryStore) -> Box<dyn PersonService> {
    let person_repo = create_person_repository(store).await;
    let loan_svc = create_loan_service(config, store).await;
    Box::new(PersonServiceImpl::new(config, person_repo, loan_svc))
}

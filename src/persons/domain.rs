use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::persons::dto::PersonDto;

pub mod model;
pub mod service;

// PersonService manages persons; every write goes through the loan rules
#[async_trait]
pub trait PersonService: Sync + Send {
    async fn add_person(&self, person: &PersonDto) -> LibraryResult<PersonDto>;
    async fn update_person(&self, person: &PersonDto) -> LibraryResult<PersonDto>;
    async fn remove_person(&self, id: &str) -> LibraryResult<()>;
    async fn find_person_by_id(&self, id: &str) -> LibraryResult<PersonDto>;
    async fn find_person_by_borrowed_book(&self, book_id: &str) -> LibraryResult<Option<PersonDto>>;
}

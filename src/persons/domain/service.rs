use async_trait::async_trait;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::loans::domain::LoanService;
use crate::persons::domain::PersonService;
use crate::persons::domain::model::PersonEntity;
use crate::persons::dto::PersonDto;
use crate::persons::repository::PersonRepository;

pub(crate) struct PersonServiceImpl {
    person_repository: Box<dyn PersonRepository>,
    loan_service: Box<dyn LoanService>,
}

impl PersonServiceImpl {
    pub(crate) fn new(_config: &Configuration, person_repository: Box<dyn PersonRepository>,
                      loan_service: Box<dyn LoanService>) -> Self {
        Self {
            person_repository,
            loan_service,
        }
    }
}

#[async_trait]
impl PersonService for PersonServiceImpl {
    async fn add_person(&self, person: &PersonDto) -> LibraryResult<PersonDto> {
        person.validate()?;
        match self.person_repository.get(person.person_id.as_str()).await {
            Ok(_) => Err(LibraryError::duplicate_key(format!("person {} already exists", person.person_id).as_str())),
            Err(LibraryError::NotFound { .. }) => self.loan_service.save_person(person).await,
            Err(err) => Err(err),
        }
    }

    async fn update_person(&self, person: &PersonDto) -> LibraryResult<PersonDto> {
        person.validate()?;
        let _ = self.person_repository.get(person.person_id.as_str()).await?;
        self.loan_service.save_person(person).await
    }

    async fn remove_person(&self, id: &str) -> LibraryResult<()> {
        self.loan_service.discharge_person(id).await
    }

    async fn find_person_by_id(&self, id: &str) -> LibraryResult<PersonDto> {
        self.person_repository.get(id).await.map(|p| PersonDto::from(&p))
    }

    async fn find_person_by_borrowed_book(&self, book_id: &str) -> LibraryResult<Option<PersonDto>> {
        let borrower = self.person_repository.find_by_borrowed_book(book_id).await?;
        Ok(borrower.as_ref().map(PersonDto::from))
    }
}

impl From<&PersonEntity> for PersonDto {
    fn from(other: &PersonEntity) -> Self {
        Self {
            person_id: other.person_id.to_string(),
            version: other.version,
            first_name: other.first_name.to_string(),
            last_name: other.last_name.to_string(),
            age: other.age,
            residence: other.residence.to_string(),
            borrowed_book_id: other.borrowed_book_id.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&PersonDto> for PersonEntity {
    fn from(other: &PersonDto) -> Self {
        Self {
            person_id: other.person_id.to_string(),
            version: other.version,
            first_name: other.first_name.to_string(),
            last_name: other.last_name.to_string(),
            age: other.age,
            residence: other.residence.to_string(),
            borrowed_book_id: other.borrowed_book_id.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

use std::collections::HashMap;
use async_trait::async_trait;
use tracing::info;
use crate::books::domain::model::BookEntity;
use crate::books::repository::BookRepository;
use crate::core::domain::Configuration;
use crate::core::events::{BOOK_BORROWED, BOOK_RELEASED, BOOK_REMOVED, DomainEvent, PERSON_REMOVED, PERSON_SAVED};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::Repository;
use crate::gateway::events::{EventPublisher, publish_or_warn};
use crate::loans::domain::LoanService;
use crate::loans::domain::eligibility::{LoanOutcome, LoanPolicy, plan_assignment};
use crate::loans::domain::model::LoanTransaction;
use crate::loans::dto::LoanDto;
use crate::loans::repository::LoanRepository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::dto::PersonDto;
use crate::persons::repository::PersonRepository;

const LOANS_GROUP: &str = "loans";

pub(crate) struct LoanServiceImpl {
    branch_id: String,
    policy: LoanPolicy,
    person_repository: Box<dyn PersonRepository>,
    book_repository: Box<dyn BookRepository>,
    loan_repository: Box<dyn LoanRepository>,
    events_publisher: Box<dyn EventPublisher>,
}

impl LoanServiceImpl {
    pub(crate) fn new(config: &Configuration, person_repository: Box<dyn PersonRepository>,
                      book_repository: Box<dyn BookRepository>, loan_repository: Box<dyn LoanRepository>,
                      events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            branch_id: config.branch_id.to_string(),
            policy: LoanPolicy::from(config),
            person_repository,
            book_repository,
            loan_repository,
            events_publisher,
        }
    }

    async fn find_stored_person(&self, person_id: &str) -> LibraryResult<Option<PersonEntity>> {
        match self.person_repository.get(person_id).await {
            Ok(person) => Ok(Some(person)),
            Err(LibraryError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn find_book(&self, book_id: Option<&str>) -> LibraryResult<Option<BookEntity>> {
        match book_id {
            Some(id) => self.book_repository.get(id).await.map(Some),
            None => Ok(None),
        }
    }

    // a book that is gone has nothing left to release
    async fn find_released_book(&self, book_id: Option<&str>) -> LibraryResult<Option<BookEntity>> {
        match self.find_book(book_id).await {
            Err(LibraryError::NotFound { .. }) => Ok(None),
            other => other,
        }
    }

    // assign commits `person` with its borrowed book against the `stored` row it replaces
    async fn assign(&self, person: &PersonEntity, stored: Option<&PersonEntity>) -> LibraryResult<LoanOutcome> {
        let previous = self.find_released_book(stored.and_then(|p| p.borrowed_book_id.as_deref())).await?;
        let next = self.find_book(person.borrowed_book_id.as_deref()).await?;
        let mut outcome = plan_assignment(&self.policy, person, previous.as_ref(), next.as_ref())?;

        let mut tx = LoanTransaction::new();
        outcome.person = tx.save_person(&outcome.person, stored.map(|p| p.version));
        if let Some(book) = &outcome.borrowed {
            tx.set_availability(book);
        }
        if let Some(book) = &outcome.released {
            tx.set_availability(book);
        }
        self.loan_repository.commit(&tx).await?;
        for book in outcome.borrowed.iter_mut().chain(outcome.released.iter_mut()) {
            book.version += 1;
        }
        info!(person_id = outcome.person.person_id.as_str(),
              borrowed = ?outcome.borrowed.as_ref().map(|b| b.book_id.as_str()),
              released = ?outcome.released.as_ref().map(|b| b.book_id.as_str()),
              "loan committed");

        let metadata = self.metadata(outcome.person.person_id.as_str());
        self.publish(DomainEvent::updated(PERSON_SAVED, "persons", outcome.person.person_id.as_str(),
                                          &metadata, &outcome.person)).await;
        if let Some(book) = &outcome.borrowed {
            self.publish(DomainEvent::updated(BOOK_BORROWED, LOANS_GROUP, book.book_id.as_str(), &metadata, book)).await;
        }
        if let Some(book) = &outcome.released {
            self.publish(DomainEvent::updated(BOOK_RELEASED, LOANS_GROUP, book.book_id.as_str(), &metadata, book)).await;
        }
        Ok(outcome)
    }

    fn metadata(&self, person_id: &str) -> HashMap<String, String> {
        HashMap::from([
            ("branch_id".to_string(), self.branch_id.to_string()),
            ("person_id".to_string(), person_id.to_string()),
        ])
    }

    async fn publish(&self, event: serde_json::Result<DomainEvent>) {
        publish_or_warn(self.events_publisher.as_ref(), event).await
    }
}

#[async_trait]
impl LoanService for LoanServiceImpl {
    async fn save_person(&self, person: &PersonDto) -> LibraryResult<PersonDto> {
        let stored = self.find_stored_person(person.person_id.as_str()).await?;
        let mut entity = PersonEntity::from(person);
        if let Some(stored) = &stored {
            if stored.version != person.version {
                return Err(LibraryError::conflict(format!("person {} changed, expected version {} but found {}",
                                                          person.person_id, person.version, stored.version).as_str()));
            }
            entity.created_at = stored.created_at;
        }
        let outcome = self.assign(&entity, stored.as_ref()).await?;
        Ok(PersonDto::from(&outcome.person))
    }

    async fn borrow(&self, person_id: &str, book_id: &str) -> LibraryResult<LoanDto> {
        let stored = self.person_repository.get(person_id).await?;
        let mut person = stored.clone();
        person.borrowed_book_id = Some(book_id.to_string());
        let outcome = self.assign(&person, Some(&stored)).await?;
        Ok(LoanDto::from_outcome(self.branch_id.as_str(), &outcome))
    }

    async fn return_book(&self, person_id: &str) -> LibraryResult<LoanDto> {
        let stored = self.person_repository.get(person_id).await?;
        if stored.borrowed_book_id.is_none() {
            return Err(LibraryError::not_found(format!("person {} has no borrowed book", person_id).as_str()));
        }
        let mut person = stored.clone();
        person.borrowed_book_id = None;
        let outcome = self.assign(&person, Some(&stored)).await?;
        Ok(LoanDto::from_outcome(self.branch_id.as_str(), &outcome))
    }

    async fn discharge_person(&self, person_id: &str) -> LibraryResult<()> {
        let person = self.person_repository.get(person_id).await?;
        let released = self.find_released_book(person.borrowed_book_id.as_deref()).await?.map(|mut book| {
            book.available = true;
            book
        });
        let mut tx = LoanTransaction::new();
        tx.delete_person(&person);
        if let Some(book) = &released {
            tx.set_availability(book);
        }
        self.loan_repository.commit(&tx).await?;
        info!(person_id, released = ?released.as_ref().map(|b| b.book_id.as_str()), "person discharged");

        let metadata = self.metadata(person_id);
        self.publish(DomainEvent::deleted(PERSON_REMOVED, "persons", person_id, &metadata, &person)).await;
        if let Some(book) = &released {
            self.publish(DomainEvent::updated(BOOK_RELEASED, LOANS_GROUP, book.book_id.as_str(), &metadata, book)).await;
        }
        Ok(())
    }

    async fn discharge_book(&self, book_id: &str) -> LibraryResult<()> {
        let book = self.book_repository.get(book_id).await?;
        let borrower = self.person_repository.find_by_borrowed_book(book_id).await?;
        let mut tx = LoanTransaction::new();
        let cleared = match borrower {
            Some(mut person) => {
                let expected = person.version;
                person.borrowed_book_id = None;
                Some(tx.save_person(&person, Some(expected)))
            }
            None if !book.available => {
                return Err(LibraryError::conflict(
                    format!("book {} is lent but its borrower was not found", book_id).as_str()));
            }
            None => None,
        };
        tx.delete_book(&book);
        self.loan_repository.commit(&tx).await?;
        info!(book_id, borrower = ?cleared.as_ref().map(|p| p.person_id.as_str()), "book discharged");

        let person_id = cleared.as_ref().map(|p| p.person_id.to_string()).unwrap_or_default();
        let metadata = self.metadata(person_id.as_str());
        self.publish(DomainEvent::deleted(BOOK_REMOVED, "books", book_id, &metadata, &book)).await;
        if let Some(person) = &cleared {
            self.publish(DomainEvent::updated(PERSON_SAVED, "persons", person.person_id.as_str(), &metadata, person)).await;
        }
        Ok(())
    }

    async fn find_borrower(&self, book_id: &str) -> LibraryResult<Option<PersonDto>> {
        let borrower = self.person_repository.find_by_borrowed_book(book_id).await?;
        Ok(borrower.as_ref().map(PersonDto::from))
    }
}

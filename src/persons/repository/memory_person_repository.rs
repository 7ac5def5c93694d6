use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult, PaginatedResult};
use crate::core::repository::Repository;
use crate::persons::domain::model::PersonEntity;
use crate::persons::repository::{check_no_borrowed_book, PersonRepository};
use crate::utils::memory::{matches_predicate, paginate, MemoryDatabase};

#[derive(Debug)]
pub struct MemoryPersonRepository {
    db: Arc<MemoryDatabase>,
}

impl MemoryPersonRepository {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Repository<PersonEntity> for MemoryPersonRepository {
    async fn create(&self, entity: &PersonEntity) -> LibraryResult<usize> {
        check_no_borrowed_book(entity)?;
        let mut tables = self.db.lock()?;
        if tables.persons.contains_key(&entity.person_id) {
            return Err(LibraryError::duplicate_key(format!("person {} already exists", entity.person_id).as_str()));
        }
        tables.persons.insert(entity.person_id.to_string(), entity.clone());
        Ok(1)
    }

    async fn update(&self, entity: &PersonEntity) -> LibraryResult<usize> {
        let mut tables = self.db.lock()?;
        let stored = tables.persons.get_mut(&entity.person_id)
            .ok_or_else(|| LibraryError::not_found(format!("person not found for {}", entity.person_id).as_str()))?;
        if stored.version != entity.version {
            return Err(LibraryError::conflict(format!("person {} changed, expected version {} but found {}",
                                                      entity.person_id, entity.version, stored.version).as_str()));
        }
        stored.first_name = entity.first_name.to_string();
        stored.last_name = entity.last_name.to_string();
        stored.age = entity.age;
        stored.residence = entity.residence.to_string();
        stored.version += 1;
        stored.updated_at = Utc::now().naive_utc();
        Ok(1)
    }

    async fn get(&self, id: &str) -> LibraryResult<PersonEntity> {
        let tables = self.db.lock()?;
        tables.persons.get(id).cloned()
            .ok_or_else(|| LibraryError::not_found(format!("person not found for {}", id).as_str()))
    }

    async fn delete(&self, id: &str) -> LibraryResult<usize> {
        let mut tables = self.db.lock()?;
        Ok(tables.persons.remove(id).map(|_| 1).unwrap_or(0))
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<PersonEntity>> {
        let tables = self.db.lock()?;
        let records = tables.persons.values()
            .filter(|p| matches_predicate(*p, predicate))
            .map(|p| (p.person_id.to_string(), p.clone()))
            .collect();
        Ok(paginate(records, page, page_size))
    }
}

#[async_trait]
impl PersonRepository for MemoryPersonRepository {
    async fn find_by_borrowed_book(&self, book_id: &str) -> LibraryResult<Option<PersonEntity>> {
        let tables = self.db.lock()?;
        Ok(tables.persons.values()
            .find(|p| p.borrowed_book_id.as_deref() == Some(book_id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use crate::core::library::LibraryError;
    use crate::core::repository::Repository;
    use crate::loans::domain::model::LoanTransaction;
    use crate::loans::repository::LoanRepository;
    use crate::loans::repository::memory_loan_repository::MemoryLoanRepository;
    use crate::persons::domain::model::PersonEntity;
    use crate::persons::repository::PersonRepository;
    use crate::persons::repository::memory_person_repository::MemoryPersonRepository;
    use crate::utils::memory::MemoryDatabase;

    fn sut() -> MemoryPersonRepository {
        MemoryPersonRepository::new(Arc::new(MemoryDatabase::new()))
    }

    #[tokio::test]
    async fn test_should_update_profile_only() {
        let persons_repo = sut();
        let mut person = PersonEntity::new("Jean", "Dupont", 25, "Montreuil");
        persons_repo.create(&person).await.expect("should create person");

        person.residence = "Paris".to_string();
        person.borrowed_book_id = Some("b1".to_string());
        persons_repo.update(&person).await.expect("should update person");

        let loaded = persons_repo.get(person.person_id.as_str()).await.expect("should return person");
        assert_eq!("Paris", loaded.residence.as_str());
        assert_eq!(None, loaded.borrowed_book_id);
        assert_eq!(1, loaded.version);
        assert!(matches!(persons_repo.update(&person).await, Err(LibraryError::CurrentlyUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_should_query_persons_by_residence() {
        let persons_repo = sut();
        for (first, last, age, city) in [("Jean", "Dupont", 25, "Montreuil"), ("Marie", "Martin", 30, "Montreuil"),
                                         ("Sophie", "Petit", 28, "Paris")] {
            persons_repo.create(&PersonEntity::new(first, last, age, city)).await.expect("should create person");
        }
        let res = persons_repo.query(&HashMap::from([("residence".to_string(), "Montreuil".to_string())]), None, 10)
            .await.expect("should query");
        assert_eq!(2, res.records.len());
        let res = persons_repo.query(&HashMap::from([("age".to_string(), "28".to_string())]), None, 10)
            .await.expect("should query");
        assert_eq!("Petit", res.records[0].last_name.as_str());
    }

    #[tokio::test]
    async fn test_should_reject_create_with_borrowed_book() {
        let persons_repo = sut();
        let mut person = PersonEntity::new("Lucas", "Martin", 12, "Paris");
        person.borrowed_book_id = Some("b1".to_string());
        let res = persons_repo.create(&person).await;
        assert!(matches!(res, Err(LibraryError::Validation { .. })));
        assert!(matches!(persons_repo.get(person.person_id.as_str()).await, Err(LibraryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_should_find_borrower() {
        let db = Arc::new(MemoryDatabase::new());
        let persons_repo = MemoryPersonRepository::new(db.clone());
        let loans_repo = MemoryLoanRepository::new(db.clone());
        let mut person = PersonEntity::new("Marie", "Martin", 30, "Montreuil");
        person.borrowed_book_id = Some("b1".to_string());
        let mut tx = LoanTransaction::new();
        tx.save_person(&person, None);
        loans_repo.commit(&tx).await.expect("should commit");

        let found = persons_repo.find_by_borrowed_book("b1").await.expect("should find");
        assert_eq!(Some(person.person_id.clone()), found.map(|p| p.person_id));
        assert!(persons_repo.find_by_borrowed_book("b2").await.expect("should find").is_none());
    }
}

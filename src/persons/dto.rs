use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryError, LibraryResult};
use crate::persons::Person;
use crate::utils::date::serializer;

// PersonDto is a data transfer object for person and loan services
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PersonDto {
    pub person_id: String,
    pub version: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub residence: String,
    #[serde(default)]
    pub borrowed_book_id: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PersonDto {
    pub fn new(first_name: &str, last_name: &str, age: i64, residence: &str) -> Self {
        Self {
            person_id: Uuid::new_v4().to_string(),
            version: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            residence: residence.to_string(),
            borrowed_book_id: None,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    pub fn validate(&self) -> LibraryResult<()> {
        if self.last_name.trim().is_empty() {
            return Err(LibraryError::validation("last name is required", Some("400".to_string())));
        }
        if self.age < 0 {
            return Err(LibraryError::validation(
                format!("age {} of person {} is negative", self.age, self.person_id).as_str(), Some("400".to_string())));
        }
        Ok(())
    }
}

impl Identifiable for PersonDto {
    fn id(&self) -> String {
        self.person_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Person for PersonDto {
    fn age(&self) -> i64 {
        self.age
    }

    fn residence(&self) -> String {
        self.residence.to_string()
    }

    fn borrowed_book_id(&self) -> Option<String> {
        self.borrowed_book_id.clone()
    }
}

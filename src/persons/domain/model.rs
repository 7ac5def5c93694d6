use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::core::domain::Identifiable;
use crate::persons::Person;
use crate::utils::date::serializer;

// PersonEntity is a library member. `borrowed_book_id` is the one-to-one
// link to the single book the person currently borrows.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PersonEntity {
    pub person_id: String,
    pub version: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub residence: String,
    // left out of the item when absent so the sparse borrower index skips it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowed_book_id: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PersonEntity {
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
}

impl Identifiable for PersonEntity {
    fn id(&self) -> String {
        self.person_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Person for PersonEntity {
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

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::persons::domain::PersonService;
use crate::persons::dto::PersonDto;

pub struct UpdatePersonCommand {
    person_service: Box<dyn PersonService>,
}

impl UpdatePersonCommand {
    pub fn new(person_service: Box<dyn PersonService>) -> Self {
        Self {
            person_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePersonCommandRequest {
    pub person_id: String,
    pub version: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub residence: String,
    #[serde(default)]
    pub borrowed_book_id: Option<String>,
}

impl UpdatePersonCommandRequest {
    pub fn from_person(person: &PersonDto) -> Self {
        Self {
            person_id: person.person_id.to_string(),
            version: person.version,
            first_name: person.first_name.to_string(),
            last_name: person.last_name.to_string(),
            age: person.age,
            residence: person.residence.to_string(),
            borrowed_book_id: person.borrowed_book_id.clone(),
        }
    }

    pub fn build_person(&self) -> PersonDto {
        PersonDto {
            person_id: self.person_id.to_string(),
            version: self.version,
            first_name: self.first_name.to_string(),
            last_name: self.last_name.to_string(),
            age: self.age,
            residence: self.residence.to_string(),
            borrowed_book_id: self.borrowed_book_id.clone(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatePersonCommandResponse {
    pub person: PersonDto,
}

impl UpdatePersonCommandResponse {
    pub fn new(person: PersonDto) -> Self {
        Self {
            person,
        }
    }
}

#[async_trait]
impl Command<UpdatePersonCommandRequest, UpdatePersonCommandResponse> for UpdatePersonCommand {
    async fn execute(&self, req: UpdatePersonCommandRequest) -> Result<UpdatePersonCommandResponse, CommandError> {
        let person = req.build_person();
        self.person_service.update_person(&person).await.map_err(CommandError::from).map(UpdatePersonCommandResponse::new)
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::persons::domain::PersonService;
use crate::persons::dto::PersonDto;

pub struct AddPersonCommand {
    person_service: Box<dyn PersonService>,
}

impl AddPersonCommand {
    pub fn new(person_service: Box<dyn PersonService>) -> Self {
        Self {
            person_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddPersonCommandRequest {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
    pub residence: String,
    #[serde(default)]
    pub borrowed_book_id: Option<String>,
}

impl AddPersonCommandRequest {
    pub fn new(first_name: &str, last_name: &str, age: i64, residence: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            residence: residence.to_string(),
            borrowed_book_id: None,
        }
    }

    pub fn build_person(&self) -> PersonDto {
        let mut person = PersonDto::new(self.first_name.as_str(), self.last_name.as_str(),
                                        self.age, self.residence.as_str());
        person.borrowed_book_id = self.borrowed_book_id.clone();
        person
    }
}

#[derive(Debug, Serialize)]
pub struct AddPersonCommandResponse {
    pub person: PersonDto,
}

impl AddPersonCommandResponse {
    pub fn new(person: PersonDto) -> Self {
        Self {
            person,
        }
    }
}

#[async_trait]
impl Command<AddPersonCommandRequest, AddPersonCommandResponse> for AddPersonCommand {
    async fn execute(&self, req: AddPersonCommandRequest) -> Result<AddPersonCommandResponse, CommandError> {
        let person = req.build_person();
        self.person_service.add_person(&person).await.map_err(CommandError::from).map(AddPersonCommandResponse::new)
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::persons::domain::PersonService;

pub struct RemovePersonCommand {
    person_service: Box<dyn PersonService>,
}

impl RemovePersonCommand {
    pub fn new(person_service: Box<dyn PersonService>) -> Self {
        Self {
            person_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemovePersonCommandRequest {
    pub person_id: String,
}

impl RemovePersonCommandRequest {
    pub fn new(person_id: &str) -> Self {
        Self {
            person_id: person_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct RemovePersonCommandResponse {}

#[async_trait]
impl Command<RemovePersonCommandRequest, RemovePersonCommandResponse> for RemovePersonCommand {
    async fn execute(&self, req: RemovePersonCommandRequest) -> Result<RemovePersonCommandResponse, CommandError> {
        self.person_service.remove_person(req.person_id.as_str()).await
            .map_err(CommandError::from).map(|_| RemovePersonCommandResponse::default())
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::persons::command::add_person_cmd::{AddPersonCommand, AddPersonCommandRequest};
    use crate::persons::command::remove_person_cmd::{RemovePersonCommand, RemovePersonCommandRequest};
    use crate::persons::factory;

    lazy_static! {
        static ref ADD_CMD: AsyncOnce<AddPersonCommand> = AsyncOnce::new(async {
                let svc = factory::create_person_service(&Configuration::new("test"), RepositoryStore::Memory).await;
                AddPersonCommand::new(svc)
            });
        static ref SUT_CMD: AsyncOnce<RemovePersonCommand> = AsyncOnce::new(async {
                let svc = factory::create_person_service(&Configuration::new("test"), RepositoryStore::Memory).await;
                RemovePersonCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_remove_person() {
        let person = ADD_CMD.get().await.execute(AddPersonCommandRequest::new("Jean", "Dupont", 30, "Montreuil"))
            .await.expect("should add person").person;
        let cmd = SUT_CMD.get().await;
        let _ = cmd.execute(RemovePersonCommandRequest::new(person.person_id.as_str())).await.expect("should remove person");

        let err = cmd.execute(RemovePersonCommandRequest::new(person.person_id.as_str())).await.expect_err("already removed");
        assert!(matches!(err, CommandError::NotFound { .. }));
    }
}

use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;
use crate::utils::ddb::string_date;

// DDBPublisher keeps an append-only ledger of loan events in a DynamoDB table
#[derive(Debug)]
pub struct DDBPublisher {
    client: Client,
    table_name: String,
}

impl DDBPublisher {
    pub(crate) fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

// to_event_item flattens metadata into top-level attributes so branch and
// person ids can be filtered without decoding the payload
pub(crate) fn to_event_item(event: &DomainEvent) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        ("event_id".to_string(), AttributeValue::S(event.event_id.to_string())),
        ("name".to_string(), AttributeValue::S(event.name.to_string())),
        ("group".to_string(), AttributeValue::S(event.group.to_string())),
        ("key".to_string(), AttributeValue::S(event.key.to_string())),
        ("kind".to_string(), AttributeValue::S(format!("{:?}", event.kind))),
        ("json_data".to_string(), AttributeValue::S(event.json_data.to_string())),
        ("created_at".to_string(), string_date(event.created_at)),
    ]);
    for (k, v) in &event.metadata {
        if !v.is_empty() && !item.contains_key(k) {
            item.insert(k.to_string(), AttributeValue::S(v.to_string()));
        }
    }
    item
}

#[async_trait]
impl EventPublisher for DDBPublisher {
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        let table_name: &str = self.table_name.as_ref();
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression("attribute_not_exists(event_id)")
            .set_item(Some(to_event_item(event)))
            .send()
            .await.map(|_| ()).map_err(LibraryError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use async_once::AsyncOnce;
    use aws_sdk_dynamodb::Client;
    use aws_sdk_dynamodb::types::AttributeValue;
    use lazy_static::lazy_static;
    use crate::core::events::{BOOK_BORROWED, BOOK_REMOVED, DomainEvent};
    use crate::core::repository::RepositoryStore;
    use crate::gateway::ddb::publisher::{DDBPublisher, to_event_item};
    use crate::gateway::events::EventPublisher;
    use crate::utils::ddb::{build_db_client, create_event_table, delete_table};

    lazy_static! {
        static ref CLIENT: AsyncOnce<Client> = AsyncOnce::new(async {
                let client = build_db_client(RepositoryStore::LocalDynamoDB).await;
                let _ = delete_table(&client, "events").await;
                let _ = create_event_table(&client, "events").await;
                client
            });
    }

    #[tokio::test]
    async fn test_should_flatten_loan_metadata() {
        let metadata = HashMap::from([
            ("branch_id".to_string(), "montreuil".to_string()),
            ("person_id".to_string(), "p1".to_string()),
        ]);
        let event = DomainEvent::updated(BOOK_BORROWED, "loans", "b1", &metadata, &"b1").expect("build event");
        let item = to_event_item(&event);
        assert_eq!(Some(&AttributeValue::S("p1".to_string())), item.get("person_id"));
        assert_eq!(Some(&AttributeValue::S("montreuil".to_string())), item.get("branch_id"));
        assert_eq!(Some(&AttributeValue::S("Updated".to_string())), item.get("kind"));
        assert_eq!(Some(&AttributeValue::S("b1".to_string())), item.get("key"));
    }

    #[tokio::test]
    async fn test_should_skip_empty_or_clashing_metadata() {
        let metadata = HashMap::from([
            ("person_id".to_string(), "".to_string()),
            ("key".to_string(), "other".to_string()),
        ]);
        let event = DomainEvent::deleted(BOOK_REMOVED, "books", "b1", &metadata, &"b1").expect("build event");
        let item = to_event_item(&event);
        assert!(item.get("person_id").is_none());
        assert_eq!(Some(&AttributeValue::S("b1".to_string())), item.get("key"));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB local"]
    async fn test_should_append_event_once() {
        let metadata = HashMap::from([("person_id".to_string(), "p1".to_string())]);
        let event = DomainEvent::updated(BOOK_BORROWED, "loans", "b1", &metadata, &"b1").expect("build event");
        let publisher = DDBPublisher::new(CLIENT.get().await.clone(), "events");
        publisher.publish(&event).await.expect("should publish");
        assert!(publisher.publish(&event).await.is_err());
    }
}

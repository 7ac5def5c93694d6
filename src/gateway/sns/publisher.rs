use async_trait::async_trait;
use aws_sdk_sns::Client;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::create_topic::CreateTopicError;
use aws_sdk_sns::operation::publish::PublishError;
use tracing::debug;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::gateway::events::EventPublisher;

// SNSPublisher publishes each event to a topic named after the event.
// CreateTopic is idempotent and returns the ARN of an existing topic.
#[derive(Debug)]
pub struct SNSPublisher {
    client: Client,
}

impl SNSPublisher {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    async fn topic_arn(&self, topic: &str) -> LibraryResult<String> {
        let resp = self.client.create_topic().name(topic).send().await?;
        resp.topic_arn()
            .map(str::to_string)
            .ok_or_else(|| LibraryError::runtime(format!("no arn for topic {}", topic).as_str(), None))
    }
}

#[async_trait]
impl EventPublisher for SNSPublisher {
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        let arn = self.topic_arn(event.name.as_str()).await?;
        let json = serde_json::to_string(event)?;
        self.client.publish().topic_arn(arn.as_str()).message(json).send().await?;
        debug!(topic = arn.as_str(), event_id = event.event_id.as_str(), "published event");
        Ok(())
    }
}

impl From<SdkError<CreateTopicError>> for LibraryError {
    fn from(err: SdkError<CreateTopicError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

impl From<SdkError<PublishError>> for LibraryError {
    fn from(err: SdkError<PublishError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::{BOOK_RELEASED, DomainEvent};
    use crate::gateway::{factory, GatewayPublisherVia};

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_should_publish_to_sns() {
        let event = DomainEvent::updated(BOOK_RELEASED, "loans", "b1", &HashMap::new(), &"b1").expect("build event");
        let publisher = factory::create_publisher(GatewayPublisherVia::Sns).await;
        publisher.publish(&event).await.expect("should publish");
    }
}

use async_trait::async_trait;
use tracing::warn;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryResult;

// EventPublisher sends domain events to downstream consumers
#[async_trait]
pub trait EventPublisher: Sync + Send {
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()>;
}

// publish_or_warn publishes after a committed change; failures are only logged
pub(crate) async fn publish_or_warn(publisher: &dyn EventPublisher, event: serde_json::Result<DomainEvent>) {
    let event = match event {
        Ok(event) => event,
        Err(err) => {
            warn!(error = %err, "failed to build domain event");
            return;
        }
    };
    if let Err(err) = publisher.publish(&event).await {
        warn!(event = event.name.as_str(), key = event.key.as_str(), error = %err, "failed to publish domain event");
    }
}

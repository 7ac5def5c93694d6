use async_trait::async_trait;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryResult;
use crate::gateway::events::EventPublisher;

// LogPublisher writes events to the tracing output, used with the in-memory store
#[derive(Debug, Default)]
pub struct LogPublisher {}

impl LogPublisher {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn publish(&self, event: &DomainEvent) -> LibraryResult<()> {
        info!(event_id = event.event_id.as_str(), name = event.name.as_str(), group = event.group.as_str(),
              key = event.key.as_str(), kind = ?event.kind, data = event.json_data.as_str(), "domain event");
        Ok(())
    }
}

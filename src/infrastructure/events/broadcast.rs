use crate::core::errors::BillsplitError;
use crate::infrastructure::events::{EventPublisher, LedgerEvent};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// In-process fan-out over a tokio broadcast channel. Slow subscribers lag
/// and lose old events rather than blocking the ledger.
#[derive(Clone)]
pub struct BroadcastPublisher {
    sender: broadcast::Sender<LedgerEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        BroadcastPublisher { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, event: LedgerEvent) -> Result<(), BillsplitError> {
        // no subscribers is not a failure
        if self.sender.receiver_count() == 0 {
            return Ok(());
        }
        self.sender
            .send(event)
            .map(|_| ())
            .map_err(|e| BillsplitError::EventError(format!("Failed to publish {}: no receivers", e.0.name())))
    }
}

pub mod broadcast;

use crate::core::errors::BillsplitError;
use crate::core::models::{activity::Notification, bill::Bill, payment::Payment};
use async_trait::async_trait;
use serde::Serialize;

/// Outbound real-time event. `room` is where the delivery layer should fan it
/// out: a group id, or `user:<id>` for personal events.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", content = "payload", rename_all_fields = "camelCase")]
pub enum LedgerEvent {
    #[serde(rename = "bill:created")]
    BillCreated { group_id: String, bill: Bill },
    #[serde(rename = "payment:created")]
    PaymentCreated { group_id: String, payment: Payment },
    #[serde(rename = "notification:new")]
    NotificationNew { notification: Notification },
}

impl LedgerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerEvent::BillCreated { .. } => "bill:created",
            LedgerEvent::PaymentCreated { .. } => "payment:created",
            LedgerEvent::NotificationNew { .. } => "notification:new",
        }
    }

    pub fn room(&self) -> String {
        match self {
            LedgerEvent::BillCreated { group_id, .. } | LedgerEvent::PaymentCreated { group_id, .. } => {
                group_id.clone()
            }
            LedgerEvent::NotificationNew { notification } => format!("user:{}", notification.user_id),
        }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: LedgerEvent) -> Result<(), BillsplitError>;
}

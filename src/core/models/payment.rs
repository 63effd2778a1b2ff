use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Append-only record of a transfer towards a bill's receiver.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub bill_id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    pub amount: Decimal,
    pub method: Option<String>,
    pub status: PaymentStatus,
    pub paid_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    /// Defaults to the acting user
    pub from_user_id: Option<String>,
    pub amount: Decimal,
    pub method: Option<String>,
}

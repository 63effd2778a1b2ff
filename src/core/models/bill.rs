use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillStatus {
    Open,
    PartiallyPaid,
    Paid,
}

impl BillStatus {
    fn rank(self) -> u8 {
        match self {
            BillStatus::Open => 0,
            BillStatus::PartiallyPaid => 1,
            BillStatus::Paid => 2,
        }
    }

    /// Moves towards `next` but never backwards: OPEN -> PARTIALLY_PAID -> PAID.
    pub fn advance_to(self, next: BillStatus) -> BillStatus {
        if next.rank() > self.rank() { next } else { self }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShareStatus {
    Pending,
    Paid,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub id: String,
    pub bill_id: String,
    pub user_id: String,
    pub percentage: Decimal,
    pub amount: Decimal,
    pub status: ShareStatus,
    pub created_at: DateTime<Utc>,
}

impl Share {
    pub fn is_pending(&self) -> bool {
        self.status == ShareStatus::Pending
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub group_id: String,
    pub environment_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub installments: u32,
    pub pix_key: Option<String>,
    pub payment_link: Option<String>,
    pub attachment_url: Option<String>,
    pub owner_id: String,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub category: Option<String>,
    pub status: BillStatus,
    pub archived: bool,
    pub recurring_bill_id: Option<String>,
    pub shares: Vec<Share>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    pub fn share_for(&self, user_id: &str) -> Option<&Share> {
        self.shares.iter().find(|s| s.user_id == user_id)
    }

    pub fn pending_shares(&self) -> usize {
        self.shares.iter().filter(|s| s.is_pending()).count()
    }

    pub fn is_receiver(&self, user_id: &str) -> bool {
        self.receiver_id.as_deref() == Some(user_id)
    }
}

/// One member's requested percentage of a bill or template.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareInput {
    pub user_id: String,
    pub percentage: Decimal,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    pub group_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub installments: Option<u32>,
    pub pix_key: Option<String>,
    pub payment_link: Option<String>,
    pub attachment_url: Option<String>,
    /// Defaults to the acting user
    pub owner_id: Option<String>,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub category: Option<String>,
    pub shares: Vec<ShareInput>,
}

/// Partial update of a bill. Absent fields are left untouched; for the
/// optional text fields an empty string clears the stored value.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillPatch {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub total_amount: Option<Decimal>,
    pub installments: Option<u32>,
    pub pix_key: Option<String>,
    pub payment_link: Option<String>,
    pub attachment_url: Option<String>,
    pub owner_id: Option<String>,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub category: Option<String>,
    pub shares: Option<Vec<ShareInput>>,
}

use super::bill::{Bill, ShareInput};
use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Frequency {
    Monthly,
    Weekly,
    Yearly,
}

impl Frequency {
    /// Next due date one period after `date`.
    ///
    /// Month and year steps clamp to the last valid day of the target month,
    /// so 2024-01-31 becomes 2024-02-29 and 2024-02-29 plus a year becomes
    /// 2025-02-28. Returns `None` only when the result leaves chrono's range.
    pub fn advance(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
            Frequency::Yearly => date.checked_add_months(Months::new(12)),
        }
    }
}

/// Percentage-only share of a template; amounts are derived per spawned bill.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecurringShare {
    pub user_id: String,
    pub percentage: Decimal,
}

impl From<&RecurringShare> for ShareInput {
    fn from(share: &RecurringShare) -> Self {
        ShareInput {
            user_id: share.user_id.clone(),
            percentage: share.percentage,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringBill {
    pub id: String,
    pub group_id: String,
    pub environment_id: String,
    pub title: String,
    pub total_amount: Decimal,
    pub frequency: Frequency,
    pub day_of_month: u32,
    pub next_due_date: NaiveDate,
    pub pix_key: Option<String>,
    pub payment_link: Option<String>,
    pub attachment_url: Option<String>,
    pub owner_id: String,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub category: Option<String>,
    pub shares: Vec<RecurringShare>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringBill {
    pub fn share_inputs(&self) -> Vec<ShareInput> {
        self.shares.iter().map(ShareInput::from).collect()
    }
}

fn default_create_first_bill() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringBill {
    pub group_id: String,
    pub title: String,
    pub total_amount: Decimal,
    pub frequency: Frequency,
    /// Due date of the first occurrence
    pub due_date: NaiveDate,
    pub pix_key: Option<String>,
    pub payment_link: Option<String>,
    pub attachment_url: Option<String>,
    pub owner_id: Option<String>,
    pub receiver_id: Option<String>,
    pub receiver_name: Option<String>,
    pub category: Option<String>,
    pub shares: Vec<ShareInput>,
    #[serde(default = "default_create_first_bill")]
    pub create_first_bill: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringCreated {
    pub recurring: RecurringBill,
    pub first_bill: Option<Bill>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedBills {
    pub count: usize,
    pub bills: Vec<Bill>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekly_adds_seven_days() {
        assert_eq!(Frequency::Weekly.advance(date(2024, 12, 28)), Some(date(2025, 1, 4)));
    }

    #[test]
    fn monthly_clamps_to_end_of_february() {
        assert_eq!(Frequency::Monthly.advance(date(2024, 1, 31)), Some(date(2024, 2, 29)));
        assert_eq!(Frequency::Monthly.advance(date(2023, 1, 31)), Some(date(2023, 2, 28)));
        // the clamped day carries into later periods
        assert_eq!(Frequency::Monthly.advance(date(2024, 2, 29)), Some(date(2024, 3, 29)));
    }

    #[test]
    fn yearly_clamps_leap_day() {
        assert_eq!(Frequency::Yearly.advance(date(2024, 2, 29)), Some(date(2025, 2, 28)));
        assert_eq!(Frequency::Yearly.advance(date(2024, 5, 10)), Some(date(2025, 5, 10)));
    }
}

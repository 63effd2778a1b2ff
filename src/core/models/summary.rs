use super::user::User;
use super::window::MonthWindow;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub total_to_pay: Decimal,
    pub total_to_receive: Decimal,
    pub net_balance: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayerRef {
    pub user_id: String,
    pub name: Option<String>,
}

/// A single pending share of the person, with enough bill context to render
/// who is owed what and where.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebtLine {
    pub share_id: String,
    pub bill_id: String,
    pub group_id: String,
    pub group_name: Option<String>,
    pub environment_id: String,
    pub environment_name: Option<String>,
    pub title: String,
    pub category: Option<String>,
    pub due_date: NaiveDate,
    pub total_amount: Decimal,
    pub share_amount: Decimal,
    pub share_percentage: Decimal,
    pub payer: PayerRef,
    pub receiver_user_id: Option<String>,
    pub receiver_user_name: Option<String>,
    pub receiver_name: Option<String>,
    pub owner_user_id: String,
    pub owner_user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: String,
    pub user: Option<User>,
    pub total_to_pay: Decimal,
    pub total_to_receive: Decimal,
    pub net_balance: Decimal,
    pub categories: Vec<CategoryTotal>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub members: Vec<MemberSummary>,
}

/// Scope of a dashboard read. `person_id` defaults to the querying user.
#[derive(Clone, Debug, Default)]
pub struct DashboardQuery {
    pub person_id: Option<String>,
    pub window: Option<MonthWindow>,
    pub group_id: Option<String>,
    pub environment_id: Option<String>,
    pub category: Option<String>,
}

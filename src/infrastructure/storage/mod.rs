use crate::core::errors::BillsplitError;
use crate::core::models::{
    activity::{Activity, Notification},
    bill::{Bill, BillStatus},
    group::{Category, Environment, Group, GroupMember},
    payment::Payment,
    recurring::RecurringBill,
    user::User,
    window::MonthWindow,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Selection of non-archived bills. `None` fields do not restrict.
#[derive(Clone, Debug, Default)]
pub struct BillFilter {
    pub group_ids: Option<Vec<String>>,
    pub environment_id: Option<String>,
    pub window: Option<MonthWindow>,
    pub status: Option<BillStatus>,
}

impl BillFilter {
    pub fn matches(&self, bill: &Bill) -> bool {
        !bill.archived
            && self
                .group_ids
                .as_ref()
                .is_none_or(|ids| ids.iter().any(|id| *id == bill.group_id))
            && self
                .environment_id
                .as_ref()
                .is_none_or(|env| *env == bill.environment_id)
            && self.window.is_none_or(|w| w.contains(bill.due_date))
            && self.status.is_none_or(|s| s == bill.status)
    }
}

/// Persistence for the ledger. Every method that writes more than one entity
/// must apply all of it or nothing.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_user(&self, user: User) -> Result<(), BillsplitError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, BillsplitError>;
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, BillsplitError>;

    async fn save_group(&self, group: Group) -> Result<(), BillsplitError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BillsplitError>;
    async fn save_member(&self, member: GroupMember) -> Result<(), BillsplitError>;
    async fn get_member(&self, group_id: &str, user_id: &str) -> Result<Option<GroupMember>, BillsplitError>;
    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMember>, BillsplitError>;
    async fn list_user_memberships(&self, user_id: &str) -> Result<Vec<GroupMember>, BillsplitError>;
    async fn save_environment(&self, environment: Environment) -> Result<(), BillsplitError>;
    async fn get_environment(&self, environment_id: &str) -> Result<Option<Environment>, BillsplitError>;
    async fn save_category(&self, category: Category) -> Result<(), BillsplitError>;
    async fn find_category(&self, group_id: &str, name: &str) -> Result<Option<Category>, BillsplitError>;
    async fn list_categories(&self, group_id: &str) -> Result<Vec<Category>, BillsplitError>;

    /// Writes the bill together with its full share set, replacing any
    /// previous version and all of its previous shares.
    async fn save_bill(&self, bill: Bill) -> Result<(), BillsplitError>;
    /// Returns the bill even when archived.
    async fn get_bill(&self, bill_id: &str) -> Result<Option<Bill>, BillsplitError>;
    /// Matching bills ordered by due date, then creation time.
    async fn find_bills(&self, filter: &BillFilter) -> Result<Vec<Bill>, BillsplitError>;

    /// Compare-and-set: replaces the stored bill only while its `updated_at`
    /// still equals `expected_updated_at`. Returns `false` without writing
    /// when another write landed in between.
    async fn replace_bill(&self, bill: Bill, expected_updated_at: DateTime<Utc>) -> Result<bool, BillsplitError>;

    /// Appends the payment and stores the updated bill in one step, guarded
    /// like `replace_bill`. Nothing is written when it returns `false`.
    async fn record_payment(
        &self,
        payment: Payment,
        bill: Bill,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, BillsplitError>;
    async fn list_payments(&self, bill_id: &str) -> Result<Vec<Payment>, BillsplitError>;

    /// Stores a template, and its first bill when given, in one step.
    async fn save_recurring(&self, template: RecurringBill, first_bill: Option<Bill>) -> Result<(), BillsplitError>;
    async fn get_recurring(&self, template_id: &str) -> Result<Option<RecurringBill>, BillsplitError>;
    /// Flips only the active flag so a concurrent generation pass never has
    /// its advanced due date overwritten.
    async fn set_recurring_active(
        &self,
        template_id: &str,
        active: bool,
    ) -> Result<Option<RecurringBill>, BillsplitError>;
    /// Templates of an environment, newest first.
    async fn list_recurring(&self, environment_id: &str) -> Result<Vec<RecurringBill>, BillsplitError>;
    /// Active templates with `next_due_date <= as_of`.
    async fn find_due_recurring(
        &self,
        group_id: Option<&str>,
        environment_id: Option<&str>,
        as_of: NaiveDate,
    ) -> Result<Vec<RecurringBill>, BillsplitError>;
    /// Compare-and-set: if the template is still active and due at
    /// `expected_due`, advances it to `next_due` and stores `bill` in the same
    /// step. Returns `false` without writing anything when another pass got
    /// there first.
    async fn materialize_recurring(
        &self,
        template_id: &str,
        expected_due: NaiveDate,
        next_due: NaiveDate,
        bill: Bill,
    ) -> Result<bool, BillsplitError>;

    async fn save_activity(&self, activity: Activity) -> Result<(), BillsplitError>;
    /// Newest first; entries of any of `group_ids` or authored by `user_id`.
    async fn list_activities(
        &self,
        group_ids: &[String],
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>, BillsplitError>;

    async fn save_notification(&self, notification: Notification) -> Result<(), BillsplitError>;
    async fn get_notification(&self, notification_id: &str) -> Result<Option<Notification>, BillsplitError>;
    /// Newest first.
    async fn list_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>, BillsplitError>;
    /// Marks every unread notification of the user as read; returns how many changed.
    async fn mark_notifications_read(&self, user_id: &str, read_at: DateTime<Utc>) -> Result<usize, BillsplitError>;
}

pub mod in_memory;

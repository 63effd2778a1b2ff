use crate::core::errors::BillsplitError;
use crate::core::models::{
    activity::{Activity, Notification},
    bill::Bill,
    group::{Category, Environment, Group, GroupMember},
    payment::Payment,
    recurring::RecurringBill,
    user::User,
};
use crate::infrastructure::storage::{BillFilter, Storage};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local store. Multi-table writes take their locks in the order
/// recurring -> bills -> payments and hold them for the whole write.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
    members: Arc<RwLock<HashMap<(String, String), GroupMember>>>,
    environments: Arc<RwLock<HashMap<String, Environment>>>,
    categories: Arc<RwLock<HashMap<String, Category>>>,
    recurring: Arc<RwLock<HashMap<String, RecurringBill>>>,
    bills: Arc<RwLock<HashMap<String, Bill>>>,
    payments: Arc<RwLock<Vec<Payment>>>,
    activities: Arc<RwLock<Vec<Activity>>>,
    notifications: Arc<RwLock<HashMap<String, Notification>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn is_unchanged(bills: &HashMap<String, Bill>, bill_id: &str, expected_updated_at: DateTime<Utc>) -> bool {
    bills.get(bill_id).is_some_and(|b| b.updated_at == expected_updated_at)
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_user(&self, user: User) -> Result<(), BillsplitError> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, BillsplitError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, BillsplitError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.name == name).cloned())
    }

    async fn save_group(&self, group: Group) -> Result<(), BillsplitError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BillsplitError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn save_member(&self, member: GroupMember) -> Result<(), BillsplitError> {
        let mut members = self.members.write().await;
        members.insert((member.group_id.clone(), member.user_id.clone()), member);
        Ok(())
    }

    async fn get_member(&self, group_id: &str, user_id: &str) -> Result<Option<GroupMember>, BillsplitError> {
        let members = self.members.read().await;
        Ok(members.get(&(group_id.to_string(), user_id.to_string())).cloned())
    }

    async fn list_members(&self, group_id: &str) -> Result<Vec<GroupMember>, BillsplitError> {
        let members = self.members.read().await;
        let mut result: Vec<GroupMember> = members.values().filter(|m| m.group_id == group_id).cloned().collect();
        result.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then_with(|| a.user_id.cmp(&b.user_id)));
        Ok(result)
    }

    async fn list_user_memberships(&self, user_id: &str) -> Result<Vec<GroupMember>, BillsplitError> {
        let members = self.members.read().await;
        Ok(members.values().filter(|m| m.user_id == user_id).cloned().collect())
    }

    async fn save_environment(&self, environment: Environment) -> Result<(), BillsplitError> {
        let mut environments = self.environments.write().await;
        environments.insert(environment.id.clone(), environment);
        Ok(())
    }

    async fn get_environment(&self, environment_id: &str) -> Result<Option<Environment>, BillsplitError> {
        let environments = self.environments.read().await;
        Ok(environments.get(environment_id).cloned())
    }

    async fn save_category(&self, category: Category) -> Result<(), BillsplitError> {
        let mut categories = self.categories.write().await;
        categories.insert(category.id.clone(), category);
        Ok(())
    }

    async fn find_category(&self, group_id: &str, name: &str) -> Result<Option<Category>, BillsplitError> {
        let categories = self.categories.read().await;
        Ok(categories
            .values()
            .find(|c| c.group_id == group_id && c.name == name)
            .cloned())
    }

    async fn list_categories(&self, group_id: &str) -> Result<Vec<Category>, BillsplitError> {
        let categories = self.categories.read().await;
        let mut result: Vec<Category> = categories
            .values()
            .filter(|c| c.group_id == group_id && !c.archived)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn save_bill(&self, bill: Bill) -> Result<(), BillsplitError> {
        let mut bills = self.bills.write().await;
        bills.insert(bill.id.clone(), bill);
        Ok(())
    }

    async fn get_bill(&self, bill_id: &str) -> Result<Option<Bill>, BillsplitError> {
        let bills = self.bills.read().await;
        Ok(bills.get(bill_id).cloned())
    }

    async fn find_bills(&self, filter: &BillFilter) -> Result<Vec<Bill>, BillsplitError> {
        let bills = self.bills.read().await;
        let mut result: Vec<Bill> = bills.values().filter(|b| filter.matches(b)).cloned().collect();
        result.sort_by(|a, b| {
            a.due_date
                .cmp(&b.due_date)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(result)
    }

    async fn replace_bill(&self, bill: Bill, expected_updated_at: DateTime<Utc>) -> Result<bool, BillsplitError> {
        let mut bills = self.bills.write().await;
        if !is_unchanged(&bills, &bill.id, expected_updated_at) {
            return Ok(false);
        }
        bills.insert(bill.id.clone(), bill);
        Ok(true)
    }

    async fn record_payment(
        &self,
        payment: Payment,
        bill: Bill,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, BillsplitError> {
        let mut bills = self.bills.write().await;
        let mut payments = self.payments.write().await;
        if !is_unchanged(&bills, &bill.id, expected_updated_at) {
            return Ok(false);
        }
        bills.insert(bill.id.clone(), bill);
        payments.push(payment);
        Ok(true)
    }

    async fn list_payments(&self, bill_id: &str) -> Result<Vec<Payment>, BillsplitError> {
        let payments = self.payments.read().await;
        Ok(payments.iter().filter(|p| p.bill_id == bill_id).cloned().collect())
    }

    async fn save_recurring(&self, template: RecurringBill, first_bill: Option<Bill>) -> Result<(), BillsplitError> {
        let mut recurring = self.recurring.write().await;
        let mut bills = self.bills.write().await;
        if let Some(bill) = first_bill {
            bills.insert(bill.id.clone(), bill);
        }
        recurring.insert(template.id.clone(), template);
        Ok(())
    }

    async fn get_recurring(&self, template_id: &str) -> Result<Option<RecurringBill>, BillsplitError> {
        let recurring = self.recurring.read().await;
        Ok(recurring.get(template_id).cloned())
    }

    async fn set_recurring_active(
        &self,
        template_id: &str,
        active: bool,
    ) -> Result<Option<RecurringBill>, BillsplitError> {
        let mut recurring = self.recurring.write().await;
        Ok(recurring.get_mut(template_id).map(|template| {
            template.active = active;
            template.updated_at = Utc::now();
            template.clone()
        }))
    }

    async fn list_recurring(&self, environment_id: &str) -> Result<Vec<RecurringBill>, BillsplitError> {
        let recurring = self.recurring.read().await;
        let mut result: Vec<RecurringBill> = recurring
            .values()
            .filter(|t| t.environment_id == environment_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn find_due_recurring(
        &self,
        group_id: Option<&str>,
        environment_id: Option<&str>,
        as_of: NaiveDate,
    ) -> Result<Vec<RecurringBill>, BillsplitError> {
        let recurring = self.recurring.read().await;
        let mut result: Vec<RecurringBill> = recurring
            .values()
            .filter(|t| t.active && t.next_due_date <= as_of)
            .filter(|t| group_id.is_none_or(|g| t.group_id == g))
            .filter(|t| environment_id.is_none_or(|e| t.environment_id == e))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.next_due_date.cmp(&b.next_due_date).then_with(|| a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn materialize_recurring(
        &self,
        template_id: &str,
        expected_due: NaiveDate,
        next_due: NaiveDate,
        bill: Bill,
    ) -> Result<bool, BillsplitError> {
        let mut recurring = self.recurring.write().await;
        let mut bills = self.bills.write().await;
        let Some(template) = recurring.get_mut(template_id) else {
            return Ok(false);
        };
        if !template.active || template.next_due_date != expected_due {
            return Ok(false);
        }
        template.next_due_date = next_due;
        template.updated_at = Utc::now();
        bills.insert(bill.id.clone(), bill);
        Ok(true)
    }

    async fn save_activity(&self, activity: Activity) -> Result<(), BillsplitError> {
        let mut activities = self.activities.write().await;
        activities.push(activity);
        Ok(())
    }

    async fn list_activities(
        &self,
        group_ids: &[String],
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<Activity>, BillsplitError> {
        let activities = self.activities.read().await;
        // appended in time order, so walking backwards yields newest first
        Ok(activities
            .iter()
            .rev()
            .filter(|a| group_ids.contains(&a.group_id) || a.user_id.as_deref() == Some(user_id))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn save_notification(&self, notification: Notification) -> Result<(), BillsplitError> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id.clone(), notification);
        Ok(())
    }

    async fn get_notification(&self, notification_id: &str) -> Result<Option<Notification>, BillsplitError> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(notification_id).cloned())
    }

    async fn list_notifications(&self, user_id: &str, limit: usize) -> Result<Vec<Notification>, BillsplitError> {
        let notifications = self.notifications.read().await;
        let mut result: Vec<Notification> = notifications.values().filter(|n| n.user_id == user_id).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        result.truncate(limit);
        Ok(result)
    }

    async fn mark_notifications_read(&self, user_id: &str, read_at: DateTime<Utc>) -> Result<usize, BillsplitError> {
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for notification in notifications.values_mut().filter(|n| n.user_id == user_id && !n.read) {
            notification.read = true;
            notification.read_at = Some(read_at);
            changed += 1;
        }
        Ok(changed)
    }
}

mod bills;
mod dashboard;
mod directory;
mod payments;
mod recurring;

use crate::auth::jwt::{Claims, JwtService};
use crate::core::allocator::Allocation;
use crate::core::errors::BillsplitError;
use crate::core::models::{
    activity::{Activity, Notification},
    bill::{Share, ShareInput, ShareStatus},
    group::{Environment, Group, GroupMember},
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::events::{EventPublisher, LedgerEvent};
use crate::infrastructure::storage::Storage;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

const MAX_AMOUNT: i64 = 1_000_000;

pub struct BillsplitService<S: Storage, C: Cache, E: EventPublisher> {
    storage: S,
    cache: C,
    events: E,
    jwt_service: JwtService,
    summary_ttl: Duration,
}

impl<S: Storage, C: Cache, E: EventPublisher> BillsplitService<S, C, E> {
    pub fn new(storage: S, cache: C, events: E, jwt_secret: String) -> Self {
        BillsplitService {
            storage,
            cache,
            events,
            jwt_service: JwtService::new(jwt_secret),
            summary_ttl: Duration::from_secs(300),
        }
    }

    pub fn with_summary_ttl(mut self, ttl: Duration) -> Self {
        self.summary_ttl = ttl;
        self
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, BillsplitError> {
        self.jwt_service.validate_token(token)
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), BillsplitError> {
        if value.trim().is_empty() {
            return Err(BillsplitError::validation(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(BillsplitError::validation(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(BillsplitError::validation(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: Decimal) -> Result<(), BillsplitError> {
        if amount <= Decimal::ZERO {
            return Err(BillsplitError::validation(
                field,
                "Invalid Amount",
                "Amount must be greater than 0",
            ));
        }
        if amount > Decimal::from(MAX_AMOUNT) {
            return Err(BillsplitError::validation(
                field,
                "Amount Too Large",
                "Amount cannot exceed 1,000,000",
            ));
        }
        if amount.round_dp(2) != amount {
            return Err(BillsplitError::validation(
                field,
                "Invalid Amount",
                "Amount cannot have more than 2 decimal places",
            ));
        }
        Ok(())
    }

    /// Group that exists and is not archived.
    async fn active_group(&self, group_id: &str) -> Result<Group, BillsplitError> {
        self.storage
            .get_group(group_id)
            .await?
            .filter(|g| !g.archived)
            .ok_or_else(|| BillsplitError::not_found("Group", group_id))
    }

    async fn require_active_member(&self, group_id: &str, user_id: &str) -> Result<GroupMember, BillsplitError> {
        self.storage
            .get_member(group_id, user_id)
            .await?
            .filter(|m| m.active)
            .ok_or_else(|| {
                BillsplitError::Forbidden(format!("user {} is not an active member of group {}", user_id, group_id))
            })
    }

    async fn environment_in_group(&self, environment_id: &str, group_id: &str) -> Result<Environment, BillsplitError> {
        let environment = self
            .storage
            .get_environment(environment_id)
            .await?
            .filter(|e| !e.archived)
            .ok_or_else(|| BillsplitError::not_found("Environment", environment_id))?;
        if environment.group_id != group_id {
            return Err(BillsplitError::validation(
                "groupId",
                "Invalid Group",
                format!("environment {} does not belong to group {}", environment_id, group_id),
            ));
        }
        Ok(environment)
    }

    /// Every share holder must be an active member of the group.
    async fn validate_share_members(&self, group_id: &str, shares: &[ShareInput]) -> Result<(), BillsplitError> {
        for share in shares {
            let active = self
                .storage
                .get_member(group_id, &share.user_id)
                .await?
                .is_some_and(|m| m.active);
            if !active {
                return Err(BillsplitError::validation(
                    "shares",
                    "Invalid Share Member",
                    format!("user {} is not an active member of group {}", share.user_id, group_id),
                ));
            }
        }
        Ok(())
    }

    /// Resolves the payee of a bill. A linked user id wins; otherwise a free
    /// text name is matched exactly against registered users and kept as is
    /// when nobody matches.
    async fn resolve_receiver(
        &self,
        receiver_id: Option<String>,
        receiver_name: Option<String>,
    ) -> Result<(Option<String>, Option<String>), BillsplitError> {
        let receiver_name = normalize_text(receiver_name);
        if let Some(id) = normalize_text(receiver_id) {
            let user = self
                .storage
                .get_user(&id)
                .await?
                .ok_or_else(|| BillsplitError::not_found("User", &id))?;
            return Ok((Some(user.id), receiver_name.or(Some(user.name))));
        }
        match receiver_name {
            Some(name) => {
                let matched = self.storage.find_user_by_name(&name).await?;
                Ok((matched.map(|u| u.id), Some(name)))
            }
            None => Err(BillsplitError::validation(
                "receiver",
                "Missing Receiver",
                "either receiverId or receiverName is required",
            )),
        }
    }

    async fn record_activity(&self, group_id: &str, user_id: Option<&str>, activity_type: &str, description: String) {
        let activity = Activity {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            user_id: user_id.map(String::from),
            activity_type: activity_type.to_string(),
            description,
            created_at: Utc::now(),
        };
        if let Err(e) = self.storage.save_activity(activity).await {
            warn!(group_id, activity_type, error = %e, "failed to record activity");
        }
    }

    async fn notify(&self, user_id: &str, title: &str, message: String, notification_type: &str) {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            message,
            notification_type: notification_type.to_string(),
            read: false,
            created_at: Utc::now(),
            read_at: None,
        };
        if let Err(e) = self.storage.save_notification(notification.clone()).await {
            warn!(user_id, error = %e, "failed to store notification");
            return;
        }
        self.publish(LedgerEvent::NotificationNew { notification }).await;
    }

    async fn publish(&self, event: LedgerEvent) {
        let name = event.name();
        let room = event.room();
        if let Err(e) = self.events.publish(event).await {
            warn!(event = name, room = %room, error = %e, "failed to publish event");
        }
    }

    async fn invalidate_summaries(&self) {
        if let Err(e) = self.cache.invalidate_summaries().await {
            warn!(error = %e, "failed to invalidate summary cache");
        }
    }

    /// Group ids of non-archived groups where the user is an active member.
    async fn member_group_ids(&self, user_id: &str) -> Result<Vec<String>, BillsplitError> {
        let mut group_ids = Vec::new();
        for membership in self.storage.list_user_memberships(user_id).await? {
            if !membership.active {
                continue;
            }
            if let Some(group) = self.storage.get_group(&membership.group_id).await? {
                if !group.archived {
                    group_ids.push(group.id);
                }
            }
        }
        group_ids.sort();
        Ok(group_ids)
    }
}

fn build_shares(bill_id: &str, allocations: Vec<Allocation>, now: DateTime<Utc>) -> Vec<Share> {
    allocations
        .into_iter()
        .map(|a| Share {
            id: Uuid::new_v4().to_string(),
            bill_id: bill_id.to_string(),
            user_id: a.user_id,
            percentage: a.percentage,
            amount: a.amount,
            status: ShareStatus::Pending,
            created_at: now,
        })
        .collect()
}

/// Trims optional free text; blank becomes `None`.
fn normalize_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

use super::{BillsplitService, normalize_text};
use crate::constants::{DEFAULT_ENVIRONMENT_NAME, MAX_NAME_LENGTH, NOTIFICATION_LIMIT};
use crate::core::errors::BillsplitError;
use crate::core::models::{
    activity::Notification,
    group::{Category, Environment, Group, GroupMember, Role},
    user::User,
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

impl<S: Storage, C: Cache, E: EventPublisher> BillsplitService<S, C, E> {
    pub async fn create_user(&self, name: String, email: String) -> Result<User, BillsplitError> {
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        let email = email.trim().to_string();
        if !email.contains('@') || !email.contains('.') || email.len() < 5 {
            return Err(BillsplitError::validation(
                "email",
                "Invalid email",
                format!("{} is not a valid email address", email),
            ));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email,
        };
        self.storage.save_user(user.clone()).await?;
        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, BillsplitError> {
        self.storage.get_user(user_id).await
    }

    /// Creates a group owned by the actor, who joins as ADMIN, together with
    /// its default environment.
    pub async fn create_group(&self, actor_id: &str, name: String) -> Result<(Group, Environment), BillsplitError> {
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        self.storage
            .get_user(actor_id)
            .await?
            .ok_or_else(|| BillsplitError::not_found("User", actor_id))?;

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            owner_id: actor_id.to_string(),
            archived: false,
            created_at: now,
        };
        let environment = Environment {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            name: DEFAULT_ENVIRONMENT_NAME.to_string(),
            description: None,
            archived: false,
            created_at: now,
        };
        self.storage.save_group(group.clone()).await?;
        self.storage
            .save_member(GroupMember {
                group_id: group.id.clone(),
                user_id: actor_id.to_string(),
                role: Role::Admin,
                active: true,
                joined_at: now,
            })
            .await?;
        self.storage.save_environment(environment.clone()).await?;
        info!(group_id = %group.id, owner_id = actor_id, "group created");
        Ok((group, environment))
    }

    /// Adds a user to the group, or re-activates a previous membership with
    /// the given role. Only admins may add members.
    pub async fn add_member(
        &self,
        actor_id: &str,
        group_id: &str,
        user_id: &str,
        role: Role,
    ) -> Result<GroupMember, BillsplitError> {
        let group = self.active_group(group_id).await?;
        let actor = self.require_active_member(&group.id, actor_id).await?;
        if !actor.is_admin() {
            return Err(BillsplitError::Forbidden(format!(
                "only admins can add members to group {}",
                group.id
            )));
        }
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| BillsplitError::not_found("User", user_id))?;

        let member = match self.storage.get_member(&group.id, user_id).await? {
            Some(existing) => GroupMember {
                role,
                active: true,
                ..existing
            },
            None => GroupMember {
                group_id: group.id.clone(),
                user_id: user_id.to_string(),
                role,
                active: true,
                joined_at: Utc::now(),
            },
        };
        self.storage.save_member(member.clone()).await?;
        self.invalidate_summaries().await;
        info!(group_id = %group.id, user_id, role = %member.role, "member added");
        Ok(member)
    }

    pub async fn create_environment(
        &self,
        actor_id: &str,
        group_id: &str,
        name: String,
        description: Option<String>,
    ) -> Result<Environment, BillsplitError> {
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        let group = self.active_group(group_id).await?;
        self.require_active_member(&group.id, actor_id).await?;

        let environment = Environment {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            name: name.trim().to_string(),
            description: normalize_text(description),
            archived: false,
            created_at: Utc::now(),
        };
        self.storage.save_environment(environment.clone()).await?;
        info!(environment_id = %environment.id, group_id = %group.id, "environment created");
        Ok(environment)
    }

    /// Archived groups drop out of every listing and balance query.
    pub async fn archive_group(&self, actor_id: &str, group_id: &str) -> Result<(), BillsplitError> {
        let mut group = self.active_group(group_id).await?;
        if group.owner_id != actor_id {
            return Err(BillsplitError::Forbidden(format!(
                "only the owner can archive group {}",
                group.id
            )));
        }
        group.archived = true;
        self.storage.save_group(group.clone()).await?;
        self.invalidate_summaries().await;
        info!(group_id = %group.id, "group archived");
        Ok(())
    }

    /// Deactivates the actor's membership. The row is kept so existing shares
    /// still resolve; the owner cannot leave.
    pub async fn leave_group(&self, actor_id: &str, group_id: &str) -> Result<(), BillsplitError> {
        let group = self
            .storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| BillsplitError::not_found("Group", group_id))?;
        if group.owner_id == actor_id {
            return Err(BillsplitError::InvalidState(format!(
                "the owner cannot leave group {}",
                group.id
            )));
        }
        let mut member = self
            .storage
            .get_member(&group.id, actor_id)
            .await?
            .filter(|m| m.active)
            .ok_or_else(|| BillsplitError::not_found("Membership", actor_id))?;
        member.active = false;
        self.storage.save_member(member).await?;
        self.invalidate_summaries().await;
        info!(group_id = %group.id, user_id = actor_id, "member left group");
        Ok(())
    }

    /// Creates the category, or re-activates an archived one of the same name.
    pub async fn upsert_category(&self, actor_id: &str, group_id: &str, name: String) -> Result<Category, BillsplitError> {
        let name = name.trim().to_string();
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        let group = self.active_group(group_id).await?;
        self.storage
            .get_member(&group.id, actor_id)
            .await?
            .filter(|m| m.active)
            .ok_or_else(|| BillsplitError::not_found("Membership", actor_id))?;

        let now = Utc::now();
        let category = match self.storage.find_category(&group.id, &name).await? {
            Some(existing) => Category {
                archived: false,
                updated_at: now,
                ..existing
            },
            None => Category {
                id: Uuid::new_v4().to_string(),
                group_id: group.id.clone(),
                name,
                archived: false,
                created_at: now,
                updated_at: now,
            },
        };
        self.storage.save_category(category.clone()).await?;
        Ok(category)
    }

    pub async fn list_categories(&self, actor_id: &str, group_id: &str) -> Result<Vec<Category>, BillsplitError> {
        let group = self.active_group(group_id).await?;
        self.require_active_member(&group.id, actor_id).await?;
        self.storage.list_categories(&group.id).await
    }

    pub async fn list_notifications(&self, actor_id: &str) -> Result<Vec<Notification>, BillsplitError> {
        self.storage.list_notifications(actor_id, NOTIFICATION_LIMIT).await
    }

    pub async fn mark_notification_read(
        &self,
        actor_id: &str,
        notification_id: &str,
    ) -> Result<Notification, BillsplitError> {
        let mut notification = self
            .storage
            .get_notification(notification_id)
            .await?
            .filter(|n| n.user_id == actor_id)
            .ok_or_else(|| BillsplitError::not_found("Notification", notification_id))?;
        if !notification.read {
            notification.read = true;
            notification.read_at = Some(Utc::now());
            self.storage.save_notification(notification.clone()).await?;
        }
        Ok(notification)
    }

    pub async fn mark_all_notifications_read(&self, actor_id: &str) -> Result<usize, BillsplitError> {
        self.storage.mark_notifications_read(actor_id, Utc::now()).await
    }
}

use super::{BillsplitService, build_shares, normalize_text};
use crate::constants::{
    BILL_ARCHIVED, BILL_CREATED, BILL_UPDATED, MAX_TITLE_LENGTH, NOTIFY_BILL_CREATED,
};
use crate::core::allocator::{self, share_amount};
use crate::core::errors::BillsplitError;
use crate::core::models::{
    bill::{Bill, BillPatch, BillStatus, NewBill},
    payment::Payment,
    window::MonthWindow,
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::events::{EventPublisher, LedgerEvent};
use crate::infrastructure::storage::{BillFilter, Storage};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

impl<S: Storage, C: Cache, E: EventPublisher> BillsplitService<S, C, E> {
    pub async fn create_bill(
        &self,
        actor_id: &str,
        environment_id: &str,
        new_bill: NewBill,
    ) -> Result<Bill, BillsplitError> {
        self.validate_string_input("title", &new_bill.title, MAX_TITLE_LENGTH)?;
        self.validate_amount_input("totalAmount", new_bill.total_amount)?;
        let installments = new_bill.installments.unwrap_or(1);
        if installments == 0 {
            return Err(BillsplitError::validation(
                "installments",
                "Invalid Installments",
                "installments must be at least 1",
            ));
        }

        let group = self.active_group(&new_bill.group_id).await?;
        self.environment_in_group(environment_id, &group.id).await?;
        self.require_active_member(&group.id, actor_id).await?;

        let owner_id = normalize_text(new_bill.owner_id).unwrap_or_else(|| actor_id.to_string());
        if owner_id != actor_id {
            self.require_active_member(&group.id, &owner_id).await?;
        }
        let (receiver_id, receiver_name) = self
            .resolve_receiver(new_bill.receiver_id, new_bill.receiver_name)
            .await?;

        let allocations = allocator::allocate(new_bill.total_amount, &new_bill.shares)?;
        self.validate_share_members(&group.id, &new_bill.shares).await?;

        let now = Utc::now();
        let bill_id = Uuid::new_v4().to_string();
        let bill = Bill {
            id: bill_id.clone(),
            group_id: group.id.clone(),
            environment_id: environment_id.to_string(),
            title: new_bill.title.trim().to_string(),
            due_date: new_bill.due_date,
            total_amount: new_bill.total_amount,
            installments,
            pix_key: normalize_text(new_bill.pix_key),
            payment_link: normalize_text(new_bill.payment_link),
            attachment_url: normalize_text(new_bill.attachment_url),
            owner_id,
            receiver_id,
            receiver_name,
            category: normalize_text(new_bill.category),
            status: BillStatus::Open,
            archived: false,
            recurring_bill_id: None,
            shares: build_shares(&bill_id, allocations, now),
            created_at: now,
            updated_at: now,
        };

        self.storage.save_bill(bill.clone()).await?;
        info!(bill_id = %bill.id, group_id = %bill.group_id, total = %bill.total_amount, "bill created");

        self.announce_bill(
            &bill,
            Some(actor_id),
            BILL_CREATED,
            format!("Bill \"{}\" created", bill.title),
        )
        .await;
        Ok(bill)
    }

    /// Side effects of a new bill: activity entry, one notification per
    /// share holder and a group event. Failures here are logged only.
    pub(super) async fn announce_bill(
        &self,
        bill: &Bill,
        actor_id: Option<&str>,
        activity_type: &str,
        description: String,
    ) {
        self.invalidate_summaries().await;
        self.record_activity(&bill.group_id, actor_id, activity_type, description)
            .await;
        for share in &bill.shares {
            self.notify(
                &share.user_id,
                "New bill",
                format!(
                    "You owe {} ({}%) on \"{}\", due {}",
                    share.amount, share.percentage, bill.title, bill.due_date
                ),
                NOTIFY_BILL_CREATED,
            )
            .await;
        }
        self.publish(LedgerEvent::BillCreated {
            group_id: bill.group_id.clone(),
            bill: bill.clone(),
        })
        .await;
    }

    pub async fn list_bills(
        &self,
        actor_id: &str,
        environment_id: &str,
        window: Option<MonthWindow>,
        status: Option<BillStatus>,
    ) -> Result<Vec<Bill>, BillsplitError> {
        let environment = self
            .storage
            .get_environment(environment_id)
            .await?
            .filter(|e| !e.archived)
            .ok_or_else(|| BillsplitError::not_found("Environment", environment_id))?;
        let group = self.active_group(&environment.group_id).await?;
        self.require_active_member(&group.id, actor_id).await?;

        let filter = BillFilter {
            group_ids: Some(vec![group.id]),
            environment_id: Some(environment.id),
            window,
            status,
        };
        self.storage.find_bills(&filter).await
    }

    pub async fn get_bill(&self, actor_id: &str, bill_id: &str) -> Result<Bill, BillsplitError> {
        let bill = self.live_bill(bill_id).await?;
        self.require_active_member(&bill.group_id, actor_id).await?;
        Ok(bill)
    }

    /// Non-archived bill by id.
    async fn live_bill(&self, bill_id: &str) -> Result<Bill, BillsplitError> {
        self.storage
            .get_bill(bill_id)
            .await?
            .filter(|b| !b.archived)
            .ok_or_else(|| BillsplitError::not_found("Bill", bill_id))
    }

    /// Applies a partial update. A new share set replaces the old one
    /// wholesale; a new total without shares re-derives every amount from the
    /// stored percentages. Everything is validated first and then written in
    /// a single storage call.
    pub async fn update_bill(&self, actor_id: &str, bill_id: &str, patch: BillPatch) -> Result<Bill, BillsplitError> {
        let mut bill = self.live_bill(bill_id).await?;
        let read_at = bill.updated_at;

        let is_admin = self
            .storage
            .get_member(&bill.group_id, actor_id)
            .await?
            .is_some_and(|m| m.is_admin());
        if bill.owner_id != actor_id && !is_admin {
            return Err(BillsplitError::Forbidden(format!(
                "only the owner or a group admin can edit bill {}",
                bill.id
            )));
        }
        if bill.status != BillStatus::Open {
            return Err(BillsplitError::InvalidState(format!(
                "bill {} is {:?} and can no longer be edited",
                bill.id, bill.status
            )));
        }

        if let Some(title) = patch.title {
            self.validate_string_input("title", &title, MAX_TITLE_LENGTH)?;
            bill.title = title.trim().to_string();
        }
        if let Some(due_date) = patch.due_date {
            bill.due_date = due_date;
        }
        let total_changed = match patch.total_amount {
            Some(total) => {
                self.validate_amount_input("totalAmount", total)?;
                let changed = total != bill.total_amount;
                bill.total_amount = total;
                changed
            }
            None => false,
        };
        if let Some(installments) = patch.installments {
            if installments == 0 {
                return Err(BillsplitError::validation(
                    "installments",
                    "Invalid Installments",
                    "installments must be at least 1",
                ));
            }
            bill.installments = installments;
        }
        if let Some(pix_key) = patch.pix_key {
            bill.pix_key = normalize_text(Some(pix_key));
        }
        if let Some(payment_link) = patch.payment_link {
            bill.payment_link = normalize_text(Some(payment_link));
        }
        if let Some(attachment_url) = patch.attachment_url {
            bill.attachment_url = normalize_text(Some(attachment_url));
        }
        if let Some(category) = patch.category {
            bill.category = normalize_text(Some(category));
        }
        if let Some(owner_id) = normalize_text(patch.owner_id) {
            self.require_active_member(&bill.group_id, &owner_id).await?;
            bill.owner_id = owner_id;
        }
        if patch.receiver_id.is_some() || patch.receiver_name.is_some() {
            // a new name without an id re-resolves the linked user
            let (receiver_id, receiver_name) = self
                .resolve_receiver(patch.receiver_id, patch.receiver_name)
                .await?;
            bill.receiver_id = receiver_id;
            bill.receiver_name = receiver_name;
        }

        let now = Utc::now();
        match patch.shares {
            Some(shares) => {
                let allocations = allocator::allocate(bill.total_amount, &shares)?;
                self.validate_share_members(&bill.group_id, &shares).await?;
                bill.shares = build_shares(&bill.id, allocations, now);
            }
            None if total_changed => {
                for share in bill.shares.iter_mut() {
                    share.amount = share_amount(bill.total_amount, share.percentage);
                }
            }
            None => {}
        }
        bill.updated_at = now;

        // a payment committed since the read must not be overwritten
        if !self.storage.replace_bill(bill.clone(), read_at).await? {
            return Err(BillsplitError::InvalidState(format!(
                "bill {} changed while it was being edited",
                bill.id
            )));
        }
        info!(bill_id = %bill.id, actor_id, "bill updated");

        self.invalidate_summaries().await;
        self.record_activity(
            &bill.group_id,
            Some(actor_id),
            BILL_UPDATED,
            format!("Bill \"{}\" updated", bill.title),
        )
        .await;
        Ok(bill)
    }

    pub async fn archive_bill(&self, actor_id: &str, bill_id: &str) -> Result<(), BillsplitError> {
        let mut bill = self.live_bill(bill_id).await?;
        if bill.owner_id != actor_id {
            return Err(BillsplitError::Forbidden(format!(
                "only the owner can archive bill {}",
                bill.id
            )));
        }

        let read_at = bill.updated_at;
        bill.archived = true;
        bill.updated_at = Utc::now();
        if !self.storage.replace_bill(bill.clone(), read_at).await? {
            return Err(BillsplitError::InvalidState(format!(
                "bill {} changed while it was being archived",
                bill.id
            )));
        }
        info!(bill_id = %bill.id, actor_id, "bill archived");

        self.invalidate_summaries().await;
        self.record_activity(
            &bill.group_id,
            Some(actor_id),
            BILL_ARCHIVED,
            format!("Bill \"{}\" archived", bill.title),
        )
        .await;
        Ok(())
    }

    /// Payments of a bill in the order they were recorded. Archived bills keep
    /// their history.
    pub async fn list_payments(&self, actor_id: &str, bill_id: &str) -> Result<Vec<Payment>, BillsplitError> {
        let bill = self
            .storage
            .get_bill(bill_id)
            .await?
            .ok_or_else(|| BillsplitError::not_found("Bill", bill_id))?;
        self.require_active_member(&bill.group_id, actor_id).await?;
        let payments = self.storage.list_payments(&bill.id).await?;
        debug!(bill_id, count = payments.len(), "payments listed");
        Ok(payments)
    }
}

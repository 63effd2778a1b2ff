use super::{BillsplitService, build_shares, normalize_text};
use crate::constants::{MAX_TITLE_LENGTH, RECURRING_CREATED, RECURRING_GENERATED, RECURRING_TOGGLED};
use crate::core::allocator;
use crate::core::errors::BillsplitError;
use crate::core::models::{
    bill::{Bill, BillStatus},
    recurring::{GeneratedBills, NewRecurringBill, RecurringBill, RecurringCreated, RecurringShare},
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::storage::Storage;
use chrono::{Datelike, NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Concrete bill for one occurrence of a template, amounts derived from the
/// template's current total and stored percentages.
fn bill_from_template(template: &RecurringBill, due_date: NaiveDate) -> Result<Bill, BillsplitError> {
    let allocations = allocator::allocate(template.total_amount, &template.share_inputs())?;
    let now = Utc::now();
    let bill_id = Uuid::new_v4().to_string();
    Ok(Bill {
        id: bill_id.clone(),
        group_id: template.group_id.clone(),
        environment_id: template.environment_id.clone(),
        title: template.title.clone(),
        due_date,
        total_amount: template.total_amount,
        installments: 1,
        pix_key: template.pix_key.clone(),
        payment_link: template.payment_link.clone(),
        attachment_url: template.attachment_url.clone(),
        owner_id: template.owner_id.clone(),
        receiver_id: template.receiver_id.clone(),
        receiver_name: template.receiver_name.clone(),
        category: template.category.clone(),
        status: BillStatus::Open,
        archived: false,
        recurring_bill_id: Some(template.id.clone()),
        shares: build_shares(&bill_id, allocations, now),
        created_at: now,
        updated_at: now,
    })
}

impl<S: Storage, C: Cache, E: EventPublisher> BillsplitService<S, C, E> {
    /// Templates of archived groups or environments stop producing bills.
    async fn template_in_live_scope(&self, template: &RecurringBill) -> Result<bool, BillsplitError> {
        let group_live = self
            .storage
            .get_group(&template.group_id)
            .await?
            .is_some_and(|g| !g.archived);
        let environment_live = self
            .storage
            .get_environment(&template.environment_id)
            .await?
            .is_some_and(|e| !e.archived);
        Ok(group_live && environment_live)
    }

    pub async fn create_recurring(
        &self,
        actor_id: &str,
        environment_id: &str,
        new_template: NewRecurringBill,
    ) -> Result<RecurringCreated, BillsplitError> {
        self.validate_string_input("title", &new_template.title, MAX_TITLE_LENGTH)?;
        self.validate_amount_input("totalAmount", new_template.total_amount)?;

        let group = self.active_group(&new_template.group_id).await?;
        self.environment_in_group(environment_id, &group.id).await?;
        self.require_active_member(&group.id, actor_id).await?;

        let owner_id = normalize_text(new_template.owner_id).unwrap_or_else(|| actor_id.to_string());
        if owner_id != actor_id {
            self.require_active_member(&group.id, &owner_id).await?;
        }
        let (receiver_id, receiver_name) = self
            .resolve_receiver(new_template.receiver_id, new_template.receiver_name)
            .await?;

        allocator::validate_percentages(&new_template.shares)?;
        self.validate_share_members(&group.id, &new_template.shares).await?;

        let first_due = new_template.due_date;
        let next_due_date = new_template.frequency.advance(first_due).ok_or_else(|| {
            BillsplitError::validation("dueDate", "Invalid Due Date", "due date is out of range")
        })?;

        let now = Utc::now();
        let template = RecurringBill {
            id: Uuid::new_v4().to_string(),
            group_id: group.id.clone(),
            environment_id: environment_id.to_string(),
            title: new_template.title.trim().to_string(),
            total_amount: new_template.total_amount,
            frequency: new_template.frequency,
            day_of_month: first_due.day(),
            next_due_date,
            pix_key: normalize_text(new_template.pix_key),
            payment_link: normalize_text(new_template.payment_link),
            attachment_url: normalize_text(new_template.attachment_url),
            owner_id,
            receiver_id,
            receiver_name,
            category: normalize_text(new_template.category),
            shares: new_template
                .shares
                .iter()
                .map(|s| RecurringShare {
                    user_id: s.user_id.clone(),
                    percentage: s.percentage,
                })
                .collect(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        let first_bill = if new_template.create_first_bill {
            Some(bill_from_template(&template, first_due)?)
        } else {
            None
        };

        self.storage.save_recurring(template.clone(), first_bill.clone()).await?;
        info!(
            recurring_id = %template.id,
            frequency = ?template.frequency,
            next_due_date = %template.next_due_date,
            "recurring bill created"
        );

        self.record_activity(
            &template.group_id,
            Some(actor_id),
            RECURRING_CREATED,
            format!("Recurring bill \"{}\" created", template.title),
        )
        .await;
        if let Some(bill) = &first_bill {
            self.announce_bill(
                bill,
                Some(actor_id),
                RECURRING_GENERATED,
                format!("Bill \"{}\" generated for {}", bill.title, bill.due_date),
            )
            .await;
        }

        Ok(RecurringCreated {
            recurring: template,
            first_bill,
        })
    }

    /// Templates of an environment, newest first.
    pub async fn list_recurring(&self, actor_id: &str, environment_id: &str) -> Result<Vec<RecurringBill>, BillsplitError> {
        let environment = self
            .storage
            .get_environment(environment_id)
            .await?
            .filter(|e| !e.archived)
            .ok_or_else(|| BillsplitError::not_found("Environment", environment_id))?;
        self.require_active_member(&environment.group_id, actor_id).await?;
        self.storage.list_recurring(&environment.id).await
    }

    /// Switches a template in or out of future generation passes. Bills it
    /// already produced are not touched.
    pub async fn toggle_recurring(
        &self,
        actor_id: &str,
        template_id: &str,
        active: bool,
    ) -> Result<RecurringBill, BillsplitError> {
        let template = self
            .storage
            .get_recurring(template_id)
            .await?
            .ok_or_else(|| BillsplitError::not_found("RecurringBill", template_id))?;
        self.require_active_member(&template.group_id, actor_id).await?;

        let template = self
            .storage
            .set_recurring_active(template_id, active)
            .await?
            .ok_or_else(|| BillsplitError::not_found("RecurringBill", template_id))?;
        info!(recurring_id = %template.id, active, "recurring bill toggled");

        self.record_activity(
            &template.group_id,
            Some(actor_id),
            RECURRING_TOGGLED,
            format!(
                "Recurring bill \"{}\" {}",
                template.title,
                if active { "activated" } else { "paused" }
            ),
        )
        .await;
        Ok(template)
    }

    /// Materializes one bill for every active template due on or before
    /// `as_of` (today in UTC when absent) and moves each template forward by
    /// exactly one period. Missed periods are not caught up within a pass.
    ///
    /// The bill and the advanced due date are written together through a
    /// compare-and-set on the template, so overlapping passes never produce
    /// two bills for the same occurrence.
    pub async fn generate_due(
        &self,
        group_id: Option<&str>,
        environment_id: Option<&str>,
        as_of: Option<NaiveDate>,
    ) -> Result<GeneratedBills, BillsplitError> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let due = self
            .storage
            .find_due_recurring(group_id, environment_id, as_of)
            .await?;
        debug!(%as_of, candidates = due.len(), "generating due recurring bills");

        let mut bills = Vec::new();
        for template in due {
            if !self.template_in_live_scope(&template).await? {
                debug!(recurring_id = %template.id, "group or environment archived, skipping");
                continue;
            }
            let Some(next_due) = template.frequency.advance(template.next_due_date) else {
                warn!(recurring_id = %template.id, "next due date out of range, skipping");
                continue;
            };
            let bill = bill_from_template(&template, template.next_due_date)?;
            let claimed = self
                .storage
                .materialize_recurring(&template.id, template.next_due_date, next_due, bill.clone())
                .await?;
            if !claimed {
                debug!(recurring_id = %template.id, "already materialized by another pass");
                continue;
            }
            info!(
                recurring_id = %template.id,
                bill_id = %bill.id,
                due_date = %bill.due_date,
                next_due_date = %next_due,
                "recurring bill materialized"
            );
            self.announce_bill(
                &bill,
                None,
                RECURRING_GENERATED,
                format!("Bill \"{}\" generated for {}", bill.title, bill.due_date),
            )
            .await;
            bills.push(bill);
        }

        Ok(GeneratedBills {
            count: bills.len(),
            bills,
        })
    }
}

use super::{BillsplitService, normalize_text};
use crate::constants::{NOTIFY_PAYMENT_RECEIVED, PAYMENT_REGISTERED};
use crate::core::errors::BillsplitError;
use crate::core::models::{
    bill::{BillStatus, ShareStatus},
    payment::{NewPayment, Payment, PaymentStatus},
};
use crate::infrastructure::cache::Cache;
use crate::infrastructure::events::{EventPublisher, LedgerEvent};
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

/// Payments re-read the bill when a concurrent write beat them to it.
const MAX_WRITE_ATTEMPTS: u32 = 3;

impl<S: Storage, C: Cache, E: EventPublisher> BillsplitService<S, C, E> {
    /// Records a completed payment towards the bill's receiver.
    ///
    /// Each payment is compared on its own against the payer's full share
    /// amount: covering it marks the share PAID, anything less leaves the
    /// share untouched. The bill then moves to PAID once no share is pending,
    /// otherwise to PARTIALLY_PAID, and never moves back.
    ///
    /// The actor must be an active member unless they are settling their own
    /// share; a payer named on someone else's behalf must hold a share or be
    /// an active member.
    pub async fn record_payment(
        &self,
        actor_id: &str,
        bill_id: &str,
        new_payment: NewPayment,
    ) -> Result<Payment, BillsplitError> {
        self.validate_amount_input("amount", new_payment.amount)?;
        let requested_payer = normalize_text(new_payment.from_user_id);
        let method = normalize_text(new_payment.method);

        let mut attempt = 0;
        let (payment, bill, receiver_id, from_user_id) = loop {
            attempt += 1;
            let mut bill = self
                .storage
                .get_bill(bill_id)
                .await?
                .filter(|b| !b.archived)
                .ok_or_else(|| BillsplitError::not_found("Bill", bill_id))?;
            let read_at = bill.updated_at;
            let receiver_id = bill.receiver_id.clone().ok_or_else(|| {
                BillsplitError::InvalidState(format!("bill {} has no registered receiver", bill.id))
            })?;

            // share holders who have since left the group can still settle
            let from_user_id = requested_payer.clone().unwrap_or_else(|| actor_id.to_string());
            let holds_share = bill.share_for(&from_user_id).is_some();
            if from_user_id != actor_id || !holds_share {
                self.require_active_member(&bill.group_id, actor_id).await?;
            }
            if from_user_id != actor_id && !holds_share {
                self.require_active_member(&bill.group_id, &from_user_id).await?;
            }

            let now = Utc::now();
            let payment = Payment {
                id: Uuid::new_v4().to_string(),
                bill_id: bill.id.clone(),
                from_user_id: from_user_id.clone(),
                to_user_id: receiver_id.clone(),
                amount: new_payment.amount,
                method: method.clone(),
                status: PaymentStatus::Completed,
                paid_at: now,
            };

            if let Some(share) = bill
                .shares
                .iter_mut()
                .find(|s| s.user_id == from_user_id && s.is_pending())
            {
                if payment.amount >= share.amount {
                    share.status = ShareStatus::Paid;
                }
            }
            let derived = if bill.pending_shares() == 0 {
                BillStatus::Paid
            } else {
                BillStatus::PartiallyPaid
            };
            bill.status = bill.status.advance_to(derived);
            bill.updated_at = now;

            if self
                .storage
                .record_payment(payment.clone(), bill.clone(), read_at)
                .await?
            {
                break (payment, bill, receiver_id, from_user_id);
            }
            if attempt >= MAX_WRITE_ATTEMPTS {
                return Err(BillsplitError::InvalidState(format!(
                    "bill {} kept changing while the payment was recorded",
                    bill.id
                )));
            }
            debug!(bill_id, attempt, "bill changed concurrently, retrying payment");
        };

        info!(
            payment_id = %payment.id,
            bill_id = %bill.id,
            amount = %payment.amount,
            status = ?bill.status,
            "payment recorded"
        );

        self.invalidate_summaries().await;
        self.record_activity(
            &bill.group_id,
            Some(actor_id),
            PAYMENT_REGISTERED,
            format!("Payment of {} registered on \"{}\"", payment.amount, bill.title),
        )
        .await;
        if receiver_id != from_user_id {
            self.notify(
                &receiver_id,
                "Payment received",
                format!("You received {} for \"{}\"", payment.amount, bill.title),
                NOTIFY_PAYMENT_RECEIVED,
            )
            .await;
        }
        self.publish(LedgerEvent::PaymentCreated {
            group_id: bill.group_id.clone(),
            payment: payment.clone(),
        })
        .await;

        Ok(payment)
    }
}

use super::BillsplitService;
use crate::constants::HISTORY_LIMIT;
use crate::core::balances;
use crate::core::errors::BillsplitError;
use crate::core::models::{
    activity::Activity,
    bill::Bill,
    summary::{BalanceSummary, CategoryTotal, DashboardQuery, DebtLine, GroupSummary, MemberSummary, PayerRef},
    window::MonthWindow,
};
use crate::infrastructure::cache::{Cache, cache_keys};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::storage::{BillFilter, Storage};
use futures::future::try_join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

impl<S: Storage, C: Cache, E: EventPublisher> BillsplitService<S, C, E> {
    /// Bills the querying user may see for a dashboard read. Scope is bounded
    /// by the user's active memberships in non-archived groups; an empty scope
    /// yields no bills rather than an error.
    async fn dashboard_bills(&self, actor_id: &str, query: &DashboardQuery) -> Result<Vec<Bill>, BillsplitError> {
        let allowed = self.member_group_ids(actor_id).await?;
        if allowed.is_empty() {
            return Ok(Vec::new());
        }

        let group_ids = match &query.group_id {
            Some(group_id) if allowed.contains(group_id) => vec![group_id.clone()],
            Some(group_id) => {
                return Err(BillsplitError::Forbidden(format!(
                    "user {} has no access to group {}",
                    actor_id, group_id
                )));
            }
            None => allowed,
        };
        if let Some(environment_id) = &query.environment_id {
            let environment = self
                .storage
                .get_environment(environment_id)
                .await?
                .ok_or_else(|| BillsplitError::not_found("Environment", environment_id))?;
            if !group_ids.contains(&environment.group_id) {
                return Err(BillsplitError::Forbidden(format!(
                    "user {} has no access to environment {}",
                    actor_id, environment_id
                )));
            }
        }

        let filter = BillFilter {
            group_ids: Some(group_ids),
            environment_id: query.environment_id.clone(),
            window: query.window,
            status: None,
        };
        self.storage.find_bills(&filter).await
    }

    pub async fn dashboard_summary(&self, actor_id: &str, query: DashboardQuery) -> Result<BalanceSummary, BillsplitError> {
        let person_id = query.person_id.clone().unwrap_or_else(|| actor_id.to_string());
        let key = cache_keys::summary_key(
            actor_id,
            &person_id,
            query.window.as_ref(),
            query.group_id.as_deref(),
            query.environment_id.as_deref(),
        );
        match self.cache.get_summary(&key).await {
            Ok(Some(summary)) => {
                debug!(%key, "summary cache hit");
                return Ok(summary);
            }
            Ok(None) => {}
            Err(e) => warn!(%key, error = %e, "summary cache read failed"),
        }

        let bills = self.dashboard_bills(actor_id, &query).await?;
        let summary = balances::summarize(&bills, &person_id);
        if let Err(e) = self.cache.save_summary(&key, &summary, self.summary_ttl).await {
            warn!(%key, error = %e, "summary cache write failed");
        }
        Ok(summary)
    }

    pub async fn category_breakdown(&self, actor_id: &str, query: DashboardQuery) -> Result<Vec<CategoryTotal>, BillsplitError> {
        let person_id = query.person_id.clone().unwrap_or_else(|| actor_id.to_string());
        let bills = self.dashboard_bills(actor_id, &query).await?;
        Ok(balances::category_breakdown(&bills, &person_id))
    }

    /// The person's pending shares with display data for each bill, oldest
    /// due date first. `query.category` narrows to one category; the
    /// uncategorized bucket matches bills without a category.
    pub async fn dashboard_debts(&self, actor_id: &str, query: DashboardQuery) -> Result<Vec<DebtLine>, BillsplitError> {
        let person_id = query.person_id.clone().unwrap_or_else(|| actor_id.to_string());
        let bills = self.dashboard_bills(actor_id, &query).await?;
        let wanted = query
            .category
            .as_deref()
            .map(|c| balances::category_label(Some(c)));

        let pending: Vec<_> = balances::pending_shares_of(&bills, &person_id)
            .into_iter()
            .filter(|(bill, _)| {
                wanted
                    .as_ref()
                    .is_none_or(|w| *w == balances::category_label(bill.category.as_deref()))
            })
            .collect();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        let mut user_ids = BTreeSet::new();
        let mut group_ids = BTreeSet::new();
        let mut environment_ids = BTreeSet::new();
        user_ids.insert(person_id.clone());
        for (bill, _) in &pending {
            user_ids.insert(bill.owner_id.clone());
            if let Some(receiver_id) = &bill.receiver_id {
                user_ids.insert(receiver_id.clone());
            }
            group_ids.insert(bill.group_id.clone());
            environment_ids.insert(bill.environment_id.clone());
        }

        let user_names: HashMap<String, String> = try_join_all(user_ids.iter().map(|id| self.storage.get_user(id)))
            .await?
            .into_iter()
            .flatten()
            .map(|u| (u.id, u.name))
            .collect();
        let group_names: HashMap<String, String> = try_join_all(group_ids.iter().map(|id| self.storage.get_group(id)))
            .await?
            .into_iter()
            .flatten()
            .map(|g| (g.id, g.name))
            .collect();
        let environment_names: HashMap<String, String> =
            try_join_all(environment_ids.iter().map(|id| self.storage.get_environment(id)))
                .await?
                .into_iter()
                .flatten()
                .map(|e| (e.id, e.name))
                .collect();

        Ok(pending
            .into_iter()
            .map(|(bill, share)| DebtLine {
                share_id: share.id.clone(),
                bill_id: bill.id.clone(),
                group_id: bill.group_id.clone(),
                group_name: group_names.get(&bill.group_id).cloned(),
                environment_id: bill.environment_id.clone(),
                environment_name: environment_names.get(&bill.environment_id).cloned(),
                title: bill.title.clone(),
                category: bill.category.clone(),
                due_date: bill.due_date,
                total_amount: bill.total_amount,
                share_amount: share.amount,
                share_percentage: share.percentage,
                payer: PayerRef {
                    user_id: share.user_id.clone(),
                    name: user_names.get(&share.user_id).cloned(),
                },
                receiver_user_id: bill.receiver_id.clone(),
                receiver_user_name: bill.receiver_id.as_ref().and_then(|id| user_names.get(id).cloned()),
                receiver_name: bill.receiver_name.clone(),
                owner_user_id: bill.owner_id.clone(),
                owner_user_name: user_names.get(&bill.owner_id).cloned(),
                created_at: bill.created_at,
            })
            .collect())
    }

    /// Most recent activity of the user's groups, newest first.
    pub async fn history(&self, actor_id: &str, window: Option<MonthWindow>) -> Result<Vec<Activity>, BillsplitError> {
        let group_ids = self.member_group_ids(actor_id).await?;
        match window {
            None => self.storage.list_activities(&group_ids, actor_id, HISTORY_LIMIT).await,
            Some(window) => Ok(self
                .storage
                .list_activities(&group_ids, actor_id, usize::MAX)
                .await?
                .into_iter()
                .filter(|a| window.contains(a.created_at.date_naive()))
                .take(HISTORY_LIMIT)
                .collect()),
        }
    }

    /// Balance figures for every active member of a group. With an
    /// environment the population is that environment's bills only;
    /// without one it is every bill of the group.
    pub async fn group_member_summary(
        &self,
        actor_id: &str,
        group_id: &str,
        environment_id: Option<&str>,
        window: Option<MonthWindow>,
    ) -> Result<GroupSummary, BillsplitError> {
        let group = self.active_group(group_id).await?;
        self.require_active_member(&group.id, actor_id).await?;

        let filter = match environment_id {
            Some(environment_id) => {
                let environment = self.environment_in_group(environment_id, &group.id).await?;
                BillFilter {
                    environment_id: Some(environment.id),
                    window,
                    ..BillFilter::default()
                }
            }
            None => BillFilter {
                group_ids: Some(vec![group.id.clone()]),
                window,
                ..BillFilter::default()
            },
        };
        let bills = self.storage.find_bills(&filter).await?;

        let members: Vec<_> = self
            .storage
            .list_members(&group.id)
            .await?
            .into_iter()
            .filter(|m| m.active)
            .collect();
        let users = try_join_all(members.iter().map(|m| self.storage.get_user(&m.user_id))).await?;

        let members = members
            .into_iter()
            .zip(users)
            .map(|(member, user)| {
                let summary = balances::summarize(&bills, &member.user_id);
                MemberSummary {
                    categories: balances::category_breakdown(&bills, &member.user_id),
                    user_id: member.user_id,
                    user,
                    total_to_pay: summary.total_to_pay,
                    total_to_receive: summary.total_to_receive,
                    net_balance: summary.net_balance,
                }
            })
            .collect();
        Ok(GroupSummary { members })
    }
}

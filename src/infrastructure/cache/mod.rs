pub mod cache_keys;
pub mod in_memory;

use crate::core::errors::BillsplitError;
use crate::core::models::summary::BalanceSummary;
use async_trait::async_trait;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_summary(&self, key: &str) -> Result<Option<BalanceSummary>, BillsplitError>;
    async fn save_summary(
        &self,
        key: &str,
        summary: &BalanceSummary,
        ttl: std::time::Duration,
    ) -> Result<(), BillsplitError>;
    /// Drops every cached summary. Called after each ledger mutation.
    async fn invalidate_summaries(&self) -> Result<(), BillsplitError>;
}

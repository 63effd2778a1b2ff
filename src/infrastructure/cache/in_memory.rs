use crate::core::errors::BillsplitError;
use crate::core::models::summary::BalanceSummary;
use crate::infrastructure::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryCache {
    cache: Arc<RwLock<HashMap<String, (BalanceSummary, chrono::DateTime<chrono::Utc>)>>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_summary(&self, key: &str) -> Result<Option<BalanceSummary>, BillsplitError> {
        let cache = self.cache.read().await;
        let now = chrono::Utc::now();
        Ok(cache
            .get(key)
            .filter(|(_, expiry)| *expiry > now)
            .map(|(summary, _)| summary.clone()))
    }

    async fn save_summary(
        &self,
        key: &str,
        summary: &BalanceSummary,
        ttl: std::time::Duration,
    ) -> Result<(), BillsplitError> {
        let mut cache = self.cache.write().await;
        cache.insert(
            key.to_string(),
            (
                summary.clone(),
                chrono::Utc::now()
                    + chrono::Duration::from_std(ttl)
                        .map_err(|e| BillsplitError::CacheError(format!("Failed to convert TTL: {}", e)))?,
            ),
        );
        Ok(())
    }

    async fn invalidate_summaries(&self) -> Result<(), BillsplitError> {
        let mut cache = self.cache.write().await;
        cache.clear();
        Ok(())
    }
}

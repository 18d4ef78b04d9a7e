use async_trait::async_trait;

use crate::domain::models::{DispatchRecord, PendingDispatch, SmsStats};

#[async_trait]
pub trait SmsHistoryRepository: Send + Sync {
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<()>;

    /// Newest first. The flag reports whether more records follow the page.
    async fn list(&self, limit: u32, offset: u32) -> anyhow::Result<(Vec<DispatchRecord>, bool)>;

    /// Every field except `pending_scheduled`.
    async fn stats(&self) -> anyhow::Result<SmsStats>;
}

#[async_trait]
pub trait ScheduledDispatchRepository: Send + Sync {
    async fn insert(&self, pending: &PendingDispatch) -> anyhow::Result<()>;
    async fn count_pending(&self) -> anyhow::Result<u64>;
}

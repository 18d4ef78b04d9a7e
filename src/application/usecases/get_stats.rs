use std::sync::Arc;

use crate::domain::{
    models::SmsStats,
    repositories::{ScheduledDispatchRepository, SmsHistoryRepository},
};

pub struct GetStatsUseCase {
    history_repo: Arc<dyn SmsHistoryRepository>,
    scheduled_repo: Arc<dyn ScheduledDispatchRepository>,
}

impl GetStatsUseCase {
    pub fn new(
        history_repo: Arc<dyn SmsHistoryRepository>,
        scheduled_repo: Arc<dyn ScheduledDispatchRepository>,
    ) -> Self {
        Self {
            history_repo,
            scheduled_repo,
        }
    }

    pub async fn execute(&self) -> anyhow::Result<SmsStats> {
        let mut stats = self.history_repo.stats().await?;
        stats.pending_scheduled = self.scheduled_repo.count_pending().await?;
        Ok(stats)
    }
}

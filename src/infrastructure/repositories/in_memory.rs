use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    models::{DispatchRecord, PendingDispatch, SmsStats},
    repositories::{ScheduledDispatchRepository, SmsHistoryRepository},
};

#[derive(Default)]
pub struct InMemorySmsHistoryRepository {
    records: Arc<RwLock<Vec<DispatchRecord>>>,
}

impl InMemorySmsHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SmsHistoryRepository for InMemorySmsHistoryRepository {
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<()> {
        let mut records = self.records.write().await;
        records.push(record.clone());
        Ok(())
    }

    async fn list(&self, limit: u32, offset: u32) -> anyhow::Result<(Vec<DispatchRecord>, bool)> {
        let records = self.records.read().await;
        let mut newest_first: Vec<&DispatchRecord> = records.iter().rev().collect();
        newest_first.sort_by(|a, b| b.result.timestamp.cmp(&a.result.timestamp));

        let page: Vec<DispatchRecord> = newest_first
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|r| (*r).clone())
            .collect();
        let has_more = newest_first.len() > offset as usize + page.len();

        Ok((page, has_more))
    }

    async fn stats(&self) -> anyhow::Result<SmsStats> {
        let records = self.records.read().await;
        let mut stats = SmsStats {
            total_batches: records.len() as u64,
            ..Default::default()
        };
        for record in records.iter() {
            stats.total_messages += record.result.total_recipients as u64;
            stats.successful += record.result.successful as u64;
            stats.failed += record.result.failed as u64;
            stats.invalid_recipients += record.result.invalid_recipients.len() as u64;
        }
        stats.success_rate = SmsStats::success_rate(stats.successful, stats.total_messages);

        Ok(stats)
    }
}

#[derive(Default)]
pub struct InMemoryScheduledDispatchRepository {
    pending: Arc<RwLock<Vec<PendingDispatch>>>,
}

impl InMemoryScheduledDispatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn all(&self) -> Vec<PendingDispatch> {
        self.pending.read().await.clone()
    }
}

#[async_trait]
impl ScheduledDispatchRepository for InMemoryScheduledDispatchRepository {
    async fn insert(&self, pending: &PendingDispatch) -> anyhow::Result<()> {
        let mut jobs = self.pending.write().await;
        jobs.push(pending.clone());
        Ok(())
    }

    async fn count_pending(&self) -> anyhow::Result<u64> {
        let now = Utc::now();
        let jobs = self.pending.read().await;
        Ok(jobs.iter().filter(|job| job.scheduled_for > now).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{
        models::{BatchResult, DeliveryOutcome, DispatchKind, DispatchRequest, ValidRecipient},
        value_objects::{PhoneNumber, Recipient},
    };

    fn record(successes: usize, failures: usize) -> DispatchRecord {
        let outcome = |success: bool| {
            let valid = ValidRecipient {
                recipient: Recipient::with_phone("0712345678"),
                phone: PhoneNumber::normalize("0712345678").unwrap(),
            };
            if success {
                DeliveryOutcome::delivered(valid, None)
            } else {
                DeliveryOutcome::failed(valid, "nope".to_string())
            }
        };
        let outcomes = (0..successes)
            .map(|_| outcome(true))
            .chain((0..failures).map(|_| outcome(false)))
            .collect();

        DispatchRecord {
            kind: DispatchKind::Bulk,
            message: "hello".to_string(),
            result: BatchResult::new(outcomes, vec![Recipient::with_phone("bad")]),
        }
    }

    #[tokio::test]
    async fn lists_newest_first_with_paging() {
        let repo = InMemorySmsHistoryRepository::new();
        let mut ids = vec![];
        for i in 0..3 {
            let mut r = record(1, 0);
            r.result.timestamp += Duration::seconds(i);
            ids.push(r.result.batch_id.clone());
            repo.insert(&r).await.unwrap();
        }

        let (page, has_more) = repo.list(2, 0).await.unwrap();
        assert!(has_more);
        assert_eq!(page[0].result.batch_id, ids[2]);
        assert_eq!(page[1].result.batch_id, ids[1]);

        let (page, has_more) = repo.list(2, 2).await.unwrap();
        assert!(!has_more);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].result.batch_id, ids[0]);
    }

    #[tokio::test]
    async fn aggregates_stats_across_records() {
        let repo = InMemorySmsHistoryRepository::new();
        repo.insert(&record(3, 1)).await.unwrap();
        repo.insert(&record(1, 0)).await.unwrap();

        let stats = repo.stats().await.unwrap();

        assert_eq!(stats.total_batches, 2);
        assert_eq!(stats.total_messages, 5);
        assert_eq!(stats.successful, 4);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.invalid_recipients, 2);
        assert_eq!(stats.success_rate, 80.0);
    }

    #[tokio::test]
    async fn counts_only_future_jobs_as_pending() {
        let repo = InMemoryScheduledDispatchRepository::new();
        let job = |offset: Duration| PendingDispatch {
            id: uuid::Uuid::new_v4(),
            request: DispatchRequest {
                message: "later".to_string(),
                recipients: vec![Recipient::with_phone("0712345678")],
                template_variables: Default::default(),
            },
            scheduled_for: Utc::now() + offset,
            created_at: Utc::now(),
        };
        repo.insert(&job(Duration::hours(1))).await.unwrap();
        repo.insert(&job(Duration::hours(-1))).await.unwrap();

        assert_eq!(repo.count_pending().await.unwrap(), 1);
        assert_eq!(repo.all().await.len(), 2);
    }
}

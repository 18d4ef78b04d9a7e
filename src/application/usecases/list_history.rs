use std::sync::Arc;

use crate::domain::{models::DispatchRecord, repositories::SmsHistoryRepository};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct ListHistoryUseCase {
    repo: Arc<dyn SmsHistoryRepository>,
}

pub struct HistoryPage {
    pub records: Vec<DispatchRecord>,
    pub has_more: bool,
    pub next_offset: Option<u32>,
}

impl ListHistoryUseCase {
    pub fn new(repo: Arc<dyn SmsHistoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, limit: Option<u32>, offset: Option<u32>) -> anyhow::Result<HistoryPage> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0);

        let (records, has_more) = self.repo.list(limit, offset).await?;
        let next_offset = has_more.then(|| offset + records.len() as u32);

        Ok(HistoryPage {
            records,
            has_more,
            next_offset,
        })
    }
}

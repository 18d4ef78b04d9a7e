use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::info;
use uuid::Uuid;

use crate::{
    application::handlers::bulk_dispatcher::BulkDispatcher,
    domain::{
        errors::{DispatchError, DomainError},
        models::{DispatchRequest, PendingDispatch, ScheduledDispatch},
        repositories::ScheduledDispatchRepository,
    },
};

pub struct ScheduleDispatchUseCase {
    dispatcher: Arc<BulkDispatcher>,
    repo: Arc<dyn ScheduledDispatchRepository>,
}

impl ScheduleDispatchUseCase {
    pub fn new(dispatcher: Arc<BulkDispatcher>, repo: Arc<dyn ScheduledDispatchRepository>) -> Self {
        Self { dispatcher, repo }
    }

    pub async fn execute(
        &self,
        request: DispatchRequest,
        scheduled_for: DateTime<Utc>,
    ) -> Result<ScheduledDispatch, DomainError> {
        self.dispatcher.prepare(&request)?;

        let now = Utc::now();
        if scheduled_for <= now {
            return Err(DispatchError::ScheduleInPast.into());
        }

        let pending = PendingDispatch {
            id: Uuid::new_v4(),
            scheduled_for,
            created_at: now,
            request,
        };
        self.repo.insert(&pending).await?;

        info!(
            scheduled_id = %pending.id,
            scheduled_for = %pending.scheduled_for,
            recipients = pending.request.recipients.len(),
            "dispatch scheduled"
        );

        Ok(ScheduledDispatch {
            scheduled_id: pending.id,
            scheduled_for: pending.scheduled_for,
            recipients_count: pending.request.recipients.len(),
        })
    }
}

/// Reads `YYYY-MM-DD` plus an optional `HH:MM` (or `HH:MM:SS`) in the
/// given offset. `None` when neither part is present.
pub fn parse_schedule(
    date: Option<&str>,
    time: Option<&str>,
    offset: FixedOffset,
) -> Result<Option<DateTime<Utc>>, DispatchError> {
    let date = date.map(str::trim).filter(|d| !d.is_empty());
    let time = time.map(str::trim).filter(|t| !t.is_empty());

    let date = match (date, time) {
        (None, None) => return Ok(None),
        (None, Some(_)) => {
            return Err(DispatchError::InvalidSchedule(
                "scheduleTime requires scheduleDate".to_string(),
            ));
        }
        (Some(date), _) => NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            DispatchError::InvalidSchedule(format!("'{date}' is not a YYYY-MM-DD date"))
        })?,
    };

    let time = match time {
        None => NaiveTime::MIN,
        Some(time) => NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| {
                DispatchError::InvalidSchedule(format!("'{time}' is not an HH:MM time"))
            })?,
    };

    let local = offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| DispatchError::InvalidSchedule("ambiguous local time".to_string()))?;

    Ok(Some(local.with_timezone(&Utc)))
}

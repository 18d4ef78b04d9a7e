use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres, postgres::PgPoolOptions, types::Json};

use crate::domain::{
    models::{
        BatchResult, DeliveryOutcome, DispatchKind, DispatchRecord, PendingDispatch, SmsStats,
    },
    repositories::{ScheduledDispatchRepository, SmsHistoryRepository},
    value_objects::Recipient,
};

pub type PgPool = Pool<Postgres>;

pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("failed to connect to postgres")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(pool)
}

#[derive(Clone)]
pub struct PostgresSmsHistoryRepository {
    pool: PgPool,
}

impl PostgresSmsHistoryRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl SmsHistoryRepository for PostgresSmsHistoryRepository {
    async fn insert(&self, record: &DispatchRecord) -> anyhow::Result<()> {
        let result = &record.result;
        sqlx::query(
            r#"
            INSERT INTO sms_dispatches (
                batch_id,
                kind,
                message,
                total_recipients,
                successful,
                failed,
                outcomes,
                invalid_recipients,
                created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
            "#,
        )
        .bind(&result.batch_id)
        .bind(record.kind.as_str())
        .bind(&record.message)
        .bind(result.total_recipients as i32)
        .bind(result.successful as i32)
        .bind(result.failed as i32)
        .bind(Json(&result.outcomes))
        .bind(Json(&result.invalid_recipients))
        .bind(result.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, limit: u32, offset: u32) -> anyhow::Result<(Vec<DispatchRecord>, bool)> {
        // one extra row tells whether another page exists
        let rows = sqlx::query_as::<_, DispatchRow>(
            r#"
            SELECT batch_id, kind, message, total_recipients, successful, failed,
                   outcomes, invalid_recipients, created_at
            FROM sms_dispatches
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(limit) + 1)
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;

        let has_more = rows.len() > limit as usize;
        let records = rows
            .into_iter()
            .take(limit as usize)
            .map(DispatchRecord::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok((records, has_more))
    }

    async fn stats(&self) -> anyhow::Result<SmsStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT COUNT(*)::BIGINT AS total_batches,
                   COALESCE(SUM(total_recipients), 0)::BIGINT AS total_messages,
                   COALESCE(SUM(successful), 0)::BIGINT AS successful,
                   COALESCE(SUM(failed), 0)::BIGINT AS failed,
                   COALESCE(SUM(jsonb_array_length(invalid_recipients)), 0)::BIGINT AS invalid_recipients
            FROM sms_dispatches
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let successful = row.successful as u64;
        let total_messages = row.total_messages as u64;
        Ok(SmsStats {
            total_batches: row.total_batches as u64,
            total_messages,
            successful,
            failed: row.failed as u64,
            invalid_recipients: row.invalid_recipients as u64,
            success_rate: SmsStats::success_rate(successful, total_messages),
            pending_scheduled: 0,
        })
    }
}

#[derive(Clone)]
pub struct PostgresScheduledDispatchRepository {
    pool: PgPool,
}

impl PostgresScheduledDispatchRepository {
    pub fn new(pool: PgPool) -> Arc<Self> {
        Arc::new(Self { pool })
    }
}

#[async_trait]
impl ScheduledDispatchRepository for PostgresScheduledDispatchRepository {
    async fn insert(&self, pending: &PendingDispatch) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sms_scheduled_dispatches (
                id,
                message,
                recipients,
                template_variables,
                recipients_count,
                scheduled_for,
                created_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7)
            "#,
        )
        .bind(pending.id)
        .bind(&pending.request.message)
        .bind(Json(&pending.request.recipients))
        .bind(Json(&pending.request.template_variables))
        .bind(pending.request.recipients.len() as i32)
        .bind(pending.scheduled_for)
        .bind(pending.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_pending(&self) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"SELECT COUNT(*) FROM sms_scheduled_dispatches WHERE scheduled_for > NOW()"#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }
}

#[derive(FromRow)]
struct DispatchRow {
    batch_id: String,
    kind: String,
    message: String,
    total_recipients: i32,
    successful: i32,
    failed: i32,
    outcomes: Json<Vec<DeliveryOutcome>>,
    invalid_recipients: Json<Vec<Recipient>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DispatchRow> for DispatchRecord {
    type Error = anyhow::Error;

    fn try_from(value: DispatchRow) -> Result<Self, Self::Error> {
        let kind = DispatchKind::parse(&value.kind)
            .ok_or_else(|| anyhow::anyhow!("unknown dispatch kind {}", value.kind))?;
        Ok(Self {
            kind,
            message: value.message,
            result: BatchResult {
                batch_id: value.batch_id,
                total_recipients: value.total_recipients as usize,
                successful: value.successful as usize,
                failed: value.failed as usize,
                outcomes: value.outcomes.0,
                invalid_recipients: value.invalid_recipients.0,
                timestamp: value.created_at,
            },
        })
    }
}

#[derive(FromRow)]
struct StatsRow {
    total_batches: i64,
    total_messages: i64,
    successful: i64,
    failed: i64,
    invalid_recipients: i64,
}

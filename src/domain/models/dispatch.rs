use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{PhoneNumber, Recipient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub message: String,
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub template_variables: HashMap<String, String>,
}

/// A recipient whose phone number survived normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidRecipient {
    pub recipient: Recipient,
    pub phone: PhoneNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub recipient: Recipient,
    pub phone: PhoneNumber,
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn delivered(valid: ValidRecipient, message_id: Option<String>) -> Self {
        Self {
            recipient: valid.recipient,
            phone: valid.phone,
            success: true,
            message_id,
            error: None,
        }
    }

    pub fn failed(valid: ValidRecipient, error: String) -> Self {
        Self {
            recipient: valid.recipient,
            phone: valid.phone,
            success: false,
            message_id: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub total_recipients: usize,
    pub successful: usize,
    pub failed: usize,
    pub outcomes: Vec<DeliveryOutcome>,
    pub invalid_recipients: Vec<Recipient>,
    pub timestamp: DateTime<Utc>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<DeliveryOutcome>, invalid_recipients: Vec<Recipient>) -> Self {
        let successful = outcomes.iter().filter(|o| o.success).count();
        let timestamp = Utc::now();

        Self {
            batch_id: new_batch_id(timestamp),
            total_recipients: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            outcomes,
            invalid_recipients,
            timestamp,
        }
    }
}

fn new_batch_id(at: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("BATCH_{}_{}", at.timestamp_millis(), &suffix[..9])
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchKind {
    Single,
    Bulk,
}

impl DispatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchKind::Single => "single",
            DispatchKind::Bulk => "bulk",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "single" => Some(DispatchKind::Single),
            "bulk" => Some(DispatchKind::Bulk),
            _ => None,
        }
    }
}

/// A finished dispatch as kept in the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub kind: DispatchKind,
    pub message: String,
    pub result: BatchResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledDispatch {
    pub scheduled_id: Uuid,
    pub scheduled_for: DateTime<Utc>,
    pub recipients_count: usize,
}

/// A deferred dispatch handed to the scheduled-job store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDispatch {
    pub id: Uuid,
    pub request: DispatchRequest,
    pub scheduled_for: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SmsStats {
    pub total_batches: u64,
    pub total_messages: u64,
    pub successful: u64,
    pub failed: u64,
    pub invalid_recipients: u64,
    pub success_rate: f64,
    pub pending_scheduled: u64,
}

impl SmsStats {
    pub fn success_rate(successful: u64, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        (successful as f64 / total as f64 * 10_000.0).round() / 100.0
    }
}

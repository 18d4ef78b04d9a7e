use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::{
    application::handlers::bulk_dispatcher::BulkDispatcher,
    domain::{
        errors::DomainError,
        models::{DeliveryOutcome, DispatchKind, DispatchRecord, DispatchRequest},
        repositories::SmsHistoryRepository,
        value_objects::Recipient,
    },
};

/// A single send is a dispatch with one recipient, so it shares every
/// validation rule with bulk sends.
pub struct SendSmsUseCase {
    dispatcher: Arc<BulkDispatcher>,
    history_repo: Arc<dyn SmsHistoryRepository>,
}

pub struct SendSmsRequest {
    pub phone: String,
    pub message: String,
    pub variables: HashMap<String, String>,
}

#[derive(Debug)]
pub struct SendSmsResponse {
    pub batch_id: String,
    pub outcome: DeliveryOutcome,
}

impl SendSmsUseCase {
    pub fn new(
        dispatcher: Arc<BulkDispatcher>,
        history_repo: Arc<dyn SmsHistoryRepository>,
    ) -> Self {
        Self {
            dispatcher,
            history_repo,
        }
    }

    pub async fn execute(&self, request: SendSmsRequest) -> Result<SendSmsResponse, DomainError> {
        let dispatch = DispatchRequest {
            message: request.message,
            recipients: vec![Recipient::with_phone(request.phone)],
            template_variables: request.variables,
        };

        let prepared = self.dispatcher.prepare(&dispatch)?;
        let result = self.dispatcher.dispatch_prepared(&prepared).await;
        let outcome = result
            .outcomes
            .first()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("dispatch produced no outcome"))?;

        let record = DispatchRecord {
            kind: DispatchKind::Single,
            message: prepared.message,
            result,
        };
        if let Err(err) = self.history_repo.insert(&record).await {
            warn!(batch_id = %record.result.batch_id, error = %err, "failed to record dispatch history");
        }

        Ok(SendSmsResponse {
            batch_id: record.result.batch_id,
            outcome,
        })
    }
}

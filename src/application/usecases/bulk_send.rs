use std::collections::HashMap;
use std::sync::Arc;

use chrono::FixedOffset;
use tracing::warn;

use crate::{
    application::{
        handlers::bulk_dispatcher::BulkDispatcher,
        usecases::schedule_dispatch::{ScheduleDispatchUseCase, parse_schedule},
    },
    domain::{
        errors::{DispatchError, DomainError},
        models::{
            BatchResult, DispatchKind, DispatchRecord, DispatchRequest, ScheduledDispatch,
            find_template,
        },
        repositories::SmsHistoryRepository,
        value_objects::Recipient,
    },
};

pub struct BulkSendConfig {
    pub schedule_offset: FixedOffset,
}

pub struct BulkSendUseCase {
    dispatcher: Arc<BulkDispatcher>,
    history_repo: Arc<dyn SmsHistoryRepository>,
    schedule_usecase: Arc<ScheduleDispatchUseCase>,
    config: BulkSendConfig,
}

pub struct BulkSendRequest {
    pub recipients: Vec<Recipient>,
    pub message: Option<String>,
    pub template: Option<String>,
    pub variables: HashMap<String, String>,
    pub schedule_date: Option<String>,
    pub schedule_time: Option<String>,
}

#[derive(Debug)]
pub enum BulkSendResponse {
    Sent(BatchResult),
    Scheduled(ScheduledDispatch),
}

impl BulkSendUseCase {
    pub fn new(
        dispatcher: Arc<BulkDispatcher>,
        history_repo: Arc<dyn SmsHistoryRepository>,
        schedule_usecase: Arc<ScheduleDispatchUseCase>,
        config: BulkSendConfig,
    ) -> Self {
        Self {
            dispatcher,
            history_repo,
            schedule_usecase,
            config,
        }
    }

    pub async fn execute(&self, request: BulkSendRequest) -> Result<BulkSendResponse, DomainError> {
        let message = resolve_message(request.message, request.template.as_deref())?;
        let scheduled_for = parse_schedule(
            request.schedule_date.as_deref(),
            request.schedule_time.as_deref(),
            self.config.schedule_offset,
        )?;

        let dispatch = DispatchRequest {
            message,
            recipients: request.recipients,
            template_variables: request.variables,
        };

        if let Some(scheduled_for) = scheduled_for {
            let ack = self.schedule_usecase.execute(dispatch, scheduled_for).await?;
            return Ok(BulkSendResponse::Scheduled(ack));
        }

        let prepared = self.dispatcher.prepare(&dispatch)?;
        let result = self.dispatcher.dispatch_prepared(&prepared).await;
        let record = DispatchRecord {
            kind: DispatchKind::Bulk,
            message: prepared.message,
            result,
        };
        if let Err(err) = self.history_repo.insert(&record).await {
            warn!(batch_id = %record.result.batch_id, error = %err, "failed to record dispatch history");
        }

        Ok(BulkSendResponse::Sent(record.result))
    }
}

/// An explicit message wins over a template; a template id must exist.
fn resolve_message(message: Option<String>, template: Option<&str>) -> Result<String, DispatchError> {
    if let Some(message) = message.filter(|m| !m.trim().is_empty()) {
        return Ok(message);
    }

    match template.map(str::trim).filter(|t| !t.is_empty()) {
        Some(id) => find_template(id)
            .map(|t| t.body.to_string())
            .ok_or_else(|| DispatchError::UnknownTemplate(id.to_string())),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Duration, Utc};

    use super::*;
    use crate::{
        application::handlers::bulk_dispatcher::DispatcherConfig,
        infrastructure::{
            repositories::in_memory::{
                InMemoryScheduledDispatchRepository, InMemorySmsHistoryRepository,
            },
            sms::mock::MockSmsClient,
        },
    };

    struct Fixture {
        usecase: BulkSendUseCase,
        history: Arc<InMemorySmsHistoryRepository>,
        scheduled: Arc<InMemoryScheduledDispatchRepository>,
    }

    fn fixture() -> Fixture {
        let dispatcher = Arc::new(BulkDispatcher::new(
            MockSmsClient::new(),
            DispatcherConfig::default(),
        ));
        let history = Arc::new(InMemorySmsHistoryRepository::new());
        let scheduled = Arc::new(InMemoryScheduledDispatchRepository::new());
        let schedule_usecase = Arc::new(ScheduleDispatchUseCase::new(
            dispatcher.clone(),
            scheduled.clone(),
        ));
        let usecase = BulkSendUseCase::new(
            dispatcher,
            history.clone(),
            schedule_usecase,
            BulkSendConfig {
                schedule_offset: FixedOffset::east_opt(3 * 3600).unwrap(),
            },
        );
        Fixture {
            usecase,
            history,
            scheduled,
        }
    }

    fn request(message: Option<&str>, template: Option<&str>) -> BulkSendRequest {
        BulkSendRequest {
            recipients: vec![
                Recipient::with_phone("0712345678"),
                Recipient::with_phone("254711111111"),
            ],
            message: message.map(str::to_string),
            template: template.map(str::to_string),
            variables: HashMap::from([("name".to_string(), "Friend".to_string())]),
            schedule_date: None,
            schedule_time: None,
        }
    }

    #[tokio::test]
    async fn sends_immediately_and_records_history() {
        let fx = fixture();

        let response = fx
            .usecase
            .execute(request(Some("Hello {name}"), None))
            .await
            .unwrap();

        let BulkSendResponse::Sent(result) = response else {
            panic!("expected an immediate send");
        };
        assert_eq!(result.successful, 2);
        let (history, _) = fx.history.list(10, 0).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].result.batch_id, result.batch_id);
        assert_eq!(history[0].kind, DispatchKind::Bulk);
    }

    #[tokio::test]
    async fn falls_back_to_the_named_template() {
        let fx = fixture();

        let response = fx
            .usecase
            .execute(request(None, Some("volunteer_welcome")))
            .await
            .unwrap();

        assert!(matches!(response, BulkSendResponse::Sent(_)));
        let (history, _) = fx.history.list(10, 0).await.unwrap();
        assert!(history[0].message.starts_with("Welcome aboard Friend!"));
    }

    #[tokio::test]
    async fn history_keeps_the_rendered_text() {
        let fx = fixture();
        let mut req = request(None, Some("donation_thank_you"));
        req.variables = HashMap::from([
            ("name".to_string(), "Amina".to_string()),
            ("amount".to_string(), "500".to_string()),
        ]);

        fx.usecase.execute(req).await.unwrap();

        let (history, _) = fx.history.list(10, 0).await.unwrap();
        let message = &history[0].message;
        assert!(message.starts_with("Dear Amina,"), "{message}");
        assert!(message.contains("KES 500"), "{message}");
        assert!(!message.contains('{'), "{message}");
    }

    #[tokio::test]
    async fn unknown_template_is_rejected() {
        let fx = fixture();

        let err = fx
            .usecase
            .execute(request(None, Some("no_such_template")))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Rejected(DispatchError::UnknownTemplate(_))
        ));
    }

    #[tokio::test]
    async fn missing_message_and_template_is_an_empty_message() {
        let fx = fixture();

        let err = fx.usecase.execute(request(None, None)).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Rejected(DispatchError::EmptyMessage)
        ));
    }

    #[tokio::test]
    async fn future_schedule_is_stored_instead_of_sent() {
        let fx = fixture();
        let tomorrow = Utc::now() + Duration::days(2);
        let mut req = request(Some("Event tomorrow"), None);
        req.schedule_date = Some(format!(
            "{:04}-{:02}-{:02}",
            tomorrow.year(),
            tomorrow.month(),
            tomorrow.day()
        ));
        req.schedule_time = Some("10:00".to_string());

        let response = fx.usecase.execute(req).await.unwrap();

        let BulkSendResponse::Scheduled(ack) = response else {
            panic!("expected a scheduled dispatch");
        };
        assert_eq!(ack.recipients_count, 2);
        assert_eq!(fx.scheduled.all().await.len(), 1);
        let (history, _) = fx.history.list(10, 0).await.unwrap();
        assert!(history.is_empty());
    }
}

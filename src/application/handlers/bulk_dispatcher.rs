use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::services::{delivery::DeliveryBackend, template},
    domain::{
        errors::DispatchError,
        models::{BatchResult, DeliveryOutcome, DispatchRequest, SmsProvider, ValidRecipient},
        value_objects::{PhoneNumber, Recipient},
    },
};

pub const MAX_MESSAGE_LENGTH: usize = 160;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub send_timeout: Duration,
    pub max_message_length: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_secs(1),
            send_timeout: Duration::from_secs(30),
            max_message_length: MAX_MESSAGE_LENGTH,
        }
    }
}

/// A request that passed validation: rendered once, recipients split.
#[derive(Debug, Clone)]
pub struct PreparedDispatch {
    pub message: String,
    pub valid: Vec<ValidRecipient>,
    pub invalid: Vec<Recipient>,
}

pub struct BulkDispatcher {
    backend: Arc<dyn DeliveryBackend>,
    config: DispatcherConfig,
}

impl BulkDispatcher {
    pub fn new(backend: Arc<dyn DeliveryBackend>, config: DispatcherConfig) -> Self {
        Self { backend, config }
    }

    pub fn provider(&self) -> SmsProvider {
        self.backend.provider()
    }

    /// Runs every check a dispatch needs without touching the backend.
    pub fn prepare(&self, request: &DispatchRequest) -> Result<PreparedDispatch, DispatchError> {
        if request.recipients.is_empty() {
            return Err(DispatchError::EmptyRecipientList);
        }
        if request.message.trim().is_empty() {
            return Err(DispatchError::EmptyMessage);
        }

        let message = template::render(&request.message, &request.template_variables);
        let length = message.chars().count();
        if length > self.config.max_message_length {
            return Err(DispatchError::MessageTooLong {
                length,
                max: self.config.max_message_length,
            });
        }

        let (valid, invalid) = partition_recipients(&request.recipients);
        if valid.is_empty() {
            return Err(DispatchError::NoValidRecipients {
                invalid_recipients: invalid,
            });
        }

        Ok(PreparedDispatch {
            message,
            valid,
            invalid,
        })
    }

    pub async fn dispatch(&self, request: &DispatchRequest) -> Result<BatchResult, DispatchError> {
        let prepared = self.prepare(request)?;
        Ok(self.dispatch_prepared(&prepared).await)
    }

    /// Delivers an already validated dispatch. `prepared.message` is the
    /// rendered text every recipient receives.
    #[instrument(
        skip_all,
        fields(provider = self.backend.provider().as_str(), recipients = prepared.valid.len())
    )]
    pub async fn dispatch_prepared(&self, prepared: &PreparedDispatch) -> BatchResult {
        if !prepared.invalid.is_empty() {
            info!(
                invalid = prepared.invalid.len(),
                "skipping recipients with invalid phone numbers"
            );
        }

        let outcomes = self.deliver(&prepared.message, prepared.valid.clone()).await;
        let result = BatchResult::new(outcomes, prepared.invalid.clone());

        info!(
            batch_id = %result.batch_id,
            successful = result.successful,
            failed = result.failed,
            "dispatch finished"
        );

        result
    }

    async fn deliver(&self, message: &str, valid: Vec<ValidRecipient>) -> Vec<DeliveryOutcome> {
        let mut outcomes = Vec::with_capacity(valid.len());
        let batches = into_batches(valid, self.config.batch_size);
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            if index > 0 {
                sleep(self.config.batch_delay).await;
            }
            debug!(
                batch = index + 1,
                of = batch_count,
                size = batch.len(),
                "sending batch"
            );

            let sends = batch
                .into_iter()
                .map(|recipient| self.send(recipient, message));
            outcomes.extend(join_all(sends).await);
        }

        outcomes
    }

    async fn send(&self, recipient: ValidRecipient, message: &str) -> DeliveryOutcome {
        let sent = timeout(
            self.config.send_timeout,
            self.backend.send_one(&recipient.phone, message),
        )
        .await;

        match sent {
            Ok(Ok(receipt)) => DeliveryOutcome::delivered(recipient, receipt.message_id),
            Ok(Err(err)) => {
                warn!(phone = %recipient.phone, error = %err, "delivery failed");
                DeliveryOutcome::failed(recipient, err.to_string())
            }
            Err(_) => {
                let reason = format!(
                    "delivery timed out after {}s",
                    self.config.send_timeout.as_secs()
                );
                warn!(phone = %recipient.phone, "{reason}");
                DeliveryOutcome::failed(recipient, reason)
            }
        }
    }
}

/// Splits recipients by whether their phone normalizes, preserving order.
pub fn partition_recipients(recipients: &[Recipient]) -> (Vec<ValidRecipient>, Vec<Recipient>) {
    let mut valid = Vec::with_capacity(recipients.len());
    let mut invalid = Vec::new();

    for recipient in recipients {
        match PhoneNumber::normalize(&recipient.phone) {
            Some(phone) => valid.push(ValidRecipient {
                recipient: recipient.clone(),
                phone,
            }),
            None => invalid.push(recipient.clone()),
        }
    }

    (valid, invalid)
}

fn into_batches<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        batches.push(items.by_ref().take(size).collect());
    }

    batches
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::application::services::delivery::DeliveryReceipt;

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(String, String)>>,
        failing: HashSet<String>,
        latency: HashMap<String, Duration>,
        default_latency: Duration,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl RecordingBackend {
        fn failing(phones: &[&str]) -> Self {
            Self {
                failing: phones.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            }
        }

        fn with_latency(latency: Duration) -> Self {
            Self {
                default_latency: latency,
                ..Default::default()
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DeliveryBackend for RecordingBackend {
        fn provider(&self) -> SmsProvider {
            SmsProvider::Mock
        }

        async fn send_one(
            &self,
            phone: &PhoneNumber,
            message: &str,
        ) -> anyhow::Result<DeliveryReceipt> {
            self.calls
                .lock()
                .unwrap()
                .push((phone.to_string(), message.to_string()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let latency = self
                .latency
                .get(phone.as_str())
                .copied()
                .unwrap_or(self.default_latency);
            if !latency.is_zero() {
                sleep(latency).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(phone.as_str()) {
                anyhow::bail!("gateway rejected {phone}");
            }
            Ok(DeliveryReceipt {
                message_id: Some(format!("msg-{phone}")),
            })
        }
    }

    fn dispatcher(backend: Arc<RecordingBackend>) -> BulkDispatcher {
        BulkDispatcher::new(backend, DispatcherConfig::default())
    }

    fn request(message: &str, phones: &[&str]) -> DispatchRequest {
        DispatchRequest {
            message: message.to_string(),
            recipients: phones.iter().map(|p| Recipient::with_phone(*p)).collect(),
            template_variables: HashMap::new(),
        }
    }

    fn phones(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("07{i:08}")).collect()
    }

    #[tokio::test]
    async fn rejects_empty_recipient_list() {
        let backend = Arc::new(RecordingBackend::default());
        let err = dispatcher(backend.clone())
            .dispatch(&request("hello", &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::EmptyRecipientList));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn rejects_blank_message() {
        let backend = Arc::new(RecordingBackend::default());
        let err = dispatcher(backend.clone())
            .dispatch(&request("   ", &["0712345678"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::EmptyMessage));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn rejects_overlong_message_after_substitution_before_any_send() {
        let backend = Arc::new(RecordingBackend::default());
        let mut req = request("{body}", &["0712345678", "0712345679"]);
        req.template_variables
            .insert("body".to_string(), "x".repeat(161));

        let err = dispatcher(backend.clone()).dispatch(&req).await.unwrap_err();

        assert!(matches!(
            err,
            DispatchError::MessageTooLong {
                length: 161,
                max: 160
            }
        ));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn accepts_message_of_exactly_the_limit() {
        let backend = Arc::new(RecordingBackend::default());
        let message = "é".repeat(160);
        let result = dispatcher(backend.clone())
            .dispatch(&request(&message, &["0712345678"]))
            .await
            .unwrap();

        assert_eq!(result.successful, 1);
    }

    #[tokio::test]
    async fn reports_invalid_recipients_when_none_are_valid() {
        let backend = Arc::new(RecordingBackend::default());
        let err = dispatcher(backend.clone())
            .dispatch(&request("hello", &["bad", "12345"]))
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::NoValidRecipients { .. }));
        assert_eq!(err.invalid_recipients().len(), 2);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn skips_invalid_phones_and_sends_to_the_rest() {
        let backend = Arc::new(RecordingBackend::default());
        let mut req = request("Hi {name}", &[]);
        req.recipients = vec![
            Recipient {
                phone: "0712345678".to_string(),
                name: Some("Amina".to_string()),
                email: None,
            },
            Recipient::with_phone("bad"),
        ];

        let result = dispatcher(backend.clone()).dispatch(&req).await.unwrap();

        assert_eq!(result.invalid_recipients, vec![Recipient::with_phone("bad")]);
        assert_eq!(result.total_recipients, 1);
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.outcomes[0].phone.as_str(), "+254712345678");
        assert_eq!(
            backend.calls.lock().unwrap().as_slice(),
            &[("+254712345678".to_string(), "Hi {name}".to_string())]
        );
    }

    #[test]
    fn partition_puts_every_recipient_in_exactly_one_side() {
        let recipients: Vec<Recipient> = ["0712345678", "nope", "254712345679", "", "712345670"]
            .into_iter()
            .map(Recipient::with_phone)
            .collect();

        let (valid, invalid) = partition_recipients(&recipients);

        assert_eq!(valid.len() + invalid.len(), recipients.len());
        let valid_raw: Vec<&str> = valid.iter().map(|v| v.recipient.phone.as_str()).collect();
        assert_eq!(valid_raw, vec!["0712345678", "254712345679", "712345670"]);
        let invalid_raw: Vec<&str> = invalid.iter().map(|r| r.phone.as_str()).collect();
        assert_eq!(invalid_raw, vec!["nope", ""]);
    }

    #[test]
    fn batches_keep_order_and_size() {
        let batches = into_batches((0..25).collect::<Vec<_>>(), 10);

        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(batches.concat(), (0..25).collect::<Vec<_>>());
        assert!(into_batches(Vec::<u8>::new(), 10).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_only_between_batches() {
        let backend = Arc::new(RecordingBackend::default());
        let numbers = phones(25);
        let req = request("hello", &numbers.iter().map(String::as_str).collect::<Vec<_>>());

        let started = Instant::now();
        let result = dispatcher(backend.clone()).dispatch(&req).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(result.total_recipients, 25);
        assert_eq!(backend.call_count(), 25);
        assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn fans_out_within_a_batch_but_not_across_batches() {
        let backend = Arc::new(RecordingBackend::with_latency(Duration::from_millis(50)));
        let numbers = phones(25);
        let req = request("hello", &numbers.iter().map(String::as_str).collect::<Vec<_>>());

        dispatcher(backend.clone()).dispatch(&req).await.unwrap();

        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_follow_input_order_regardless_of_completion_order() {
        let numbers = phones(5);
        let mut backend = RecordingBackend::default();
        for (i, raw) in numbers.iter().enumerate() {
            let phone = PhoneNumber::normalize(raw).unwrap();
            backend
                .latency
                .insert(phone.to_string(), Duration::from_millis(100 - i as u64 * 20));
        }
        let backend = Arc::new(backend);
        let req = request("hello", &numbers.iter().map(String::as_str).collect::<Vec<_>>());

        let result = dispatcher(backend).dispatch(&req).await.unwrap();

        let order: Vec<&str> = result
            .outcomes
            .iter()
            .map(|o| o.recipient.phone.as_str())
            .collect();
        assert_eq!(order, numbers.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn one_failure_does_not_affect_its_siblings() {
        let numbers = phones(10);
        let third = PhoneNumber::normalize(&numbers[2]).unwrap();
        let backend = Arc::new(RecordingBackend::failing(&[third.as_str()]));
        let req = request("hello", &numbers.iter().map(String::as_str).collect::<Vec<_>>());

        let result = dispatcher(backend.clone()).dispatch(&req).await.unwrap();

        assert_eq!(result.outcomes.len(), 10);
        assert_eq!(result.successful, 9);
        assert_eq!(result.failed, 1);
        assert_eq!(result.successful + result.failed, result.outcomes.len());
        for (i, outcome) in result.outcomes.iter().enumerate() {
            if i == 2 {
                assert!(!outcome.success);
                assert!(outcome.message_id.is_none());
                assert!(outcome.error.as_deref().unwrap().contains("gateway rejected"));
            } else {
                assert!(outcome.success);
                assert!(outcome.error.is_none());
                assert_eq!(
                    outcome.message_id.as_deref(),
                    Some(format!("msg-{}", outcome.phone).as_str())
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_calls_time_out_as_failures() {
        let backend = Arc::new(RecordingBackend::with_latency(Duration::from_secs(120)));
        let config = DispatcherConfig {
            send_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let dispatcher = BulkDispatcher::new(backend, config);

        let result = dispatcher
            .dispatch(&request("hello", &["0712345678"]))
            .await
            .unwrap();

        assert_eq!(result.failed, 1);
        assert_eq!(
            result.outcomes[0].error.as_deref(),
            Some("delivery timed out after 5s")
        );
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::{
    application::services::delivery::{DeliveryBackend, DeliveryReceipt},
    domain::{models::SmsProvider, value_objects::PhoneNumber},
};

/// Logs instead of sending. Used in development and when no gateway is
/// configured.
pub struct MockSmsClient;

impl MockSmsClient {
    pub fn new() -> Arc<dyn DeliveryBackend> {
        Arc::new(Self) as Arc<dyn DeliveryBackend>
    }
}

#[async_trait]
impl DeliveryBackend for MockSmsClient {
    fn provider(&self) -> SmsProvider {
        SmsProvider::Mock
    }

    async fn send_one(
        &self,
        phone: &PhoneNumber,
        message: &str,
    ) -> anyhow::Result<DeliveryReceipt> {
        let message_id = format!("MOCK_{}", Uuid::new_v4().simple());
        info!(%phone, %message_id, chars = message.chars().count(), "[mock] sms sent");
        Ok(DeliveryReceipt {
            message_id: Some(message_id),
        })
    }
}

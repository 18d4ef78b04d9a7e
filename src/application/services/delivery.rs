use async_trait::async_trait;

use crate::domain::{models::SmsProvider, value_objects::PhoneNumber};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
}

/// One gateway capable of sending a single SMS.
///
/// Any `Err` is reported as that recipient's failure and never reaches the
/// other sends of the same dispatch.
#[async_trait]
pub trait DeliveryBackend: Send + Sync {
    fn provider(&self) -> SmsProvider;

    async fn send_one(&self, phone: &PhoneNumber, message: &str)
    -> anyhow::Result<DeliveryReceipt>;
}

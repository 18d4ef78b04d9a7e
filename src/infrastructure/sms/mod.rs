use std::sync::Arc;

use crate::application::services::delivery::DeliveryBackend;

use self::{
    africas_talking::{AfricasTalkingClient, AfricasTalkingConfig},
    mock::MockSmsClient,
    twilio::{TwilioClient, TwilioConfig},
};

pub mod africas_talking;
pub mod mock;
pub mod twilio;

#[derive(Debug, Clone)]
pub enum GatewayConfig {
    Mock,
    Twilio(TwilioConfig),
    AfricasTalking(AfricasTalkingConfig),
}

pub fn build_backend(config: &GatewayConfig) -> anyhow::Result<Arc<dyn DeliveryBackend>> {
    match config {
        GatewayConfig::Mock => Ok(MockSmsClient::new()),
        GatewayConfig::Twilio(config) => TwilioClient::new(config.clone()),
        GatewayConfig::AfricasTalking(config) => AfricasTalkingClient::new(config.clone()),
    }
}

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;

use crate::{
    application::services::delivery::{DeliveryBackend, DeliveryReceipt},
    domain::{models::SmsProvider, value_objects::PhoneNumber},
};

pub const AFRICAS_TALKING_BASE_URL: &str = "https://api.africastalking.com";

#[derive(Debug, Clone)]
pub struct AfricasTalkingConfig {
    pub username: String,
    pub api_key: String,
    pub sender_id: Option<String>,
    pub base_url: String,
}

pub struct AfricasTalkingClient {
    http: Client,
    config: AfricasTalkingConfig,
}

impl AfricasTalkingClient {
    pub fn new(config: AfricasTalkingConfig) -> anyhow::Result<Arc<dyn DeliveryBackend>> {
        let http = Client::builder()
            .user_agent("sms-dispatch/africastalking")
            .build()
            .context("failed to build africa's talking client")?;

        Ok(Arc::new(Self { http, config }) as Arc<dyn DeliveryBackend>)
    }

    fn is_accepted(recipient: &AtRecipient) -> bool {
        // 100 Processed, 101 Sent, 102 Queued
        recipient.status == "Success" || (100..=102).contains(&recipient.status_code)
    }
}

#[async_trait]
impl DeliveryBackend for AfricasTalkingClient {
    fn provider(&self) -> SmsProvider {
        SmsProvider::AfricasTalking
    }

    async fn send_one(
        &self,
        phone: &PhoneNumber,
        message: &str,
    ) -> anyhow::Result<DeliveryReceipt> {
        let url = format!(
            "{}/version1/messaging",
            self.config.base_url.trim_end_matches('/')
        );

        let mut form = vec![
            ("username", self.config.username.as_str()),
            ("to", phone.as_str()),
            ("message", message),
        ];
        if let Some(sender_id) = &self.config.sender_id {
            form.push(("from", sender_id.as_str()));
        }

        let response = self
            .http
            .post(url)
            .header("apiKey", &self.config.api_key)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "africa's talking api error {}: {}",
                status.as_u16(),
                if body.trim().is_empty() { "unknown error" } else { body.trim() }
            );
        }

        let payload: AtEnvelope = response.json().await?;
        let recipient = payload
            .sms_message_data
            .recipients
            .into_iter()
            .next()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "africa's talking accepted no recipients: {}",
                    payload.sms_message_data.message
                )
            })?;

        if !Self::is_accepted(&recipient) {
            anyhow::bail!(
                "africa's talking rejected {}: {} ({})",
                recipient.number,
                recipient.status,
                recipient.status_code
            );
        }

        Ok(DeliveryReceipt {
            message_id: recipient.message_id.filter(|id| id != "None"),
        })
    }
}

#[derive(Debug, Deserialize)]
struct AtEnvelope {
    #[serde(rename = "SMSMessageData")]
    sms_message_data: AtMessageData,
}

#[derive(Debug, Deserialize)]
struct AtMessageData {
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Recipients", default)]
    recipients: Vec<AtRecipient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtRecipient {
    status_code: u16,
    number: String,
    status: String,
    message_id: Option<String>,
}

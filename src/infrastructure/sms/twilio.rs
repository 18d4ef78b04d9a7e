use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    application::services::delivery::{DeliveryBackend, DeliveryReceipt},
    domain::{models::SmsProvider, value_objects::PhoneNumber},
};

pub const TWILIO_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub base_url: String,
}

pub struct TwilioClient {
    http: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    pub fn new(config: TwilioConfig) -> anyhow::Result<Arc<dyn DeliveryBackend>> {
        let http = Client::builder()
            .user_agent("sms-dispatch/twilio")
            .build()
            .context("failed to build twilio client")?;

        Ok(Arc::new(Self { http, config }) as Arc<dyn DeliveryBackend>)
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl DeliveryBackend for TwilioClient {
    fn provider(&self) -> SmsProvider {
        SmsProvider::Twilio
    }

    async fn send_one(
        &self,
        phone: &PhoneNumber,
        message: &str,
    ) -> anyhow::Result<DeliveryReceipt> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", phone.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", message),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.json::<TwilioError>().await.ok();
            anyhow::bail!(
                "twilio api error {}: {}",
                error
                    .as_ref()
                    .and_then(|e| e.code)
                    .map_or_else(|| status.as_u16().to_string(), |c| c.to_string()),
                error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "unknown error".to_string())
            );
        }

        let payload: TwilioMessage = response.json().await?;
        if let Some(reason) = payload.error_message {
            anyhow::bail!("twilio rejected message {}: {}", payload.sid, reason);
        }

        Ok(DeliveryReceipt {
            message_id: Some(payload.sid),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioError {
    code: Option<i64>,
    message: Option<String>,
}

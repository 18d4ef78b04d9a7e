use std::env::var;
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use dotenvy::dotenv;
use thiserror::Error;

use crate::{
    application::handlers::bulk_dispatcher::DispatcherConfig,
    domain::models::SmsProvider,
    infrastructure::sms::{
        GatewayConfig,
        africas_talking::{AFRICAS_TALKING_BASE_URL, AfricasTalkingConfig},
        twilio::{TWILIO_BASE_URL, TwilioConfig},
    },
};

const DEFAULT_SCHEDULE_OFFSET_MINUTES: i32 = 180;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env param {0}")]
    Missing(&'static str),
    #[error("invalid value '{value}' for env param {name}")]
    Invalid { name: &'static str, value: String },
}

pub struct Config {
    pub port: u16,
    pub scheme: String,
    pub host: String,
    pub gateway: GatewayConfig,
    pub dispatcher: DispatcherConfig,
    pub schedule_offset: FixedOffset,
    pub database_url: Option<String>,
}

impl Config {
    pub fn try_parse() -> Result<Config, ConfigError> {
        let _ = dotenv();
        Self::from_lookup(|name| var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let env = Env { lookup: &lookup };
        let defaults = DispatcherConfig::default();

        let batch_size: usize = env.parsed("SMS_BATCH_SIZE", defaults.batch_size)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                name: "SMS_BATCH_SIZE",
                value: "0".to_string(),
            });
        }

        let send_timeout_secs: u64 =
            env.parsed("SMS_SEND_TIMEOUT_SECS", defaults.send_timeout.as_secs())?;
        if send_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SMS_SEND_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let offset_minutes: i32 =
            env.parsed("SMS_SCHEDULE_UTC_OFFSET_MINUTES", DEFAULT_SCHEDULE_OFFSET_MINUTES)?;
        let schedule_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| ConfigError::Invalid {
                name: "SMS_SCHEDULE_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        Ok(Config {
            port: env.required_parsed("PORT")?,
            scheme: env.required("SCHEME")?,
            host: env.required("HOST")?,
            gateway: Self::gateway(&env)?,
            dispatcher: DispatcherConfig {
                batch_size,
                batch_delay: Duration::from_millis(
                    env.parsed("SMS_BATCH_DELAY_MS", defaults.batch_delay.as_millis() as u64)?,
                ),
                send_timeout: Duration::from_secs(send_timeout_secs),
                max_message_length: defaults.max_message_length,
            },
            schedule_offset,
            database_url: env.optional("DATABASE_URL"),
        })
    }

    fn gateway(env: &Env<'_>) -> Result<GatewayConfig, ConfigError> {
        let provider = match env.optional("SMS_PROVIDER") {
            None => SmsProvider::Mock,
            Some(value) => SmsProvider::parse(&value).ok_or(ConfigError::Invalid {
                name: "SMS_PROVIDER",
                value,
            })?,
        };

        Ok(match provider {
            SmsProvider::Mock => GatewayConfig::Mock,
            SmsProvider::Twilio => GatewayConfig::Twilio(TwilioConfig {
                account_sid: env.required("TWILIO_ACCOUNT_SID")?,
                auth_token: env.required("TWILIO_AUTH_TOKEN")?,
                from_number: env.required("TWILIO_FROM_NUMBER")?,
                base_url: env
                    .optional("TWILIO_BASE_URL")
                    .unwrap_or_else(|| TWILIO_BASE_URL.to_string()),
            }),
            SmsProvider::AfricasTalking => GatewayConfig::AfricasTalking(AfricasTalkingConfig {
                username: env.required("AT_USERNAME")?,
                api_key: env.required("AT_API_KEY")?,
                sender_id: env.optional("AT_SENDER_ID"),
                base_url: env
                    .optional("AT_BASE_URL")
                    .unwrap_or_else(|| AFRICAS_TALKING_BASE_URL.to_string()),
            }),
        })
    }
}

struct Env<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Env<'_> {
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn required_parsed<T: FromStr>(&self, name: &'static str) -> Result<T, ConfigError> {
        let value = self.required(name)?;
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value })
    }

    fn parsed<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.optional(name) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SmsProvider {
    Mock,
    Twilio,
    AfricasTalking,
}

impl SmsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SmsProvider::Mock => "mock",
            SmsProvider::Twilio => "twilio",
            SmsProvider::AfricasTalking => "africastalking",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(SmsProvider::Mock),
            "twilio" => Some(SmsProvider::Twilio),
            "africastalking" | "africas_talking" => Some(SmsProvider::AfricasTalking),
            _ => None,
        }
    }
}

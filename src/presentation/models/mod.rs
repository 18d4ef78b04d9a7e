use poem_openapi::Enum;

use crate::domain::models::{DispatchKind, SmsProvider};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProviderKind {
    #[oai(rename = "mock")]
    Mock,
    #[oai(rename = "twilio")]
    Twilio,
    #[oai(rename = "africastalking")]
    AfricasTalking,
}

impl From<SmsProvider> for ProviderKind {
    fn from(value: SmsProvider) -> Self {
        match value {
            SmsProvider::Mock => ProviderKind::Mock,
            SmsProvider::Twilio => ProviderKind::Twilio,
            SmsProvider::AfricasTalking => ProviderKind::AfricasTalking,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum DispatchKindDto {
    #[oai(rename = "single")]
    Single,
    #[oai(rename = "bulk")]
    Bulk,
}

impl From<DispatchKind> for DispatchKindDto {
    fn from(value: DispatchKind) -> Self {
        match value {
            DispatchKind::Single => DispatchKindDto::Single,
            DispatchKind::Bulk => DispatchKindDto::Bulk,
        }
    }
}

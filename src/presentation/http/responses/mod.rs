use poem_openapi::Object;
use uuid::Uuid;

use crate::presentation::{
    http::requests::RecipientDto,
    models::{DispatchKindDto, ProviderKind},
};

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct DeliveryOutcomeDto {
    pub recipient: RecipientDto,
    pub phone: String,
    pub success: bool,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct BatchResultDto {
    pub batch_id: String,
    pub provider: ProviderKind,
    pub total_recipients: u32,
    pub successful: u32,
    pub failed: u32,
    pub outcomes: Vec<DeliveryOutcomeDto>,
    pub invalid_recipients: Vec<RecipientDto>,
    pub timestamp: String,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct ScheduledDispatchDto {
    pub scheduled_id: Uuid,
    pub scheduled_for: String,
    pub recipients_count: u32,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct SendSmsResponseDto {
    pub batch_id: String,
    pub provider: ProviderKind,
    pub outcome: DeliveryOutcomeDto,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct DispatchErrorDto {
    pub error: String,
    pub message: String,
    #[oai(skip_serializing_if_is_none)]
    pub invalid_recipients: Option<Vec<RecipientDto>>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct HistoryEntryDto {
    pub batch_id: String,
    pub kind: DispatchKindDto,
    pub message: String,
    pub total_recipients: u32,
    pub successful: u32,
    pub failed: u32,
    pub invalid_recipients: u32,
    pub outcomes: Vec<DeliveryOutcomeDto>,
    pub timestamp: String,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct PaginatedHistoryDto {
    pub entries: Vec<HistoryEntryDto>,
    pub has_more: bool,
    pub next_offset: Option<u32>,
}

#[derive(Object)]
#[oai(rename_all = "camelCase")]
pub struct SmsStatsDto {
    pub total_batches: u64,
    pub total_messages: u64,
    pub successful: u64,
    pub failed: u64,
    pub invalid_recipients: u64,
    pub success_rate: f64,
    pub pending_scheduled: u64,
}

#[derive(Object)]
pub struct SmsTemplateDto {
    pub id: String,
    pub name: String,
    pub body: String,
    pub variables: Vec<String>,
}

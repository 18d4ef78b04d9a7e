use crate::{
    domain::{
        errors::DispatchError,
        models::{
            BatchResult, DeliveryOutcome, DispatchRecord, ScheduledDispatch, SmsProvider, SmsStats,
            SmsTemplate,
        },
        value_objects::Recipient,
    },
    presentation::http::{
        requests::RecipientDto,
        responses::{
            BatchResultDto, DeliveryOutcomeDto, DispatchErrorDto, HistoryEntryDto,
            ScheduledDispatchDto, SmsStatsDto, SmsTemplateDto,
        },
    },
};

pub fn map_recipient(recipient: &Recipient) -> RecipientDto {
    RecipientDto {
        phone: recipient.phone.clone(),
        name: recipient.name.clone(),
        email: recipient.email.clone(),
    }
}

pub fn map_outcome(outcome: &DeliveryOutcome) -> DeliveryOutcomeDto {
    DeliveryOutcomeDto {
        recipient: map_recipient(&outcome.recipient),
        phone: outcome.phone.to_string(),
        success: outcome.success,
        message_id: outcome.message_id.clone(),
        error: outcome.error.clone(),
    }
}

pub fn map_batch_result(result: &BatchResult, provider: SmsProvider) -> BatchResultDto {
    BatchResultDto {
        batch_id: result.batch_id.clone(),
        provider: provider.into(),
        total_recipients: result.total_recipients as u32,
        successful: result.successful as u32,
        failed: result.failed as u32,
        outcomes: result.outcomes.iter().map(map_outcome).collect(),
        invalid_recipients: result.invalid_recipients.iter().map(map_recipient).collect(),
        timestamp: result.timestamp.to_rfc3339(),
    }
}

pub fn map_scheduled(ack: &ScheduledDispatch) -> ScheduledDispatchDto {
    ScheduledDispatchDto {
        scheduled_id: ack.scheduled_id,
        scheduled_for: ack.scheduled_for.to_rfc3339(),
        recipients_count: ack.recipients_count as u32,
    }
}

pub fn map_history(record: &DispatchRecord) -> HistoryEntryDto {
    let result = &record.result;
    HistoryEntryDto {
        batch_id: result.batch_id.clone(),
        kind: record.kind.into(),
        message: record.message.clone(),
        total_recipients: result.total_recipients as u32,
        successful: result.successful as u32,
        failed: result.failed as u32,
        invalid_recipients: result.invalid_recipients.len() as u32,
        outcomes: result.outcomes.iter().map(map_outcome).collect(),
        timestamp: result.timestamp.to_rfc3339(),
    }
}

pub fn map_stats(stats: &SmsStats) -> SmsStatsDto {
    SmsStatsDto {
        total_batches: stats.total_batches,
        total_messages: stats.total_messages,
        successful: stats.successful,
        failed: stats.failed,
        invalid_recipients: stats.invalid_recipients,
        success_rate: stats.success_rate,
        pending_scheduled: stats.pending_scheduled,
    }
}

pub fn map_template(template: &SmsTemplate) -> SmsTemplateDto {
    SmsTemplateDto {
        id: template.id.to_string(),
        name: template.name.to_string(),
        body: template.body.to_string(),
        variables: template.variables.iter().map(|v| v.to_string()).collect(),
    }
}

pub fn map_dispatch_error(err: &DispatchError) -> DispatchErrorDto {
    let invalid = err.invalid_recipients();
    DispatchErrorDto {
        error: err.code().to_string(),
        message: err.to_string(),
        invalid_recipients: (!invalid.is_empty())
            .then(|| invalid.iter().map(map_recipient).collect()),
    }
}

use thiserror::Error;

use crate::domain::value_objects::Recipient;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Rejected(#[from] DispatchError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reasons a dispatch is rejected before any delivery attempt.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("recipient list cannot be empty")]
    EmptyRecipientList,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message is {length} characters long, the limit is {max}")]
    MessageTooLong { length: usize, max: usize },
    #[error("none of the {} recipients has a valid phone number", invalid_recipients.len())]
    NoValidRecipients { invalid_recipients: Vec<Recipient> },
    #[error("unknown template: {0}")]
    UnknownTemplate(String),
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("scheduled time must be in the future")]
    ScheduleInPast,
}

impl DispatchError {
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::EmptyRecipientList => "empty_recipient_list",
            DispatchError::EmptyMessage => "empty_message",
            DispatchError::MessageTooLong { .. } => "message_too_long",
            DispatchError::NoValidRecipients { .. } => "no_valid_recipients",
            DispatchError::UnknownTemplate(_) => "unknown_template",
            DispatchError::InvalidSchedule(_) => "invalid_schedule",
            DispatchError::ScheduleInPast => "schedule_in_past",
        }
    }

    pub fn invalid_recipients(&self) -> &[Recipient] {
        match self {
            DispatchError::NoValidRecipients { invalid_recipients } => invalid_recipients,
            _ => &[],
        }
    }
}

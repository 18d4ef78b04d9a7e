pub mod dispatch;
pub mod provider;
pub mod template;

pub use dispatch::{
    BatchResult, DeliveryOutcome, DispatchKind, DispatchRecord, DispatchRequest, PendingDispatch,
    ScheduledDispatch, SmsStats, ValidRecipient,
};
pub use provider::SmsProvider;
pub use template::{SmsTemplate, TEMPLATES, find_template};

pub mod repositories;
pub mod sms;

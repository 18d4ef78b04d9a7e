pub mod bulk_send;
pub mod get_stats;
pub mod list_history;
pub mod schedule_dispatch;
pub mod send_sms;

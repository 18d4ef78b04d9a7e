use std::sync::Arc;

use chrono::FixedOffset;
use poem_openapi::Tags;

use crate::{
    application::{
        handlers::bulk_dispatcher::BulkDispatcher,
        usecases::{
            bulk_send::{BulkSendConfig, BulkSendUseCase},
            get_stats::GetStatsUseCase,
            list_history::ListHistoryUseCase,
            schedule_dispatch::ScheduleDispatchUseCase,
            send_sms::SendSmsUseCase,
        },
    },
    domain::{
        models::SmsProvider,
        repositories::{ScheduledDispatchRepository, SmsHistoryRepository},
    },
};

pub struct Endpoints;

#[derive(Clone)]
pub struct ApiState {
    pub provider: SmsProvider,
    pub send_sms_usecase: Arc<SendSmsUseCase>,
    pub bulk_send_usecase: Arc<BulkSendUseCase>,
    pub list_history_usecase: Arc<ListHistoryUseCase>,
    pub get_stats_usecase: Arc<GetStatsUseCase>,
}

impl ApiState {
    pub fn new(
        dispatcher: Arc<BulkDispatcher>,
        history_repo: Arc<dyn SmsHistoryRepository>,
        scheduled_repo: Arc<dyn ScheduledDispatchRepository>,
        schedule_offset: FixedOffset,
    ) -> Self {
        let schedule_usecase = Arc::new(ScheduleDispatchUseCase::new(
            dispatcher.clone(),
            scheduled_repo.clone(),
        ));

        Self {
            provider: dispatcher.provider(),
            send_sms_usecase: Arc::new(SendSmsUseCase::new(
                dispatcher.clone(),
                history_repo.clone(),
            )),
            bulk_send_usecase: Arc::new(BulkSendUseCase::new(
                dispatcher,
                history_repo.clone(),
                schedule_usecase,
                BulkSendConfig { schedule_offset },
            )),
            list_history_usecase: Arc::new(ListHistoryUseCase::new(history_repo.clone())),
            get_stats_usecase: Arc::new(GetStatsUseCase::new(history_repo, scheduled_repo)),
        }
    }
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Sms,
}

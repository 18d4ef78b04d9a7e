use std::sync::Arc;

use poem_openapi::{ApiResponse, OpenApi, param::Query, payload::Json};

use crate::{
    application::usecases::{
        bulk_send::{BulkSendRequest, BulkSendResponse},
        send_sms::SendSmsRequest,
    },
    domain::{errors::DomainError, models::TEMPLATES},
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        mappers::{
            map_batch_result, map_dispatch_error, map_history, map_outcome, map_scheduled,
            map_stats, map_template,
        },
        requests::{BulkSendRequestDto, SendSmsRequestDto},
        responses::{
            BatchResultDto, DispatchErrorDto, PaginatedHistoryDto, ScheduledDispatchDto,
            SendSmsResponseDto, SmsStatsDto, SmsTemplateDto,
        },
    },
};

#[derive(ApiResponse)]
pub enum SendSmsApiResponse {
    #[oai(status = 200)]
    Sent(Json<SendSmsResponseDto>),
    #[oai(status = 400)]
    Rejected(Json<DispatchErrorDto>),
}

#[derive(ApiResponse)]
pub enum BulkSendApiResponse {
    /// Delivery was attempted; individual failures are reported per outcome.
    #[oai(status = 200)]
    Sent(Json<BatchResultDto>),
    #[oai(status = 202)]
    Scheduled(Json<ScheduledDispatchDto>),
    #[oai(status = 400)]
    Rejected(Json<DispatchErrorDto>),
}

#[derive(Clone)]
pub struct SmsEndpoints {
    state: Arc<ApiState>,
}

impl SmsEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl SmsEndpoints {
    #[oai(path = "/sms/send", method = "post", tag = EndpointsTags::Sms)]
    pub async fn send(&self, request: Json<SendSmsRequestDto>) -> poem::Result<SendSmsApiResponse> {
        let request = request.0;
        let payload = SendSmsRequest {
            phone: request.phone,
            message: request.message,
            variables: request.variables.unwrap_or_default(),
        };

        match self.state.send_sms_usecase.execute(payload).await {
            Ok(response) => Ok(SendSmsApiResponse::Sent(Json(SendSmsResponseDto {
                batch_id: response.batch_id,
                provider: self.state.provider.into(),
                outcome: map_outcome(&response.outcome),
            }))),
            Err(DomainError::Rejected(err)) => {
                Ok(SendSmsApiResponse::Rejected(Json(map_dispatch_error(&err))))
            }
            Err(DomainError::Other(err)) => Err(internal_error(err)),
        }
    }

    #[oai(path = "/sms/bulk-send", method = "post", tag = EndpointsTags::Sms)]
    pub async fn bulk_send(
        &self,
        request: Json<BulkSendRequestDto>,
    ) -> poem::Result<BulkSendApiResponse> {
        let request = request.0;
        let payload = BulkSendRequest {
            recipients: request.recipients.into_iter().map(Into::into).collect(),
            message: request.message,
            template: request.template,
            variables: request.variables.unwrap_or_default(),
            schedule_date: request.schedule_date,
            schedule_time: request.schedule_time,
        };

        match self.state.bulk_send_usecase.execute(payload).await {
            Ok(BulkSendResponse::Sent(result)) => Ok(BulkSendApiResponse::Sent(Json(
                map_batch_result(&result, self.state.provider),
            ))),
            Ok(BulkSendResponse::Scheduled(ack)) => {
                Ok(BulkSendApiResponse::Scheduled(Json(map_scheduled(&ack))))
            }
            Err(DomainError::Rejected(err)) => {
                Ok(BulkSendApiResponse::Rejected(Json(map_dispatch_error(&err))))
            }
            Err(DomainError::Other(err)) => Err(internal_error(err)),
        }
    }

    #[oai(path = "/sms/history", method = "get", tag = EndpointsTags::Sms)]
    pub async fn history(
        &self,
        limit: Query<Option<u32>>,
        offset: Query<Option<u32>>,
    ) -> poem::Result<Json<PaginatedHistoryDto>> {
        let page = self
            .state
            .list_history_usecase
            .execute(limit.0, offset.0)
            .await
            .map_err(internal_error)?;

        Ok(Json(PaginatedHistoryDto {
            entries: page.records.iter().map(map_history).collect(),
            has_more: page.has_more,
            next_offset: page.next_offset,
        }))
    }

    #[oai(path = "/sms/stats", method = "get", tag = EndpointsTags::Sms)]
    pub async fn stats(&self) -> poem::Result<Json<SmsStatsDto>> {
        let stats = self
            .state
            .get_stats_usecase
            .execute()
            .await
            .map_err(internal_error)?;

        Ok(Json(map_stats(&stats)))
    }

    #[oai(path = "/sms/templates", method = "get", tag = EndpointsTags::Sms)]
    pub async fn templates(&self) -> Json<Vec<SmsTemplateDto>> {
        Json(TEMPLATES.iter().map(map_template).collect())
    }
}

fn internal_error(err: anyhow::Error) -> poem::Error {
    poem::Error::from_string(
        err.to_string(),
        poem::http::StatusCode::INTERNAL_SERVER_ERROR,
    )
}

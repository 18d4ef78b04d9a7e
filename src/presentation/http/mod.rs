use std::sync::Arc;

use poem::Route;
use poem_openapi::OpenApiService;

use crate::presentation::http::endpoints::{
    root::{ApiState, Endpoints},
    sms::SmsEndpoints,
};

pub mod endpoints;
pub mod mappers;
pub mod requests;
pub mod responses;

/// The API under `/api` with Swagger UI at `/`.
pub fn routes(state: ApiState, server_url: &str) -> Route {
    let api_service = OpenApiService::new(
        (Endpoints, SmsEndpoints::new(Arc::new(state))),
        "SMS Dispatch API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(format!("{server_url}/api"));
    let ui = api_service.swagger_ui();

    Route::new().nest("/api", api_service).nest("/", ui)
}

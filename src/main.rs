use std::io::Error;
use std::sync::Arc;

use poem::{Server, listener::TcpListener};
use tokio::main;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    application::handlers::bulk_dispatcher::BulkDispatcher,
    config::Config,
    domain::repositories::{ScheduledDispatchRepository, SmsHistoryRepository},
    infrastructure::{
        repositories::{
            in_memory::{InMemoryScheduledDispatchRepository, InMemorySmsHistoryRepository},
            postgres::{self, PostgresScheduledDispatchRepository, PostgresSmsHistoryRepository},
        },
        sms::build_backend,
    },
    presentation::http::{endpoints::root::ApiState, routes},
};

mod application;
mod config;
mod domain;
mod infrastructure;
mod presentation;

#[main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::try_parse().map_err(Error::other)?;

    let backend = build_backend(&config.gateway).map_err(Error::other)?;
    let dispatcher = Arc::new(BulkDispatcher::new(backend, config.dispatcher.clone()));
    let (history_repo, scheduled_repo) = repositories(&config).await.map_err(Error::other)?;

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);
    info!(
        %server_url,
        provider = dispatcher.provider().as_str(),
        batch_size = config.dispatcher.batch_size,
        "starting server"
    );

    let state = ApiState::new(
        dispatcher,
        history_repo,
        scheduled_repo,
        config.schedule_offset,
    );
    let app = routes(state, &server_url);

    Server::new(TcpListener::bind(format!("localhost:{}", config.port)))
        .run(app)
        .await
}

async fn repositories(
    config: &Config,
) -> anyhow::Result<(
    Arc<dyn SmsHistoryRepository>,
    Arc<dyn ScheduledDispatchRepository>,
)> {
    match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url).await?;
            info!("using postgres history store");
            let history: Arc<dyn SmsHistoryRepository> =
                PostgresSmsHistoryRepository::new(pool.clone());
            let scheduled: Arc<dyn ScheduledDispatchRepository> =
                PostgresScheduledDispatchRepository::new(pool);
            Ok((history, scheduled))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory history store");
            let history: Arc<dyn SmsHistoryRepository> =
                Arc::new(InMemorySmsHistoryRepository::new());
            let scheduled: Arc<dyn ScheduledDispatchRepository> =
                Arc::new(InMemoryScheduledDispatchRepository::new());
            Ok((history, scheduled))
        }
    }
}

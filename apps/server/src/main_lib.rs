use std::sync::Arc;

use crate::{config::Config, domain_events::WebDomainEventSink, events::EventBus};
use novanest_core::{
    events::DomainEventSink,
    goals::{GoalService, GoalServiceTrait},
};
use novanest_storage_sqlite::{
    db::{self, DbPool},
    goals::GoalRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait + Send + Sync>,
    pub pool: Arc<DbPool>,
    pub event_bus: EventBus,
}

pub fn init_tracing() {
    let log_format = std::env::var("NN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let event_bus = EventBus::new(256);
    let domain_event_sink: Arc<dyn DomainEventSink> =
        Arc::new(WebDomainEventSink::new(event_bus.clone()));

    let goal_repository = Arc::new(GoalRepository::new(pool.clone(), writer));
    let goal_service = Arc::new(
        GoalService::new(goal_repository, domain_event_sink).with_timezone(config.timezone),
    );
    tracing::info!("Streak calendar days use timezone {}", config.timezone);

    Ok(Arc::new(AppState {
        goal_service,
        pool,
        event_bus,
    }))
}

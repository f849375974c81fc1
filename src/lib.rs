pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;
pub mod background;

use crate::config::Config;
use crate::infra::factory::bootstrap_state;
use api::router::create_router;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use crate::background::start_expiration_sweeper;

/// Booking transitions, sweeps and outbound calls are traced at debug in the JSON file.
/// sqlx is held to warn there so only slow statements show up next to them.
const FILE_FILTER: &str = "info,court_booking=debug,sqlx=warn,tower_http=info";

pub fn init_logging() -> WorkerGuard {
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());
    let file_appender = tracing_appender::rolling::daily(&log_dir, "court-booking.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new(FILE_FILTER));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .init();

    info!(log_dir = %log_dir, "Booking lifecycle log written as daily JSON files");
    guard
}

pub async fn run() {
    let _guard = init_logging();

    let config = Config::from_env();
    let state = Arc::new(bootstrap_state(&config).await);

    start_expiration_sweeper(state.clone());

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("Failed to bind listener");

    info!(
        port = config.port,
        timezone = %config.timezone,
        payment_window_minutes = config.payment_window_minutes,
        sweep_interval_secs = config.sweep_interval_secs,
        "Accepting court bookings"
    );
    axum::serve(listener, app).await.expect("Server error");
}

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::ports::{
    BookingObserver, BookingRepository, Clock, CourtRepository, JoinRequestRepository, Notifier,
    PaymentGateway, SeriesRepository, VerificationCodeGenerator,
};
use crate::domain::services::booking_service::{BookingService, BookingServiceDeps, BookingSettings};
use crate::domain::services::locks::KeyedLocks;
use crate::domain::services::open_game::{JoinRequestCleanup, OpenGameCoordinator};
use crate::domain::services::recurring_planner::{RecurringPlanner, SeriesStatusObserver};
use crate::infra::payment::http_payment_gateway::HttpPaymentGateway;
use crate::infra::sms::http_notifier::HttpNotifier;
use crate::infra::system::{RandomCodeGenerator, SystemClock};
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_court_repo::PostgresCourtRepo,
    postgres_join_request_repo::PostgresJoinRequestRepo, postgres_series_repo::PostgresSeriesRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_court_repo::SqliteCourtRepo,
    sqlite_join_request_repo::SqliteJoinRequestRepo, sqlite_series_repo::SqliteSeriesRepo,
};

pub struct Repositories {
    pub courts: Arc<dyn CourtRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub series: Arc<dyn SeriesRepository>,
    pub join_requests: Arc<dyn JoinRequestRepository>,
}

impl Repositories {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            courts: Arc::new(SqliteCourtRepo::new(pool.clone())),
            bookings: Arc::new(SqliteBookingRepo::new(pool.clone())),
            series: Arc::new(SqliteSeriesRepo::new(pool.clone())),
            join_requests: Arc::new(SqliteJoinRequestRepo::new(pool)),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            courts: Arc::new(PostgresCourtRepo::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            series: Arc::new(PostgresSeriesRepo::new(pool.clone())),
            join_requests: Arc::new(PostgresJoinRequestRepo::new(pool)),
        }
    }
}

/// Outbound dependencies of the engine. Swapped for fakes in tests.
pub struct Collaborators {
    pub payments: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub codes: Arc<dyn VerificationCodeGenerator>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let timeout = Duration::from_millis(config.outbound_timeout_ms);
        Ok(Self {
            payments: Arc::new(HttpPaymentGateway::new(
                config.payment_service_url.clone(),
                config.payment_service_token.clone(),
                timeout,
            )?),
            notifier: Arc::new(HttpNotifier::new(
                config.sms_service_url.clone(),
                config.sms_service_token.clone(),
                timeout,
            )?),
            codes: Arc::new(RandomCodeGenerator),
            clock: Arc::new(SystemClock),
        })
    }
}

/// Wires services and observers on top of the given repositories.
pub fn assemble_state(config: &Config, repos: Repositories, collaborators: Collaborators) -> AppState {
    let locks = Arc::new(KeyedLocks::new());
    let clock = collaborators.clock;

    let observers: Vec<Arc<dyn BookingObserver>> = vec![
        Arc::new(SeriesStatusObserver::new(repos.series.clone(), clock.clone(), config.timezone)),
        Arc::new(JoinRequestCleanup::new(repos.join_requests.clone(), locks.clone(), clock.clone())),
    ];

    let booking_service = Arc::new(BookingService::new(
        BookingServiceDeps {
            courts: repos.courts.clone(),
            bookings: repos.bookings.clone(),
            payments: collaborators.payments,
            notifier: collaborators.notifier.clone(),
            codes: collaborators.codes,
            clock: clock.clone(),
            locks: locks.clone(),
            observers,
        },
        BookingSettings {
            payment_window: chrono::Duration::minutes(config.payment_window_minutes),
            timezone: config.timezone,
            outbound_timeout: Duration::from_millis(config.outbound_timeout_ms),
        },
    ));

    let planner = Arc::new(RecurringPlanner::new(
        repos.series.clone(),
        repos.bookings.clone(),
        booking_service.clone(),
        locks.clone(),
        clock.clone(),
    ));

    let open_games = Arc::new(OpenGameCoordinator::new(
        repos.bookings.clone(),
        repos.join_requests.clone(),
        collaborators.notifier,
        locks,
        clock.clone(),
        Duration::from_millis(config.outbound_timeout_ms),
    ));

    AppState {
        config: config.clone(),
        court_repo: repos.courts,
        booking_repo: repos.bookings,
        series_repo: repos.series,
        join_request_repo: repos.join_requests,
        booking_service,
        planner,
        open_games,
        clock,
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;
    let collaborators = Collaborators::from_config(config).expect("Failed to build outbound HTTP clients");

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        assemble_state(config, Repositories::postgres(pool), collaborators)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        assemble_state(config, Repositories::sqlite(pool), collaborators)
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}

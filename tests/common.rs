#![allow(dead_code)]

use court_booking::{
    api::router::create_router,
    background::ExpirationSweeper,
    config::Config,
    domain::models::booking::{BookingOrigin, BookingRequest, SportType},
    domain::models::court::{Court, NewCourtParams},
    domain::models::slot::SlotDuration,
    domain::models::booking::Booking,
    domain::ports::{Clock, Notifier, PaymentGateway, PaymentIntent, Recipient, VerificationCodeGenerator},
    error::AppError,
    infra::factory::{assemble_state, Collaborators, Repositories},
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use std::str::FromStr;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tower::ServiceExt;
use serde_json::Value;

/// 2031-03-03 is a Monday.
pub const T0: &str = "2031-03-03T12:00:00Z";

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn time(s: &str) -> NaiveTime {
    NaiveTime::parse_from_str(s, "%H:%M").unwrap()
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn set(&self, value: DateTime<Utc>) {
        *self.now.lock().unwrap() = value;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
pub struct MockPaymentGateway {
    pub fail: AtomicBool,
    /// Never answers while set.
    pub hang: AtomicBool,
    counter: AtomicUsize,
    pub intents: Mutex<Vec<(String, i64)>>,
}

impl MockPaymentGateway {
    pub fn created(&self) -> usize {
        self.intents.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_payment_intent(&self, booking: &Booking, amount_cents: i64) -> Result<PaymentIntent, AppError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Gateway("payment provider offline".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.intents.lock().unwrap().push((booking.id.clone(), amount_cents));
        Ok(PaymentIntent {
            intent_id: format!("pi_{}", n),
            qr_payload: format!("00020126580014BR.GOV.BCB.PIX{}", n),
            expiry: booking.created_at + chrono::Duration::minutes(10),
        })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: AtomicBool,
    pub hang: AtomicBool,
    pub messages: Mutex<Vec<(Recipient, String)>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(Recipient, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, recipient: &Recipient, message: &str) -> Result<(), AppError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::InternalWithMsg("messaging service offline".into()));
        }
        self.messages.lock().unwrap().push((recipient.clone(), message.to_string()));
        Ok(())
    }
}

pub struct FixedCodeGenerator(pub &'static str);

impl VerificationCodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub payments: Arc<MockPaymentGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            timezone: chrono_tz::UTC,
            payment_window_minutes: 10,
            sweep_interval_secs: 300,
            outbound_timeout_ms: 200,
            payment_service_url: "http://localhost".to_string(),
            payment_service_token: "token".to_string(),
            sms_service_url: "http://localhost".to_string(),
            sms_service_token: "token".to_string(),
        };

        let clock = Arc::new(ManualClock::new(at(T0)));
        let payments = Arc::new(MockPaymentGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());

        let state = Arc::new(assemble_state(
            &config,
            Repositories::sqlite(pool.clone()),
            Collaborators {
                payments: payments.clone(),
                notifier: notifier.clone(),
                codes: Arc::new(FixedCodeGenerator("123456")),
                clock: clock.clone(),
            },
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            clock,
            payments,
            notifier,
        }
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Court open 08:00-22:00 on a one hour grid, R$ 120/h.
    pub async fn seed_court(&self, requires_upfront_payment: bool) -> Court {
        self.seed_court_with(SlotDuration::Min60, requires_upfront_payment).await
    }

    pub async fn seed_court_with(&self, slot_duration: SlotDuration, requires_upfront_payment: bool) -> Court {
        let court = Court::new(NewCourtParams {
            arena_id: "arena-1".to_string(),
            name: "Quadra 1".to_string(),
            opens_at: time("08:00"),
            closes_at: time("22:00"),
            slot_duration,
            hourly_rate_cents: 12_000,
            requires_upfront_payment,
        }, self.clock.now());
        self.state.court_repo.create(&court).await.unwrap()
    }

    pub fn sweeper(&self) -> ExpirationSweeper {
        ExpirationSweeper::new(
            self.state.booking_repo.clone(),
            self.state.booking_service.clone(),
            self.clock.clone(),
            Duration::from_secs(300),
        )
    }

    pub async fn request(&self, method: &str, uri: &str, athlete: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(athlete) = athlete {
            builder = builder.header("X-Athlete-Id", athlete);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

pub fn athlete_request(court: &Court, day: &str, slots: &[&str], athlete_id: &str) -> BookingRequest {
    BookingRequest {
        court_id: court.id.clone(),
        date: date(day),
        slots: slots.iter().map(|s| time(s)).collect(),
        sport: SportType::BeachTennis,
        origin: BookingOrigin::Athlete,
        athlete_id: Some(athlete_id.to_string()),
        guest_name: None,
        guest_phone: None,
        is_public: false,
        players_needed: 0,
    }
}

pub fn open_game_request(court: &Court, day: &str, slots: &[&str], athlete_id: &str, players_needed: i32) -> BookingRequest {
    BookingRequest {
        is_public: true,
        players_needed,
        ..athlete_request(court, day, slots, athlete_id)
    }
}

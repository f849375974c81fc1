use std::sync::Arc;
use std::time::Duration;
use serde::Serialize;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, info_span, warn, Instrument};
use crate::domain::ports::{BookingRepository, Clock};
use crate::domain::services::booking_service::BookingService;
use crate::state::AppState;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub examined: usize,
    pub expired: usize,
    pub failed: usize,
}

/// Cancels bookings whose payment window ran out without a confirmation.
pub struct ExpirationSweeper {
    bookings: Arc<dyn BookingRepository>,
    booking_service: Arc<BookingService>,
    clock: Arc<dyn Clock>,
    period: Duration,
}

impl ExpirationSweeper {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        booking_service: Arc<BookingService>,
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> Self {
        Self { bookings, booking_service, clock, period }
    }

    pub async fn run_once(&self) -> SweepReport {
        let now = self.clock.now();
        let cutoff = now - self.booking_service.settings().payment_window;
        let mut report = SweepReport::default();

        let overdue = match self.bookings.find_awaiting_payment_before(cutoff).await {
            Ok(bookings) => bookings,
            Err(e) => {
                error!("Failed to load bookings awaiting payment: {:?}", e);
                return report;
            }
        };

        for booking in overdue {
            report.examined += 1;
            match self.booking_service.expire_if_overdue(&booking.id, now).await {
                Ok(_) => report.expired += 1,
                Err(e) => {
                    // Usually a confirmation that landed between the query and the update.
                    warn!(booking_id = %booking.id, "Skipping booking during sweep: {}", e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    pub async fn run(self) {
        info!(period_secs = self.period.as_secs(), "Starting expiration sweeper...");
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let span = info_span!("expiration_sweep", at = %self.clock.now());
            let report = self.run_once().instrument(span).await;
            if report.examined > 0 {
                info!(
                    examined = report.examined,
                    expired = report.expired,
                    failed = report.failed,
                    "Expiration sweep finished"
                );
            }
        }
    }
}

pub fn start_expiration_sweeper(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let sweeper = ExpirationSweeper::new(
        state.booking_repo.clone(),
        state.booking_service.clone(),
        state.clock.clone(),
        Duration::from_secs(state.config.sweep_interval_secs),
    );
    tokio::spawn(sweeper.run())
}

use std::sync::Arc;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tokio::time::timeout;
use tracing::{error, info, warn};
use crate::domain::models::booking::{
    compute_display_status, Booking, BookingFilter, BookingOrigin, BookingRequest, BookingStatus,
    BookingView, NewBookingParams, Transition,
};
use crate::domain::models::court::Court;
use crate::domain::models::slot::Slot;
use crate::domain::ports::{
    BookingObserver, BookingRepository, Clock, CourtRepository, Notifier, PaymentGateway,
    Recipient, VerificationCodeGenerator,
};
use crate::domain::services::locks::KeyedLocks;
use crate::domain::services::slot_calendar::{available_slots, ensure_free, resolve_range, slot_key};
use crate::error::AppError;

#[derive(Clone)]
pub struct BookingSettings {
    pub payment_window: Duration,
    pub timezone: Tz,
    /// Bound on each payment or notification call.
    pub outbound_timeout: std::time::Duration,
}

pub struct BookingServiceDeps {
    pub courts: Arc<dyn CourtRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub payments: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn Notifier>,
    pub codes: Arc<dyn VerificationCodeGenerator>,
    pub clock: Arc<dyn Clock>,
    pub locks: Arc<KeyedLocks>,
    pub observers: Vec<Arc<dyn BookingObserver>>,
}

/// Owns every status change a booking can go through.
pub struct BookingService {
    courts: Arc<dyn CourtRepository>,
    bookings: Arc<dyn BookingRepository>,
    payments: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
    codes: Arc<dyn VerificationCodeGenerator>,
    clock: Arc<dyn Clock>,
    locks: Arc<KeyedLocks>,
    observers: Vec<Arc<dyn BookingObserver>>,
    settings: BookingSettings,
}

impl BookingService {
    pub fn new(deps: BookingServiceDeps, settings: BookingSettings) -> Self {
        Self {
            courts: deps.courts,
            bookings: deps.bookings,
            payments: deps.payments,
            notifier: deps.notifier,
            codes: deps.codes,
            clock: deps.clock,
            locks: deps.locks,
            observers: deps.observers,
            settings,
        }
    }

    pub fn settings(&self) -> &BookingSettings {
        &self.settings
    }

    pub async fn find_court(&self, court_id: &str) -> Result<Court, AppError> {
        self.courts.find_by_id(court_id).await?
            .ok_or(AppError::NotFound(format!("Court {} not found", court_id)))
    }

    async fn find_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.bookings.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound(format!("Booking {} not found", booking_id)))
    }

    /// Validates a request against the court grid and builds the booking without persisting it.
    pub fn prepare(&self, court: &Court, request: &BookingRequest, series_id: Option<String>, now: DateTime<Utc>) -> Result<Booking, AppError> {
        if request.court_id != court.id {
            return Err(AppError::Validation("Booking request does not match the court".into()));
        }
        if request.athlete_id.is_none() && request.guest_name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(AppError::Validation("Guest bookings need a guest name".into()));
        }
        if request.is_public {
            if request.athlete_id.is_none() {
                return Err(AppError::Validation("Only athlete bookings can be opened to other players".into()));
            }
            if request.players_needed < 1 {
                return Err(AppError::Validation("Public bookings must ask for at least one player".into()));
            }
        }

        let range = resolve_range(court, &request.slots)?;

        let booking = Booking::new(NewBookingParams {
            court_id: court.id.clone(),
            date: request.date,
            range,
            sport: request.sport,
            origin: request.origin,
            athlete_id: request.athlete_id.clone(),
            guest_name: request.guest_name.clone(),
            guest_phone: request.guest_phone.clone(),
            is_public: request.is_public,
            players_needed: request.players_needed,
            series_id,
        }, now);

        let starts_at = booking.starts_at(&self.settings.timezone)
            .ok_or(AppError::InvalidSlotRange("Requested time does not exist in the court timezone".into()))?;
        if starts_at <= now {
            return Err(AppError::Validation("Cannot book in the past".into()));
        }

        Ok(booking)
    }

    pub async fn create(&self, request: BookingRequest) -> Result<Booking, AppError> {
        let court = self.find_court(&request.court_id).await?;
        let now = self.clock.now();
        let mut booking = self.prepare(&court, &request, None, now)?;
        let range = booking.range();

        if booking.athlete_id.is_none() {
            booking.verification_code = Some(self.codes.generate());
        }

        // Fail fast before talking to the payment provider.
        let existing = self.bookings.load_for_court_date(&court.id, booking.date).await?;
        ensure_free(&existing, &court.id, booking.date, &range)?;

        let payment_required = booking.origin == BookingOrigin::Athlete && court.requires_upfront_payment;
        if payment_required {
            let amount = court.price_cents(range.minutes());
            let intent = timeout(self.settings.outbound_timeout, self.payments.create_payment_intent(&booking, amount))
                .await
                .map_err(|_| AppError::Gateway(format!(
                    "Payment gateway did not answer within {} ms", self.settings.outbound_timeout.as_millis()
                )))??;
            booking.status = BookingStatus::AwaitingPayment;
            booking.payment_reference = Some(intent.intent_id);
            booking.payment_qr_payload = Some(intent.qr_payload);
            booking.payment_deadline = Some(booking.created_at + self.settings.payment_window);
        }

        {
            let _guard = self.locks.lock(&slot_key(&court.id, booking.date)).await;
            let existing = self.bookings.load_for_court_date(&court.id, booking.date).await?;
            if let Err(conflict) = ensure_free(&existing, &court.id, booking.date, &range) {
                if let Some(reference) = &booking.payment_reference {
                    warn!("Slot taken while payment intent {} was being created; intent left to expire", reference);
                }
                return Err(conflict);
            }
            self.bookings.insert_all(std::slice::from_ref(&booking)).await?;
        }

        info!(
            booking_id = %booking.id,
            court_id = %booking.court_id,
            status = booking.status.as_str(),
            "Booking created for {} {}-{}", booking.date, booking.start_time.format("%H:%M"), booking.end_time.format("%H:%M")
        );

        let message = match booking.status {
            BookingStatus::AwaitingPayment => format!(
                "Booking on {} at {} is reserved. Complete the payment within {} minutes.",
                booking.date, booking.start_time.format("%H:%M"), self.settings.payment_window.num_minutes()
            ),
            _ => match &booking.verification_code {
                Some(code) => format!(
                    "Booking confirmed on {} at {}. Check-in code: {}",
                    booking.date, booking.start_time.format("%H:%M"), code
                ),
                None => format!("Booking confirmed on {} at {}.", booking.date, booking.start_time.format("%H:%M")),
            },
        };
        self.notify_quietly(&booking, &message).await;

        Ok(booking)
    }

    pub async fn confirm_payment(&self, booking_id: &str) -> Result<Booking, AppError> {
        let booking = self.find_booking(booking_id).await?;

        match booking.status {
            BookingStatus::AwaitingPayment => {
                match self.apply(&booking, Transition::ConfirmPayment).await? {
                    Some(updated) => {
                        info!(booking_id = %updated.id, "Payment confirmed");
                        self.notify_quietly(&updated, &format!(
                            "Payment received. Booking on {} at {} is confirmed.",
                            updated.date, updated.start_time.format("%H:%M")
                        )).await;
                        Ok(updated)
                    }
                    None => {
                        let current = self.find_booking(booking_id).await?;
                        self.settle_repeated_confirmation(current)
                    }
                }
            }
            _ => self.settle_repeated_confirmation(booking),
        }
    }

    pub async fn confirm_payment_by_reference(&self, reference: &str) -> Result<Booking, AppError> {
        let booking = self.bookings.find_by_payment_reference(reference).await?
            .ok_or(AppError::NotFound(format!("No booking for payment {}", reference)))?;
        self.confirm_payment(&booking.id).await
    }

    fn settle_repeated_confirmation(&self, booking: Booking) -> Result<Booking, AppError> {
        match booking.status {
            BookingStatus::Cancelled => {
                warn!(
                    booking_id = %booking.id,
                    payment_reference = ?booking.payment_reference,
                    "Payment confirmed for a cancelled booking; refund required"
                );
                Err(AppError::LatePayment { booking_id: booking.id })
            }
            BookingStatus::AwaitingPayment => Err(AppError::IllegalTransition(format!(
                "Booking {} changed state during confirmation", booking.id
            ))),
            _ => {
                info!(booking_id = %booking.id, "Payment already confirmed; nothing to do");
                Ok(booking)
            }
        }
    }

    pub async fn mark_status(&self, booking_id: &str, target: BookingStatus) -> Result<Booking, AppError> {
        let booking = self.find_booking(booking_id).await?;

        if booking.status.next(Transition::Mark(target)).is_none() {
            return Err(AppError::IllegalTransition(format!(
                "Cannot mark booking {} as {} from {}", booking.id, target.as_str(), booking.status.as_str()
            )));
        }

        let updated = self.apply(&booking, Transition::Mark(target)).await?
            .ok_or_else(|| AppError::IllegalTransition(format!(
                "Booking {} changed state before it could be marked {}", booking.id, target.as_str()
            )))?;

        info!(booking_id = %updated.id, status = updated.status.as_str(), "Booking status updated");
        if updated.status == BookingStatus::Cancelled {
            self.notify_quietly(&updated, &format!(
                "Your booking on {} at {} was cancelled.", updated.date, updated.start_time.format("%H:%M")
            )).await;
        }
        Ok(updated)
    }

    /// Cancels an unpaid booking once `now` is strictly past its payment window.
    pub async fn expire_if_overdue(&self, booking_id: &str, now: DateTime<Utc>) -> Result<Booking, AppError> {
        let booking = self.find_booking(booking_id).await?;

        if booking.status != BookingStatus::AwaitingPayment {
            return Err(AppError::IllegalTransition(format!(
                "Booking {} is {} and cannot expire", booking.id, booking.status.as_str()
            )));
        }
        if now - booking.created_at <= self.settings.payment_window {
            return Err(AppError::IllegalTransition(format!(
                "Payment window for booking {} is still open", booking.id
            )));
        }

        let updated = self.apply(&booking, Transition::Expire).await?
            .ok_or_else(|| AppError::IllegalTransition(format!(
                "Booking {} left AGUARDANDO_PAGAMENTO before it could expire", booking.id
            )))?;

        info!(booking_id = %updated.id, "Unpaid booking expired; slot released");
        self.notify_quietly(&updated, &format!(
            "Your booking on {} at {} was released because the payment did not arrive in time.",
            updated.date, updated.start_time.format("%H:%M")
        )).await;
        Ok(updated)
    }

    async fn apply(&self, booking: &Booking, transition: Transition) -> Result<Option<Booking>, AppError> {
        let to = booking.status.next(transition).ok_or_else(|| AppError::IllegalTransition(format!(
            "{:?} is not allowed from {}", transition, booking.status.as_str()
        )))?;

        let updated = self.bookings.transition(&booking.id, booking.status, to, self.clock.now()).await?;
        if let Some(ref changed) = updated {
            self.publish(changed, booking.status).await;
        }
        Ok(updated)
    }

    async fn publish(&self, booking: &Booking, from: BookingStatus) {
        for observer in &self.observers {
            if let Err(e) = observer.on_transition(booking, from).await {
                error!(booking_id = %booking.id, "Booking observer failed: {:?}", e);
            }
        }
    }

    async fn notify_quietly(&self, booking: &Booking, message: &str) {
        let recipient = match (&booking.athlete_id, &booking.guest_phone) {
            (Some(athlete_id), _) => Recipient::Push(athlete_id.clone()),
            (None, Some(phone)) => Recipient::Sms(phone.clone()),
            (None, None) => return,
        };
        match timeout(self.settings.outbound_timeout, self.notifier.notify(&recipient, message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(booking_id = %booking.id, "Notification failed: {}", e),
            Err(_) => warn!(booking_id = %booking.id, "Notification timed out; skipped"),
        }
    }

    pub fn view(&self, booking: Booking, now: DateTime<Utc>) -> BookingView {
        let display_status = match booking.ends_at(&self.settings.timezone) {
            Some(end) => compute_display_status(booking.status, end, now),
            None => compute_display_status(booking.status, now, now),
        };
        BookingView { booking, display_status }
    }

    pub async fn get(&self, booking_id: &str) -> Result<BookingView, AppError> {
        let booking = self.find_booking(booking_id).await?;
        Ok(self.view(booking, self.clock.now()))
    }

    pub async fn search(&self, filter: &BookingFilter) -> Result<Vec<BookingView>, AppError> {
        let now = self.clock.now();
        let bookings = self.bookings.search(filter).await?;
        Ok(bookings.into_iter().map(|b| self.view(b, now)).collect())
    }

    pub async fn availability(&self, court_id: &str, date: NaiveDate) -> Result<Vec<Slot>, AppError> {
        let court = self.find_court(court_id).await?;
        let existing = self.bookings.load_for_court_date(court_id, date).await?;
        Ok(available_slots(&court, date, &existing))
    }
}

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, warn};
use crate::domain::models::booking::{Booking, BookingStatus};
use crate::domain::models::join_request::{JoinRequest, JoinRequestStatus};
use crate::domain::ports::{BookingObserver, BookingRepository, Clock, JoinRequestRepository, Notifier, Recipient};
use crate::domain::services::locks::KeyedLocks;
use crate::error::AppError;

fn booking_key(booking_id: &str) -> String {
    format!("booking:{}", booking_id)
}

pub struct OpenGameCoordinator {
    bookings: Arc<dyn BookingRepository>,
    requests: Arc<dyn JoinRequestRepository>,
    notifier: Arc<dyn Notifier>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
    notify_timeout: Duration,
}

impl OpenGameCoordinator {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        requests: Arc<dyn JoinRequestRepository>,
        notifier: Arc<dyn Notifier>,
        locks: Arc<KeyedLocks>,
        clock: Arc<dyn Clock>,
        notify_timeout: Duration,
    ) -> Self {
        Self { bookings, requests, notifier, locks, clock, notify_timeout }
    }

    async fn find_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.bookings.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound(format!("Booking {} not found", booking_id)))
    }

    /// Re-reads the booking while its lock is held. Cancellation cleanup takes the same lock.
    async fn ensure_not_cancelled(&self, booking_id: &str) -> Result<(), AppError> {
        let current = self.find_booking(booking_id).await?;
        if current.status == BookingStatus::Cancelled {
            return Err(AppError::IllegalTransition(format!("Booking {} is cancelled", current.id)));
        }
        Ok(())
    }

    pub async fn request_to_join(&self, booking_id: &str, athlete_id: &str) -> Result<JoinRequest, AppError> {
        let booking = self.find_booking(booking_id).await?;

        if !booking.is_public {
            return Err(AppError::NotPublic(booking.id));
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(AppError::IllegalTransition(format!("Booking {} is cancelled", booking.id)));
        }
        if booking.athlete_id.as_deref() == Some(athlete_id) {
            return Err(AppError::Validation("The booking owner is already part of the game".into()));
        }

        let created = {
            let _guard = self.locks.lock(&booking_key(&booking.id)).await;
            self.ensure_not_cancelled(&booking.id).await?;

            if self.requests.find_active_for_athlete(&booking.id, athlete_id).await?.is_some() {
                return Err(AppError::DuplicateRequest(booking.id));
            }
            let accepted = self.requests.count_accepted(&booking.id).await?;
            if accepted >= booking.players_needed as i64 {
                return Err(AppError::CapacityExceeded(booking.id));
            }

            let request = JoinRequest::new(booking.id.clone(), athlete_id.to_string(), self.clock.now());
            self.requests.create(&request).await?
        };

        info!(request_id = %created.id, booking_id = %booking.id, athlete_id = %athlete_id, "Join request created");
        if let Some(owner) = &booking.athlete_id {
            self.notify_quietly(Recipient::Push(owner.clone()), &format!(
                "A player asked to join your game on {} at {}.", booking.date, booking.start_time.format("%H:%M")
            )).await;
        }
        Ok(created)
    }

    /// Accepts or rejects a pending request. Only the booking owner may do this.
    pub async fn resolve_request(&self, request_id: &str, actor_id: &str, accept: bool) -> Result<JoinRequest, AppError> {
        let request = self.requests.find_by_id(request_id).await?
            .ok_or(AppError::NotFound(format!("Join request {} not found", request_id)))?;
        let booking = self.find_booking(&request.booking_id).await?;

        if booking.athlete_id.as_deref() != Some(actor_id) {
            return Err(AppError::Forbidden("Only the booking owner can resolve join requests".into()));
        }

        let target = if accept { JoinRequestStatus::Accepted } else { JoinRequestStatus::Rejected };
        if request.status == target {
            return Ok(request);
        }
        if request.status != JoinRequestStatus::Pending {
            return Err(AppError::AlreadyResolved(request.id));
        }
        if accept && booking.status == BookingStatus::Cancelled {
            return Err(AppError::IllegalTransition(format!("Booking {} is cancelled", booking.id)));
        }

        let resolved = {
            let _guard = self.locks.lock(&booking_key(&booking.id)).await;
            if accept {
                self.ensure_not_cancelled(&booking.id).await?;
            }
            let capacity = if accept { Some(booking.players_needed) } else { None };

            match self.requests.resolve(&request.id, target, capacity, self.clock.now()).await? {
                Some(resolved) => resolved,
                None => {
                    let current = self.requests.find_by_id(&request.id).await?
                        .ok_or(AppError::NotFound(format!("Join request {} not found", request.id)))?;
                    if current.status == target {
                        return Ok(current);
                    }
                    if current.status != JoinRequestStatus::Pending {
                        return Err(AppError::AlreadyResolved(current.id));
                    }
                    return Err(AppError::CapacityExceeded(booking.id));
                }
            }
        };

        info!(request_id = %resolved.id, booking_id = %booking.id, status = resolved.status.as_str(), "Join request resolved");
        let message = if accept {
            format!("You're in! Game on {} at {}.", booking.date, booking.start_time.format("%H:%M"))
        } else {
            format!("Your request to join the game on {} was declined.", booking.date)
        };
        self.notify_quietly(Recipient::Push(resolved.athlete_id.clone()), &message).await;
        Ok(resolved)
    }

    pub async fn list_requests(&self, booking_id: &str) -> Result<Vec<JoinRequest>, AppError> {
        let booking = self.find_booking(booking_id).await?;
        self.requests.list_by_booking(&booking.id).await
    }

    async fn notify_quietly(&self, recipient: Recipient, message: &str) {
        match timeout(self.notify_timeout, self.notifier.notify(&recipient, message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Notification failed: {}", e),
            Err(_) => warn!("Notification timed out; skipped"),
        }
    }
}

/// Closes out pending join requests when their booking is cancelled.
pub struct JoinRequestCleanup {
    requests: Arc<dyn JoinRequestRepository>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
}

impl JoinRequestCleanup {
    pub fn new(requests: Arc<dyn JoinRequestRepository>, locks: Arc<KeyedLocks>, clock: Arc<dyn Clock>) -> Self {
        Self { requests, locks, clock }
    }
}

#[async_trait]
impl BookingObserver for JoinRequestCleanup {
    async fn on_transition(&self, booking: &Booking, _from: BookingStatus) -> Result<(), AppError> {
        if booking.status != BookingStatus::Cancelled || !booking.is_public {
            return Ok(());
        }
        let _guard = self.locks.lock(&booking_key(&booking.id)).await;
        let rejected = self.requests.reject_pending_for_booking(&booking.id, self.clock.now()).await?;
        if rejected > 0 {
            info!(booking_id = %booking.id, rejected, "Pending join requests closed after cancellation");
        }
        Ok(())
    }
}

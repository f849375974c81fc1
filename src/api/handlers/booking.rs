use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::athlete::MaybeAthlete;
use crate::api::dtos::requests::{parse_date, parse_time, CreateBookingRequest, MarkStatusRequest};
use crate::domain::models::booking::{BookingFilter, BookingOrigin, BookingRequest};
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    MaybeAthlete(athlete_id): MaybeAthlete,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&payload.date)?;
    let slots = payload.slots.iter()
        .map(|s| parse_time(s))
        .collect::<Result<Vec<_>, _>>()?;

    let origin = match (payload.origin, &athlete_id) {
        (Some(BookingOrigin::Athlete), None) => {
            return Err(AppError::Validation("Athlete bookings need an authenticated athlete".into()));
        }
        (Some(origin), _) => origin,
        (None, Some(_)) => BookingOrigin::Athlete,
        (None, None) => BookingOrigin::Arena,
    };

    let booking = state.booking_service.create(BookingRequest {
        court_id: payload.court_id,
        date,
        slots,
        sport: payload.sport,
        origin,
        athlete_id,
        guest_name: payload.guest_name,
        guest_phone: payload.guest_phone,
        is_public: payload.is_public.unwrap_or(false),
        players_needed: payload.players_needed.unwrap_or(0),
    }).await?;

    let view = state.booking_service.view(booking, state.clock.now());
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<BookingFilter>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_service.search(&filter).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = state.booking_service.get(&booking_id).await?;
    Ok(Json(view))
}

pub async fn mark_status(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    Json(payload): Json<MarkStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.booking_service.mark_status(&booking_id, payload.status).await?;
    Ok(Json(state.booking_service.view(booking, state.clock.now())))
}

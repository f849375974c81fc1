use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::dtos::requests::{parse_date, parse_time, AvailabilityQuery, CreateCourtRequest};
use crate::api::dtos::responses::AvailabilityResponse;
use crate::domain::models::court::{Court, NewCourtParams};
use crate::domain::models::slot::SlotDuration;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_court(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCourtRequest>,
) -> Result<impl IntoResponse, AppError> {
    let opens_at = parse_time(&payload.opens_at)?;
    let closes_at = parse_time(&payload.closes_at)?;
    if closes_at <= opens_at {
        return Err(AppError::Validation("Court must close after it opens".into()));
    }
    let slot_duration = SlotDuration::try_from(payload.slot_duration_min).map_err(AppError::Validation)?;
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("Court name is required".into()));
    }

    let court = Court::new(NewCourtParams {
        arena_id: payload.arena_id,
        name: payload.name,
        opens_at,
        closes_at,
        slot_duration,
        hourly_rate_cents: payload.hourly_rate_cents.unwrap_or(0).max(0),
        requires_upfront_payment: payload.requires_upfront_payment.unwrap_or(false),
    }, state.clock.now());

    let created = state.court_repo.create(&court).await?;
    info!(court_id = %created.id, arena_id = %created.arena_id, "Court created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(court_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let date = parse_date(&query.date)?;
    let slots = state.booking_service.availability(&court_id, date).await?;
    Ok(Json(AvailabilityResponse { court_id, date, slots }))
}

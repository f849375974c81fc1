use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::athlete::ActingAthlete;
use crate::api::dtos::requests::{parse_date, parse_time, CreateSeriesRequest, SeriesModeQuery};
use crate::domain::models::series::{weekday_from_number, SeriesRequest};
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_series(
    State(state): State<Arc<AppState>>,
    ActingAthlete(athlete_id): ActingAthlete,
    Query(query): Query<SeriesModeQuery>,
    Json(payload): Json<CreateSeriesRequest>,
) -> Result<impl IntoResponse, AppError> {
    let weekday = weekday_from_number(payload.weekday)
        .ok_or(AppError::Validation(format!("Invalid weekday {} (1 = Monday .. 7 = Sunday)", payload.weekday)))?;

    let created = state.planner.create_series(SeriesRequest {
        athlete_id,
        court_id: payload.court_id,
        weekday,
        start_time: parse_time(&payload.start_time)?,
        slot_count: payload.slot_count.unwrap_or(1),
        sport: payload.sport,
        period: payload.period,
        start_date: parse_date(&payload.start_date)?,
        end_date: parse_date(&payload.end_date)?,
        is_public: payload.is_public.unwrap_or(false),
        players_needed: payload.players_needed.unwrap_or(0),
    }, query.mode.unwrap_or_default()).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state.planner.get_series(&series_id).await?;
    Ok(Json(detail))
}

pub async fn cancel_series(
    State(state): State<Arc<AppState>>,
    ActingAthlete(athlete_id): ActingAthlete,
    Path(series_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state.planner.cancel_series(&series_id, &athlete_id).await?;
    Ok(Json(detail))
}

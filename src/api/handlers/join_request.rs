use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::athlete::ActingAthlete;
use crate::api::dtos::requests::ResolveJoinRequest;
use crate::error::AppError;
use std::sync::Arc;

pub async fn request_to_join(
    State(state): State<Arc<AppState>>,
    ActingAthlete(athlete_id): ActingAthlete,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let request = state.open_games.request_to_join(&booking_id, &athlete_id).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_join_requests(
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let requests = state.open_games.list_requests(&booking_id).await?;
    Ok(Json(requests))
}

pub async fn resolve_join_request(
    State(state): State<Arc<AppState>>,
    ActingAthlete(athlete_id): ActingAthlete,
    Path(request_id): Path<String>,
    Json(payload): Json<ResolveJoinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = state.open_games.resolve_request(&request_id, &athlete_id, payload.accept).await?;
    Ok(Json(resolved))
}

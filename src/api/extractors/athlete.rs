use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tracing::Span;

/// Header set by the upstream gateway after it authenticated the athlete.
pub const ATHLETE_HEADER: &str = "x-athlete-id";

fn read_athlete(parts: &Parts) -> Result<Option<String>, StatusCode> {
    let Some(value) = parts.headers.get(ATHLETE_HEADER) else {
        return Ok(None);
    };
    let id = value.to_str().map_err(|_| StatusCode::BAD_REQUEST)?.trim();
    if id.is_empty() {
        return Ok(None);
    }
    Span::current().record("athlete_id", id);
    Ok(Some(id.to_string()))
}

pub struct ActingAthlete(pub String);

impl<S> FromRequestParts<S> for ActingAthlete
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        read_athlete(parts)?
            .map(ActingAthlete)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}

/// Arena staff and front-desk calls arrive without an athlete.
pub struct MaybeAthlete(pub Option<String>);

impl<S> FromRequestParts<S> for MaybeAthlete
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAthlete(read_athlete(parts)?))
    }
}

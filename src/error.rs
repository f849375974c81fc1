use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Slot conflict: {0}")]
    SlotConflict(String),
    #[error("Invalid slot range: {0}")]
    InvalidSlotRange(String),
    #[error("Illegal transition: {0}")]
    IllegalTransition(String),
    #[error("Booking {0} is not open to join requests")]
    NotPublic(String),
    #[error("Booking {0} has no free player spots")]
    CapacityExceeded(String),
    #[error("Athlete already has an open request for booking {0}")]
    DuplicateRequest(String),
    #[error("Join request {0} was already resolved")]
    AlreadyResolved(String),
    #[error("Payment for booking {booking_id} arrived after cancellation")]
    LatePayment { booking_id: String },
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SlotConflict(_) => "SLOT_CONFLICT",
            AppError::InvalidSlotRange(_) => "INVALID_SLOT_RANGE",
            AppError::IllegalTransition(_) => "ILLEGAL_TRANSITION",
            AppError::NotPublic(_) => "NOT_PUBLIC",
            AppError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            AppError::DuplicateRequest(_) => "DUPLICATE_REQUEST",
            AppError::AlreadyResolved(_) => "ALREADY_RESOLVED",
            AppError::LatePayment { .. } => "LATE_PAYMENT",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::Validation(_) => "VALIDATION",
            AppError::Gateway(_) => "GATEWAY",
            AppError::InternalWithMsg(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    let db_code = db_err.code().unwrap_or_default();

                    // 2067 = SQLite Unique Constraint
                    // 23505 = PostgreSQL Unique Violation
                    if db_code == "2067" || db_code == "23505" {
                        return (
                            StatusCode::CONFLICT,
                            Json(json!({ "error": "Resource already exists (duplicate entry)", "code": "DUPLICATE" }))
                        ).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::SlotConflict(_)
            | AppError::IllegalTransition(_)
            | AppError::CapacityExceeded(_)
            | AppError::DuplicateRequest(_)
            | AppError::AlreadyResolved(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::LatePayment { booking_id } => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({
                        "error": self.to_string(),
                        "code": code,
                        "booking_id": booking_id,
                        "refund_eligible": true
                    }))
                ).into_response();
            }
            AppError::InvalidSlotRange(_) | AppError::NotPublic(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Gateway(msg) => {
                error!("Payment gateway error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Payment provider unavailable".to_string())
            }
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code
        }));

        (status, body).into_response()
    }
}

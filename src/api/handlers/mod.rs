pub mod booking;
pub mod court;
pub mod health;
pub mod join_request;
pub mod payment_webhook;
pub mod series;

pub mod booking;
pub mod court;
pub mod join_request;
pub mod series;
pub mod slot;

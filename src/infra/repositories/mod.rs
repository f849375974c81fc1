pub mod rows;

pub mod sqlite_court_repo;
pub mod sqlite_booking_repo;
pub mod sqlite_series_repo;
pub mod sqlite_join_request_repo;

pub mod postgres_court_repo;
pub mod postgres_booking_repo;
pub mod postgres_series_repo;
pub mod postgres_join_request_repo;

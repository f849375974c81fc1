use std::sync::Arc;
use crate::domain::ports::{
    BookingRepository, Clock, CourtRepository, JoinRequestRepository, SeriesRepository,
};
use crate::domain::services::booking_service::BookingService;
use crate::domain::services::open_game::OpenGameCoordinator;
use crate::domain::services::recurring_planner::RecurringPlanner;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub court_repo: Arc<dyn CourtRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub series_repo: Arc<dyn SeriesRepository>,
    pub join_request_repo: Arc<dyn JoinRequestRepository>,
    pub booking_service: Arc<BookingService>,
    pub planner: Arc<RecurringPlanner>,
    pub open_games: Arc<OpenGameCoordinator>,
    pub clock: Arc<dyn Clock>,
}

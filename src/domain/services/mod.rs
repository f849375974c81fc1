pub mod booking_service;
pub mod locks;
pub mod open_game;
pub mod recurring_planner;
pub mod slot_calendar;

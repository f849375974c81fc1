pub mod factory;
pub mod payment;
pub mod repositories;
pub mod sms;
pub mod system;

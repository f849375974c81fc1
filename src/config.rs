use chrono_tz::Tz;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub timezone: Tz,
    pub payment_window_minutes: i64,
    pub sweep_interval_secs: u64,
    /// Upper bound for any call to the payment or messaging service.
    pub outbound_timeout_ms: u64,
    pub payment_service_url: String,
    pub payment_service_token: String,
    pub sms_service_url: String,
    pub sms_service_token: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            timezone: env::var("TIMEZONE").unwrap_or_else(|_| "America/Sao_Paulo".to_string()).parse().expect("TIMEZONE must be an IANA zone name"),
            payment_window_minutes: env::var("PAYMENT_WINDOW_MINUTES").unwrap_or_else(|_| "10".to_string()).parse().expect("PAYMENT_WINDOW_MINUTES must be a number"),
            sweep_interval_secs: env::var("SWEEP_INTERVAL_SECONDS").unwrap_or_else(|_| "300".to_string()).parse().expect("SWEEP_INTERVAL_SECONDS must be a number"),
            outbound_timeout_ms: env::var("OUTBOUND_TIMEOUT_MS").unwrap_or_else(|_| "10000".to_string()).parse().expect("OUTBOUND_TIMEOUT_MS must be a number"),
            payment_service_url: env::var("PAYMENT_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1".to_string()),
            payment_service_token: env::var("PAYMENT_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            sms_service_url: env::var("SMS_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8200/api/v1/send".to_string()),
            sms_service_token: env::var("SMS_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
        }
    }
}

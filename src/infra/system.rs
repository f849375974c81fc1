use chrono::{DateTime, Utc};
use rand::Rng;
use crate::domain::ports::{Clock, VerificationCodeGenerator};

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Six digit check-in code handed to guests at the front desk.
pub struct RandomCodeGenerator;

impl VerificationCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
    }
}

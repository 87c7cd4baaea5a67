use chrono::{Duration, Utc};
use mongodb::bson::DateTime;
use uuid::Uuid;

pub const OTP_DIGITS: usize = 6;

/// Six random decimal digits, zero padded.
pub fn generate_otp() -> String {
    let n = Uuid::new_v4().as_u128() % 10u128.pow(OTP_DIGITS as u32);
    format!("{:0width$}", n, width = OTP_DIGITS)
}

pub fn expiry_after(minutes: i64) -> DateTime {
    DateTime::from_millis((Utc::now() + Duration::minutes(minutes)).timestamp_millis())
}

pub fn is_expired(expiry: DateTime) -> bool {
    expiry.timestamp_millis() < Utc::now().timestamp_millis()
}

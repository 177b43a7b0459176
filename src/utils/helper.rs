use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in milliseconds since epoch
pub fn current_timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn round_rate(value: f64) -> f64 {
    round_to(value, 6)
}

pub fn round_notional(value: f64) -> f64 {
    round_to(value, 2)
}

/// Parse a decimal string field as returned by most exchange REST APIs
pub fn parse_decimal(field: &str, value: &str) -> crate::error::Result<f64> {
    value.trim().parse::<f64>()
        .map_err(|_| crate::error::Error::DecodeError(format!("{}: not a number: {:?}", field, value)))
}

use chrono::{DateTime, SecondsFormat, Utc};

/// Current wall-clock instant in UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Text form of an instant as fed into hash generation (nanosecond precision)
pub fn hash_timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Human readable form used in CLI output
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}

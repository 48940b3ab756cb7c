use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Wall-clock layout accepted by the bridge, e.g. `March 5, 2024 at 2:30PM`.
pub const TIMESTAMP_LAYOUT: &str = "%B %e, %Y at %I:%M%p";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimestampError {
    #[error("timestamp does not match the expected layout: {0}")]
    Format(#[from] chrono::ParseError),
    #[error("wall-clock time does not exist in the local zone")]
    NonexistentLocalTime,
}

/// Turn a wall-clock string into an absolute instant in the process's
/// local zone. The input carries no zone of its own; an ambiguous wall
/// clock (clocks rolled back) resolves to the earliest instant, a
/// nonexistent one (clocks rolled forward) is an error.
pub fn normalize(text: &str) -> Result<DateTime<Local>, TimestampError> {
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_LAYOUT)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or(TimestampError::NonexistentLocalTime)
}

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::warn;

/// Naive layouts DMPonline has been seen to emit, tried in order.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-like timestamp into a timezone-naive value.
///
/// Offset-carrying timestamps (`...Z`, `...+02:00`, `... UTC`) are converted to
/// UTC before the offset is dropped. Bare dates parse as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f %z") {
        return Some(dt.naive_utc());
    }

    let naive = raw.strip_suffix(" UTC").unwrap_or(raw);
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(naive, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(naive, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse the timestamp stored under `column`, warning when it is present but
/// unreadable.
pub fn timestamp_field(value: Option<&Value>, column: &str) -> Option<NaiveDateTime> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(raw)) => {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                warn!("{} has unparseable timestamp {:?}", column, raw);
            }
            parsed
        }
        Some(other) => {
            warn!("{} is not a timestamp string: {}", column, other);
            None
        }
    }
}

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ISO_DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?$")
        .expect("Invalid ISO date pattern")
});

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Serialized form of a boolean in the module-graph dialect.
pub fn bool_to_flag(value: bool) -> Value {
    Value::String(if value { "1" } else { "0" }.to_string())
}

/// Reads a module-graph flag (`"0"`, `"1"`, `"true"`, `"false"`) back as a boolean.
pub fn flag_to_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Normalizes an ISO-8601 date-time to `YYYY-MM-DDTHH:MM:SS.mmmZ` in UTC.
///
/// Strings without a time part, and strings chrono cannot read, yield `None`.
/// A time without offset is taken as UTC.
pub fn normalize_date(text: &str) -> Option<String> {
    if !ISO_DATE_TIME.is_match(text) {
        return None;
    }

    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        dt.with_timezone(&Utc)
    } else if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(text, f).ok())
    {
        dt.with_timezone(&Utc)
    } else {
        NAIVE_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())?
            .and_utc()
    };

    Some(utc.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(
            normalize_date("2024-01-15T10:30:00Z").as_deref(),
            Some("2024-01-15T10:30:00.000Z")
        );
        assert_eq!(
            normalize_date("2024-01-15T12:30:00+02:00").as_deref(),
            Some("2024-01-15T10:30:00.000Z")
        );
        assert_eq!(
            normalize_date("2024-01-15 10:30").as_deref(),
            Some("2024-01-15T10:30:00.000Z")
        );
        assert_eq!(normalize_date("2024-01-15"), None);
        assert_eq!(normalize_date("not a date"), None);
        assert_eq!(normalize_date("2024-13-45T99:99"), None);
    }

    #[test]
    fn test_flags() {
        assert_eq!(bool_to_flag(true), Value::String("1".into()));
        assert_eq!(flag_to_bool("false"), Some(false));
        assert_eq!(flag_to_bool("yes"), None);
    }
}

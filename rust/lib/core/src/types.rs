use std::fmt;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record as returned by Directus. Fields vary per collection and are read
/// permissively; the server is the only authority on their shape.
pub type Record = serde_json::Map<String, Value>;

/// Server-assigned record identity. Directus collections use either integer
/// or string (UUID) primary keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// An id that cannot address a record (empty or whitespace-only string).
    pub fn is_blank(&self) -> bool {
        matches!(self, RecordId::Str(s) if s.trim().is_empty())
    }

    /// Read an id out of a JSON value. Numbers that are not integers and
    /// non-scalar values are not ids.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(RecordId::Int),
            Value::String(s) if !s.is_empty() => Some(RecordId::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{n}"),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Str(s)
    }
}

/// The `id` field of a record, if it holds a usable id.
pub fn record_id(record: &Record) -> Option<RecordId> {
    record.get("id").and_then(RecordId::from_value)
}

/// Read a text field. Missing, `null` and empty strings all read as `None`.
pub fn str_field<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    match record.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

/// Read a numeric field. Directus returns decimals as strings, so numeric
/// strings are accepted too.
pub fn f64_field(record: &Record, name: &str) -> Option<f64> {
    match record.get(name) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the date and datetime shapes Directus emits:
/// `2024-05-01`, `2024-05-01T08:30:00`, `2024-05-01T08:30:00.123` and RFC 3339
/// with an offset. Offset timestamps are converted to local wall time, the
/// frame `Local::now()` windows are built in.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Midnight at the start of the day `days` days before `now`.
pub fn days_ago_midnight(now: NaiveDateTime, days: i64) -> NaiveDateTime {
    (now.date() - Duration::days(days)).and_time(NaiveTime::MIN)
}

/// Current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_record_id_untagged() {
        let ids: Vec<RecordId> = serde_json::from_value(json!([7, "a1"])).unwrap();
        assert_eq!(ids, vec![RecordId::Int(7), RecordId::Str("a1".into())]);
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([7, "a1"]));
        assert_eq!(ids[0].to_string(), "7");
    }

    #[test]
    fn test_blank_ids() {
        assert!(RecordId::from("  ").is_blank());
        assert!(!RecordId::from(0).is_blank());
        assert_eq!(RecordId::from_value(&json!("")), None);
        assert_eq!(RecordId::from_value(&json!(1.5)), None);
    }

    #[test]
    fn test_permissive_fields() {
        let r = record(json!({"a": "", "b": "x", "n": "12.5", "m": 3, "z": null}));
        assert_eq!(str_field(&r, "a"), None);
        assert_eq!(str_field(&r, "b"), Some("x"));
        assert_eq!(str_field(&r, "z"), None);
        assert_eq!(f64_field(&r, "n"), Some(12.5));
        assert_eq!(f64_field(&r, "m"), Some(3.0));
        assert_eq!(f64_field(&r, "b"), None);
    }

    #[test]
    fn test_parse_datetime_shapes() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_datetime("2024-05-01"), Some(day.and_time(NaiveTime::MIN)));
        assert_eq!(
            parse_datetime("2024-05-01T08:30:00").map(|d| d.date()),
            Some(day)
        );
        assert_eq!(
            parse_datetime("2024-05-01T08:30:00.250").map(|d| d.date()),
            Some(day)
        );
        assert_eq!(
            parse_datetime("2024-05-01T02:00:00+07:00"),
            parse_datetime("2024-04-30T19:00:00Z")
        );
        let instant = DateTime::parse_from_rfc3339("2024-05-01T02:00:00+07:00").unwrap();
        assert_eq!(
            parse_datetime("2024-05-01T02:00:00+07:00"),
            Some(instant.with_timezone(&Local).naive_local())
        );
        assert_eq!(parse_datetime("tomorrow"), None);
    }

    #[test]
    fn test_days_ago_midnight() {
        let now = parse_datetime("2024-03-31T15:45:00").unwrap();
        assert_eq!(
            days_ago_midnight(now, 30),
            parse_datetime("2024-03-01").unwrap()
        );
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::models::{ParseWarnings, WarningKind};

/// Outcome of reading one timestamp field from provider JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTimestamp {
    /// Field absent or `null`
    Missing,
    Parsed(DateTime<Utc>),
    /// Field present but unusable
    Malformed,
}

impl RawTimestamp {
    pub fn ok(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Parsed(dt) => Some(dt),
            _ => None,
        }
    }

    /// Resolve to an instant.
    ///
    /// Missing values take `fallback` (epoch-zero without one). Malformed
    /// values become epoch-zero and record a `TimestampParse` warning.
    pub fn resolve(
        self,
        fallback: Option<DateTime<Utc>>,
        warnings: &mut ParseWarnings,
        conversation_id: &str,
        field: &str,
    ) -> DateTime<Utc> {
        match self {
            Self::Parsed(dt) => dt,
            Self::Missing => fallback.unwrap_or(DateTime::UNIX_EPOCH),
            Self::Malformed => {
                warnings.push(
                    WarningKind::TimestampParse,
                    Some(conversation_id),
                    format!("unparseable {}, using epoch-zero", field),
                );
                DateTime::UNIX_EPOCH
            }
        }
    }
}

/// Unix seconds, as a float, integer or numeric string (ChatGPT exports).
pub fn parse_unix_seconds(value: Option<&Value>) -> RawTimestamp {
    let seconds = match value {
        None | Some(Value::Null) => return RawTimestamp::Missing,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    seconds.and_then(from_unix_seconds).map_or(RawTimestamp::Malformed, RawTimestamp::Parsed)
}

fn from_unix_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}

/// ISO-8601 / RFC3339 strings (Claude exports). Offset-less values are read as UTC.
pub fn parse_iso(value: Option<&Value>) -> RawTimestamp {
    match value {
        None | Some(Value::Null) => RawTimestamp::Missing,
        Some(Value::String(s)) => {
            parse_iso_str(s).map_or(RawTimestamp::Malformed, RawTimestamp::Parsed)
        }
        Some(_) => RawTimestamp::Malformed,
    }
}

fn parse_iso_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unix_and_iso_agree() {
        let chatgpt = parse_unix_seconds(Some(&json!(1700000000.0)));
        let claude = parse_iso(Some(&json!("2023-11-14T22:13:20Z")));
        assert_eq!(chatgpt, claude);
        assert!(chatgpt.ok().is_some());
    }

    #[test]
    fn test_unix_fractional_and_string() {
        let dt = parse_unix_seconds(Some(&json!(1700000000.5))).ok().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 500);

        let dt = parse_unix_seconds(Some(&json!("1700000000"))).ok().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_iso_variants() {
        let with_micros = parse_iso(Some(&json!("2024-03-01T10:00:00.123456+00:00"))).ok().unwrap();
        assert_eq!(with_micros.timestamp_subsec_micros(), 123_456);

        let naive = parse_iso(Some(&json!("2024-03-01T10:00:00"))).ok().unwrap();
        assert_eq!(naive.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_missing_vs_malformed() {
        assert_eq!(parse_unix_seconds(None), RawTimestamp::Missing);
        assert_eq!(parse_unix_seconds(Some(&Value::Null)), RawTimestamp::Missing);
        assert_eq!(parse_unix_seconds(Some(&json!("yesterday"))), RawTimestamp::Malformed);
        assert_eq!(parse_unix_seconds(Some(&json!([1]))), RawTimestamp::Malformed);
        assert_eq!(parse_iso(Some(&json!("not a date"))), RawTimestamp::Malformed);
        assert_eq!(parse_iso(Some(&json!(12))), RawTimestamp::Malformed);
    }

    #[test]
    fn test_resolve_records_warning_only_when_malformed() {
        let mut warnings = ParseWarnings::new();
        let fallback = parse_iso(Some(&json!("2024-01-01T00:00:00Z"))).ok();

        let missing = RawTimestamp::Missing.resolve(fallback, &mut warnings, "c1", "create_time");
        assert_eq!(Some(missing), fallback);
        assert!(warnings.is_empty());

        let bad = RawTimestamp::Malformed.resolve(fallback, &mut warnings, "c1", "create_time");
        assert_eq!(bad, DateTime::UNIX_EPOCH);
        assert_eq!(warnings.count_by_kind()["timestamp_parse"], 1);
    }
}

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// A canonical status transition extracted from a raw decoded payload.
///
/// `status` is always trimmed and upper-cased; an empty string means the
/// payload carried no recognizable status field. The event is still a
/// valid transition anchor in that case, it just maps to no bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub job_id: String,
}

/// A sensor reading extracted from a raw process-data payload.
///
/// `value` is `None` when the payload carried nothing parsable as a
/// number; such samples are no-ops downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Ordered key aliases, first present non-null wins.
const STATUS_KEYS: &[&str] = &["status", "Status", "state", "State", "event", "Event"];
const STATUS_TS_KEYS: &[&str] = &["timestamp", "Timestamp", "Time"];
const JOB_KEYS: &[&str] = &["job", "Job"];
// Process-data payloads historically put the stamp under `Time` first.
const TELEMETRY_TS_KEYS: &[&str] = &["Time", "timestamp", "Timestamp"];
const TELEMETRY_VALUE_KEYS: &[&str] = &["Filterzustand", "Filter_Status", "filterStatus"];
const TELEMETRY_NESTED_PATH: (&str, &str) = ("ProcessData", "Filterzustand");

/// Maps raw decoded payloads (arbitrary key casing and aliasing) into
/// canonical events. Pure and infallible: malformed fields degrade to
/// empty/absent values instead of erroring.
pub struct EventNormalizer;

impl EventNormalizer {
    /// Extract a [`StatusEvent`] from a raw payload map.
    ///
    /// Missing status → empty string; missing or unparsable timestamp →
    /// the current wall-clock instant.
    pub fn normalize_status(raw: &Map<String, Value>) -> StatusEvent {
        let status = first_present(raw, STATUS_KEYS)
            .map(value_to_string)
            .unwrap_or_default()
            .trim()
            .to_uppercase();

        let timestamp = first_present(raw, STATUS_TS_KEYS)
            .and_then(|v| v.as_str())
            .and_then(parse_instant)
            .unwrap_or_else(Utc::now);

        let job_id = first_present(raw, JOB_KEYS)
            .map(value_to_string)
            .unwrap_or_default()
            .trim()
            .to_string();

        StatusEvent {
            status,
            timestamp,
            job_id,
        }
    }

    /// Extract a [`TelemetrySample`] from a raw process-data payload map.
    pub fn normalize_telemetry(raw: &Map<String, Value>) -> TelemetrySample {
        let timestamp = first_present(raw, TELEMETRY_TS_KEYS)
            .and_then(|v| v.as_str())
            .and_then(parse_instant)
            .unwrap_or_else(Utc::now);

        let value = first_present(raw, TELEMETRY_VALUE_KEYS)
            .or_else(|| {
                raw.get(TELEMETRY_NESTED_PATH.0)
                    .and_then(|v| v.as_object())
                    .and_then(|o| o.get(TELEMETRY_NESTED_PATH.1))
                    .filter(|v| !v.is_null())
            })
            .and_then(coerce_f64);

        TelemetrySample { value, timestamp }
    }
}

/// Resolve the first present, non-null value among ordered candidate keys.
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .find(|v| !v.is_null())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Parse an ISO-8601 timestamp. A trailing `Z` is accepted as UTC, and a
/// naive stamp (no offset) is assumed to be UTC.
fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn status_alias_precedence() {
        let raw = map(json!({"state": "started", "Status": "pending"}));
        let event = EventNormalizer::normalize_status(&raw);
        // `Status` comes before `state` in the alias order.
        assert_eq!(event.status, "PENDING");
    }

    #[test]
    fn status_trimmed_and_uppercased() {
        let raw = map(json!({"event": "  finished \n"}));
        let event = EventNormalizer::normalize_status(&raw);
        assert_eq!(event.status, "FINISHED");
    }

    #[test]
    fn missing_status_is_empty_string() {
        let raw = map(json!({"unrelated": 1}));
        let event = EventNormalizer::normalize_status(&raw);
        assert_eq!(event.status, "");
    }

    #[test]
    fn null_alias_is_skipped() {
        let raw = map(json!({"status": null, "state": "error"}));
        let event = EventNormalizer::normalize_status(&raw);
        assert_eq!(event.status, "ERROR");
    }

    #[test]
    fn normalization_is_alias_invariant() {
        let a = map(json!({"status": "Started", "timestamp": "2024-03-01T10:00:00Z", "job": "J-7"}));
        let b = map(json!({"Event": "STARTED", "Timestamp": "2024-03-01T10:00:00+00:00", "Job": "J-7"}));
        assert_eq!(
            EventNormalizer::normalize_status(&a),
            EventNormalizer::normalize_status(&b)
        );
    }

    #[test]
    fn timestamp_z_suffix_parses_as_utc() {
        let raw = map(json!({"status": "STARTED", "timestamp": "2024-03-01T10:30:00Z"}));
        let event = EventNormalizer::normalize_status(&raw);
        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn naive_timestamp_assumed_utc() {
        let raw = map(json!({"status": "STARTED", "Time": "2024-03-01T10:30:00.500"}));
        let event = EventNormalizer::normalize_status(&raw);
        assert_eq!(event.timestamp.timestamp_millis(), 1_709_289_000_500);
    }

    #[test]
    fn unparsable_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let raw = map(json!({"status": "STARTED", "timestamp": "not a date"}));
        let event = EventNormalizer::normalize_status(&raw);
        assert!(event.timestamp >= before);
        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn telemetry_number_value() {
        let raw = map(json!({"Filterzustand": 42.5, "Time": "2024-03-01T10:00:00Z"}));
        let sample = EventNormalizer::normalize_telemetry(&raw);
        assert_eq!(sample.value, Some(42.5));
    }

    #[test]
    fn telemetry_numeric_string_coerced() {
        let raw = map(json!({"filterStatus": " 3.25 "}));
        let sample = EventNormalizer::normalize_telemetry(&raw);
        assert_eq!(sample.value, Some(3.25));
    }

    #[test]
    fn telemetry_nested_path_resolved() {
        let raw = map(json!({"ProcessData": {"Filterzustand": 7}}));
        let sample = EventNormalizer::normalize_telemetry(&raw);
        assert_eq!(sample.value, Some(7.0));
    }

    #[test]
    fn telemetry_flat_alias_wins_over_nested() {
        let raw = map(json!({"Filterzustand": 1.0, "ProcessData": {"Filterzustand": 9.0}}));
        let sample = EventNormalizer::normalize_telemetry(&raw);
        assert_eq!(sample.value, Some(1.0));
    }

    #[test]
    fn telemetry_unparsable_value_is_none() {
        let raw = map(json!({"Filterzustand": "broken", "Time": "2024-03-01T10:00:00Z"}));
        let sample = EventNormalizer::normalize_telemetry(&raw);
        assert_eq!(sample.value, None);
    }

    #[test]
    fn telemetry_missing_value_is_none() {
        let raw = map(json!({"Time": "2024-03-01T10:00:00Z"}));
        let sample = EventNormalizer::normalize_telemetry(&raw);
        assert_eq!(sample.value, None);
    }

    #[test]
    fn job_id_extracted_and_trimmed() {
        let raw = map(json!({"status": "PENDING", "Job": " 4711 "}));
        let event = EventNormalizer::normalize_status(&raw);
        assert_eq!(event.job_id, "4711");
    }
}

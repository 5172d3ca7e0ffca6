//! Timestamp normalization at the storage boundary.
//!
//! Supabase returns `timestamptz` values in several ISO-8601 spellings
//! (`+00:00` offsets, `Z`, microsecond precision, occasionally offset-less
//! for plain `timestamp` columns). The models use `DateTime<Utc>`, so
//! everything read from the store is normalized to canonical RFC 3339 UTC
//! before deserialization, and everything written is guaranteed an explicit
//! offset.
//!
//! Both walks recurse through objects and through objects nested in arrays;
//! bare string scalars inside arrays are never timestamp-parsed. That
//! asymmetry relative to object fields is deliberate: arrays of raw strings
//! in this schema are data, not timestamps.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Offset-less timestamps are taken as UTC. Date-only strings do not parse:
/// a translation value like "2024-01-15" must survive untouched.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn canonical(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Rewrite every embedded timestamp string so it carries an explicit offset.
/// Strings that already parse as RFC 3339 are left exactly as sent; only
/// offset-less timestamps are rewritten (as UTC).
pub fn encode(value: &mut Value) {
    walk(value, &|s| {
        if DateTime::parse_from_rfc3339(s).is_ok() {
            return None;
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| canonical(naive.and_utc()))
    });
}

/// Normalize every string that parses as an ISO-8601 timestamp to canonical
/// RFC 3339 UTC. Strings that fail to parse pass through unchanged; this
/// never errors. Idempotent: a second pass is a no-op.
pub fn decode(value: &mut Value) {
    walk(value, &|s| parse_timestamp(s).map(canonical));
}

fn walk(value: &mut Value, rewrite: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::Object(map) => {
            for field in map.values_mut() {
                match field {
                    Value::String(s) => {
                        if let Some(normalized) = rewrite(s) {
                            *field = Value::String(normalized);
                        }
                    }
                    Value::Object(_) => walk(field, rewrite),
                    Value::Array(items) => {
                        for item in items.iter_mut().filter(|item| item.is_object()) {
                            walk(item, rewrite);
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut().filter(|item| item.is_object()) {
                walk(item, rewrite);
            }
        }
        _ => {}
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::timestamps::parse_timestamp;

/// A date field as it was found in the store.
///
/// Documents written by this layer hold ISO-8601 strings, but records
/// created elsewhere may carry epoch milliseconds or a `{seconds,
/// nanoseconds}` timestamp map. Any shape decodes; only [`StoredDate::instant`]
/// interprets it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredDate {
    Text(String),
    Millis(i64),
    Other(Value),
}

impl StoredDate {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StoredDate::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The point in time this value denotes, if it can be read as one
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            StoredDate::Text(text) => parse_timestamp(text),
            StoredDate::Millis(millis) => DateTime::from_timestamp_millis(*millis),
            StoredDate::Other(Value::Number(number)) => number
                .as_f64()
                .filter(|millis| millis.is_finite())
                .and_then(|millis| DateTime::from_timestamp_millis(millis as i64)),
            StoredDate::Other(Value::Object(map)) => {
                let seconds = map.get("seconds").or_else(|| map.get("_seconds"))?.as_i64()?;
                let nanos = map
                    .get("nanoseconds")
                    .or_else(|| map.get("_nanoseconds"))
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
            }
            StoredDate::Other(_) => None,
        }
    }
}

impl From<String> for StoredDate {
    fn from(text: String) -> Self {
        StoredDate::Text(text)
    }
}

impl From<&str> for StoredDate {
    fn from(text: &str) -> Self {
        StoredDate::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn read(value: Value) -> StoredDate {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_every_shape_decodes() {
        assert_eq!(read(json!("2024-05-01")), StoredDate::Text("2024-05-01".into()));
        assert_eq!(read(json!(1700000000000_i64)), StoredDate::Millis(1_700_000_000_000));
        assert!(matches!(read(json!(true)), StoredDate::Other(_)));
        assert!(matches!(read(json!({"seconds": 1, "nanoseconds": 0})), StoredDate::Other(_)));
    }

    #[test]
    fn test_instant_of_each_shape() {
        let expected = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();

        assert_eq!(read(json!("2023-11-14T22:13:20Z")).instant(), Some(expected));
        assert_eq!(read(json!(1700000000000_i64)).instant(), Some(expected));
        assert_eq!(read(json!(1700000000000.0)).instant(), Some(expected));
        assert_eq!(read(json!({"seconds": 1700000000, "nanoseconds": 0})).instant(), Some(expected));
        assert_eq!(read(json!({"_seconds": 1700000000, "_nanoseconds": 0})).instant(), Some(expected));
    }

    #[test]
    fn test_unreadable_values_have_no_instant() {
        assert_eq!(read(json!("soon")).instant(), None);
        assert_eq!(read(json!(false)).instant(), None);
        assert_eq!(read(json!({"when": "later"})).instant(), None);
        assert_eq!(read(json!([2024, 5, 1])).instant(), None);
    }
}

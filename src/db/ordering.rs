//! Query-then-sort.
//!
//! Owner-filtered reads need newest-first ordering, but a store-side
//! `where owner == x order by date` needs a composite index on most managed
//! document stores. Under [`OwnerQueryStrategy::QueryThenSort`] the query
//! filters on the owner only and the records are sorted here instead.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use super::{Database, OWNER_FIELD};
use crate::config::OwnerQueryStrategy;
use crate::models::{FamilyMember, ServiceRequest, StoredDate};
use crate::store::{Direction, Query};

/// Records that carry the date field their listings are ordered by
pub trait Dated {
    /// Field name in the stored document
    const DATE_FIELD: &'static str;

    fn date(&self) -> Option<&StoredDate>;
}

impl Dated for FamilyMember {
    const DATE_FIELD: &'static str = "createdAt";

    fn date(&self) -> Option<&StoredDate> {
        self.created_at.as_ref()
    }
}

impl Dated for ServiceRequest {
    const DATE_FIELD: &'static str = "submissionDate";

    fn date(&self) -> Option<&StoredDate> {
        self.submission_date.as_ref()
    }
}

/// Sort key of a stored date; missing or unreadable dates count as the epoch
pub fn sort_instant(date: Option<&StoredDate>) -> DateTime<Utc> {
    date.and_then(StoredDate::instant)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Stable newest-first sort on each record's date
pub fn sort_newest_first<T: Dated>(records: &mut [T]) {
    records.sort_by_cached_key(|record| Reverse(sort_instant(record.date())));
}

impl Database {
    /// Query for the records of `user_id` in `collection`, shaped by the
    /// configured strategy
    pub(crate) fn owner_query<T: Dated>(&self, collection: &str, user_id: &str) -> Query {
        let query = Query::collection(collection).where_eq(OWNER_FIELD, user_id);
        match self.config.owner_query_strategy {
            OwnerQueryStrategy::QueryThenSort => query,
            OwnerQueryStrategy::CompositeIndex => query.order_by(T::DATE_FIELD, Direction::Descending),
        }
    }

    /// In-memory sort to apply after running [`Database::owner_query`], if any
    pub(crate) fn owner_sort<T: Dated>(&self) -> Option<fn(&mut [T])> {
        match self.config.owner_query_strategy {
            OwnerQueryStrategy::QueryThenSort => Some(sort_newest_first::<T>),
            OwnerQueryStrategy::CompositeIndex => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldMap;
    use serde_json::{json, Value};

    fn member(id: &str, created_at: Option<&str>) -> FamilyMember {
        FamilyMember {
            id: id.to_string(),
            user_id: "u1".to_string(),
            name: None,
            created_at: created_at.map(StoredDate::from),
            extra: FieldMap::new(),
        }
    }

    fn stored(value: Value) -> StoredDate {
        serde_json::from_value(value).unwrap()
    }

    fn ids(members: &[FamilyMember]) -> Vec<&str> {
        members.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_sorts_newest_first() {
        let mut members = vec![
            member("old", Some("2023-01-01T00:00:00.000Z")),
            member("new", Some("2024-06-01T08:30:00.000Z")),
            member("mid", Some("2023-09-15T12:00:00.000Z")),
        ];
        sort_newest_first(&mut members);
        assert_eq!(ids(&members), vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_missing_and_malformed_dates_sort_last() {
        let mut members = vec![
            member("none", None),
            member("garbage", Some("not a date")),
            member("dated", Some("2020-02-02")),
        ];
        sort_newest_first(&mut members);
        assert_eq!(ids(&members), vec!["dated", "none", "garbage"]);
    }

    #[test]
    fn test_equal_dates_keep_store_order() {
        let mut members = vec![
            member("a", Some("2024-01-01T00:00:00Z")),
            member("b", Some("2024-01-01T00:00:00.000Z")),
            member("c", Some("2024-01-01T02:00:00+02:00")),
        ];
        sort_newest_first(&mut members);
        assert_eq!(ids(&members), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_non_string_dates_sort_by_their_instant() {
        let mut members = vec![
            member("text", Some("2023-01-01T00:00:00.000Z")),
            member("flag", None),
            member("millis", None),
            member("timestamp", None),
        ];
        members[1].created_at = Some(stored(json!(true)));
        members[2].created_at = Some(stored(json!(1700000000000_i64)));
        members[3].created_at = Some(stored(json!({"seconds": 1720000000, "nanoseconds": 0})));

        sort_newest_first(&mut members);
        assert_eq!(ids(&members), vec!["timestamp", "millis", "text", "flag"]);
    }

    #[test]
    fn test_sort_instant_defaults_to_epoch() {
        assert_eq!(sort_instant(None), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(sort_instant(Some(&StoredDate::from("31/12/2024"))), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(sort_instant(Some(&stored(json!({"at": "noon"})))), DateTime::<Utc>::UNIX_EPOCH);
    }
}

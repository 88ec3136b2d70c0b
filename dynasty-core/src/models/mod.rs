mod coach;
mod schedule;
mod school;

pub use coach::*;
pub use schedule::*;
pub use school::*;

use chrono::{DateTime, DurationRound, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Current time truncated to the precision timestamps are stored with, so a
/// freshly saved value compares equal to the one read back.
pub(crate) fn now() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::microseconds(1)).unwrap_or(now)
}

// Fixed precision keeps lexical order of stored timestamps equal to time order.
pub(crate) fn to_db_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn from_db_time(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("bad timestamp '{value}': {e}")))
}

pub(crate) fn parse_uuid(value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| StoreError::InvalidData(format!("bad id '{value}': {e}")))
}

/// Reads a nullable patch field: absent stays `None` (via `#[serde(default)]`),
/// an explicit `null` becomes `Some(None)`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

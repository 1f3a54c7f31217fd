//! Cache expiry policy.

use chrono::{DateTime, Duration, Utc};

/// How long a cached feed stays valid.
pub(crate) fn max_cache_age() -> Duration {
  Duration::days(7)
}

/// Whether a snapshot taken at `timestamp` is still valid at `now`.
///
/// A snapshot exactly at the age limit is already expired.
pub(crate) fn is_valid(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
  now - timestamp < max_cache_age()
}

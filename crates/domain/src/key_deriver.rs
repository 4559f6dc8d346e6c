//! Deterministic weekly access key derivation
//!
//! A key is `sk-` followed by the first 16 hex characters of
//! `SHA-256("{iso_year}-{iso_week}" + secret)`. Any process holding the same
//! secret computes the same key for the same ISO week, so replicas agree
//! without coordinating.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use crate::{entities::AccessKey, value_objects::IsoWeek};

/// Prefix of every access key
pub const KEY_PREFIX: &str = "sk-";

/// Number of digest hex characters kept after the prefix
pub const KEY_HEX_LEN: usize = 16;

/// Lifetime of a freshly computed key
pub const KEY_ROTATION_DAYS: i64 = 7;

/// Compute the key value for an ISO week and secret
pub fn derive_key_value(week: IsoWeek, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(week.to_string().as_bytes());
    hasher.update(secret.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!("{KEY_PREFIX}{}", &digest[..KEY_HEX_LEN])
}

/// Derive the access key valid at `now`
///
/// The value depends only on the ISO week of `now`; the expiry is
/// `now + 7 days`, so two derivations on different days of the same week
/// share a value but not an expiry.
pub fn derive_access_key(now: DateTime<Utc>, secret: &str) -> AccessKey {
    let value = derive_key_value(IsoWeek::of(&now), secret);
    AccessKey::from_parts(value, now + Duration::days(KEY_ROTATION_DAYS))
}

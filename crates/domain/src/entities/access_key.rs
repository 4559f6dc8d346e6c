//! Access key entity

use std::fmt;

use chrono::{DateTime, Utc};

use crate::{
    errors::DomainError,
    key_deriver::{KEY_HEX_LEN, KEY_PREFIX},
};

/// The bearer token clients present on the chat endpoint, with its expiry
///
/// `Debug` redacts the value so keys never end up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    value: String,
    expiry: DateTime<Utc>,
}

impl AccessKey {
    /// Create an access key from a stored value and expiry
    ///
    /// The value must be `sk-` followed by 16 lowercase hex characters.
    pub fn new(value: impl Into<String>, expiry: DateTime<Utc>) -> Result<Self, DomainError> {
        let value = value.into();
        if !Self::is_well_formed(&value) {
            return Err(DomainError::InvalidAccessKey(format!(
                "expected '{KEY_PREFIX}' followed by {KEY_HEX_LEN} lowercase hex characters"
            )));
        }
        Ok(Self { value, expiry })
    }

    /// Construct without validation; only the deriver produces these
    pub(crate) const fn from_parts(value: String, expiry: DateTime<Utc>) -> Self {
        Self { value, expiry }
    }

    /// Check the `sk-` + 16 lowercase hex format
    pub fn is_well_formed(value: &str) -> bool {
        value.strip_prefix(KEY_PREFIX).is_some_and(|hex| {
            hex.len() == KEY_HEX_LEN
                && hex
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
    }

    /// The token string
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Absolute expiry timestamp
    pub const fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Whether the key has expired at `now` (expiry instant itself counts as expired)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry
    }

    /// Whole days until expiry, floored, never negative
    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.expiry - now).num_days().max(0)
    }
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("value", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .finish()
    }
}

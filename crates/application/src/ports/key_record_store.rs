//! Key record store port
//!
//! Durable storage for the single current access key. There is exactly one
//! record; `save` overwrites it.

use async_trait::async_trait;
use domain::AccessKey;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for persisting the current access key
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KeyRecordStore: Send + Sync {
    /// Read the persisted key
    ///
    /// Returns `Ok(None)` when no record exists and an error when the record
    /// exists but cannot be read or parsed.
    async fn load(&self) -> Result<Option<AccessKey>, ApplicationError>;

    /// Overwrite the persisted key
    ///
    /// Implementations must not leave a partially written record behind.
    async fn save(&self, key: &AccessKey) -> Result<(), ApplicationError>;
}

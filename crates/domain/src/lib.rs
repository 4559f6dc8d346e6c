//! Domain layer for KeyGate
//!
//! Contains the access key entity, the ISO week rotation unit, the key
//! deriver and domain errors. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod key_deriver;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use key_deriver::{KEY_PREFIX, KEY_ROTATION_DAYS, derive_access_key, derive_key_value};
pub use value_objects::*;

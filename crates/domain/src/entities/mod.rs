//! Domain entities

mod access_key;

pub use access_key::AccessKey;

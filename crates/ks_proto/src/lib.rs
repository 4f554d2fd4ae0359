//! ks_proto — Records and API types for Keyseal Relay
//!
//! All on-wire types are JSON with camelCase field names, matching the
//! bodies the relay has always accepted.
//!
//! # Modules
//! - `ids`     — `UserId` / `MessageId` newtypes
//! - `message` — The persisted message record and redaction
//! - `api`     — Request/response bodies for the HTTP surface

pub mod api;
pub mod ids;
pub mod message;

pub use ids::{MessageId, UserId};
pub use message::{Message, REDACTED_BODY};

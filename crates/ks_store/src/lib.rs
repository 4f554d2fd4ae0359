//! ks_store — Persistence for Keyseal Relay
//!
//! # Storage model
//! - `user_keys`: one row per user, replaced wholesale on every upload.
//! - `messages`: sealed bodies only.  The store never sees plaintext and
//!   never decides who may touch a row; ownership arrives as a predicate
//!   (`id = ? AND sender_id = ?`) evaluated inside a single statement.
//!
//! The service layer talks to the traits in `keys` and `messages`, so any
//! backend with row-level atomic upsert and conditional update/delete can
//! stand in for SQLite.
//!
//! # Migration
//! SQLx migrations in `migrations/` are run on every open.

pub mod db;
pub mod error;
pub mod keys;
pub mod messages;
pub mod models;

pub use db::{Store, StoreOptions};
pub use error::StoreError;
pub use keys::KeyStore;
pub use messages::MessageStore;

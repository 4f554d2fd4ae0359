//! ks_crypto — Keyseal Relay sealing primitives
//!
//! # Design principles
//! - NO custom crypto; the RSA primitive comes from the RustCrypto `rsa` crate.
//! - Sealing is one-way. Nothing in this crate can open a sealed body.
//! - The padding scheme is a policy parameter (`SealScheme`), not a constant,
//!   so it can be upgraded without touching callers.
//!
//! # Module layout
//! - `pubkey` — PEM parsing, minimum-size policy, fingerprints
//! - `seal`   — `SealingEngine`: plaintext + recipient key → base64 ciphertext
//! - `error`  — unified error type

pub mod error;
pub mod pubkey;
pub mod seal;

pub use error::CryptoError;
pub use pubkey::RecipientKey;
pub use seal::{SealScheme, SealingEngine};

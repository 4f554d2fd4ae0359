use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Key format error: {0}")]
    KeyFormat(String),

    #[error("Public key too weak: {bits}-bit modulus, minimum is {min_bits}")]
    WeakKey { bits: usize, min_bits: usize },

    #[error("Plaintext too large: {len} bytes, key capacity is {max}")]
    PlaintextTooLarge { len: usize, max: usize },

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Unknown seal scheme: {0}")]
    UnknownScheme(String),
}

//! Message sealing
//!
//! Encrypts a message body to exactly one recipient public key.
//!
//! Sealed wire format: standard base64 of the raw RSA ciphertext, which is
//! always exactly one modulus long (256 bytes for a 2048-bit key).
//!
//! Both schemes use randomised padding, so sealing the same plaintext twice
//! under the same key yields two different ciphertexts.
//!
//! Capacity per scheme (k = modulus bytes):
//!   - `pkcs1v15`    k − 11   (245 bytes for 2048-bit keys)
//!   - `oaep-sha256` k − 66   (190 bytes for 2048-bit keys)

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::rngs::OsRng;
use rsa::{Oaep, Pkcs1v15Encrypt};
use sha2::Sha256;

use crate::error::CryptoError;
use crate::pubkey::RecipientKey;

/// Padding scheme used for sealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SealScheme {
    /// RSAES-PKCS1-v1_5.
    #[default]
    Pkcs1v15,
    /// RSAES-OAEP with SHA-256 and MGF1-SHA-256.
    OaepSha256,
}

impl SealScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pkcs1v15 => "pkcs1v15",
            Self::OaepSha256 => "oaep-sha256",
        }
    }

    /// Bytes of each ciphertext block consumed by padding.
    fn overhead(&self) -> usize {
        match self {
            Self::Pkcs1v15 => 11,
            // 2 * SHA-256 output + 2
            Self::OaepSha256 => 66,
        }
    }
}

impl fmt::Display for SealScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SealScheme {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pkcs1v15" | "pkcs1-v1_5" => Ok(Self::Pkcs1v15),
            "oaep-sha256" | "oaep" => Ok(Self::OaepSha256),
            other => Err(CryptoError::UnknownScheme(other.to_string())),
        }
    }
}

/// Stateless sealer.  Output depends only on (plaintext, key) and fresh
/// randomness; the scheme is fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SealingEngine {
    scheme: SealScheme,
}

impl SealingEngine {
    pub fn new(scheme: SealScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> SealScheme {
        self.scheme
    }

    /// Largest plaintext (in bytes) that can be sealed under `key`.
    pub fn capacity(&self, key: &RecipientKey) -> usize {
        key.modulus_len().saturating_sub(self.scheme.overhead())
    }

    /// Seal `plaintext` for the holder of `key`, returning base64 text.
    pub fn seal(&self, plaintext: &[u8], key: &RecipientKey) -> Result<String, CryptoError> {
        let max = self.capacity(key);
        if plaintext.len() > max {
            return Err(CryptoError::PlaintextTooLarge {
                len: plaintext.len(),
                max,
            });
        }

        let ciphertext = match self.scheme {
            SealScheme::Pkcs1v15 => key.as_rsa().encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext),
            SealScheme::OaepSha256 => {
                key.as_rsa()
                    .encrypt(&mut OsRng, Oaep::new::<Sha256>(), plaintext)
            }
        }
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        Ok(STANDARD.encode(ciphertext))
    }
}

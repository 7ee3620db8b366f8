//! [`RawKeyBytes`] and the opaque [`KeyHandle`] imported from them.

use std::fmt;

use aes_gcm_siv::Aes256GcmSiv;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::KeyError;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::crypto::cipher::{self, CipherError, CipherField};
use crate::crypto::KEY_LEN;

/// Raw symmetric key bytes as delivered by a [`KeySource`](super::KeySource).
///
/// The buffer is overwritten with zeroes on drop. It is consumed by
/// [`KeyHandle::import`] and never stored anywhere else.
pub struct RawKeyBytes(Zeroizing<Vec<u8>>);

impl RawKeyBytes {
    /// Wrap already-decoded key bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Decode the standard-base64 transport form.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyFormat`] if `encoded` is not valid base64.
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        STANDARD
            .decode(encoded.trim())
            .map(Self::new)
            .map_err(|_| KeyError::InvalidKeyFormat("key is not valid base64".into()))
    }

    /// Number of key bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no bytes were delivered.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RawKeyBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("RawKeyBytes([REDACTED])")
    }
}

/// Imported, algorithm-bound key usable only to seal and open fields.
///
/// There is no accessor for the underlying bytes. The session shares a handle
/// as `Arc<KeyHandle>`; it is dropped when the session ends.
pub struct KeyHandle {
    cipher: Aes256GcmSiv,
    fingerprint: String,
}

impl KeyHandle {
    /// Import raw key bytes, consuming (and zeroizing) them.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidKeyFormat`] unless exactly [`KEY_LEN`] bytes
    /// were supplied.
    pub fn import(raw: RawKeyBytes) -> Result<Self, KeyError> {
        if raw.len() != KEY_LEN {
            return Err(KeyError::InvalidKeyFormat(format!(
                "expected {KEY_LEN} key bytes, got {}",
                raw.len()
            )));
        }
        let cipher = cipher::build_cipher(&raw.0)
            .map_err(|e| KeyError::InvalidKeyFormat(e.to_string()))?;
        let fingerprint = fingerprint_of(&raw.0);
        Ok(Self {
            cipher,
            fingerprint,
        })
    }

    /// Encrypt `plaintext` with a fresh nonce.
    pub fn seal(&self, plaintext: &[u8]) -> Result<CipherField, CipherError> {
        cipher::encrypt_field(plaintext, &self.cipher)
    }

    /// Authenticate and decrypt a sealed field.
    pub fn open(&self, field: &CipherField) -> Result<Vec<u8>, CipherError> {
        cipher::decrypt_field(field, &self.cipher)
    }

    /// Hex of the first 8 bytes of SHA-256 over the key; safe to log.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

impl fmt::Debug for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHandle")
            .field("fingerprint", &self.fingerprint)
            .finish_non_exhaustive()
    }
}

fn fingerprint_of(key: &[u8]) -> String {
    Sha256::digest(key)
        .iter()
        .take(8)
        .map(|b| format!("{b:02x}"))
        .collect()
}

//! AES-256-GCM-SIV sealing of individual field values.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) keeps confidentiality if a
//! random nonce ever repeats, which matters because nonces are drawn per field
//! on a client with no coordination. A fresh nonce is still drawn on every call
//! so updates of the same value never produce correlated ciphertext.

use aes_gcm_siv::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// A parsed, encrypted field value.
///
/// The string representation is `base64(nonce ‖ ciphertext ‖ tag)` using the
/// standard alphabet with padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherField {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub sealed: Vec<u8>,
}

impl CipherField {
    /// Encode this value to its storage token.
    pub fn encode(&self) -> String {
        let mut buf = Vec::with_capacity(NONCE_LEN + self.sealed.len());
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.sealed);
        STANDARD.encode(buf)
    }

    /// Parse a storage token back into a [`CipherField`].
    ///
    /// Returns `None` when `token` is not standard base64 or decodes to fewer
    /// than `NONCE_LEN + TAG_LEN` bytes; such values are treated as plaintext
    /// by the row codec.
    pub fn decode(token: &str) -> Option<Self> {
        let bytes = STANDARD.decode(token).ok()?;
        if bytes.len() < NONCE_LEN + TAG_LEN {
            return None;
        }
        let (nonce_bytes, sealed) = bytes.split_at(NONCE_LEN);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);
        Some(Self {
            nonce,
            sealed: sealed.to_vec(),
        })
    }
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// The key is the wrong length (must be [`KEY_LEN`] bytes).
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// AES-GCM-SIV encryption failed, or decryption failed authentication.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Encrypt a plaintext field under `cipher` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (unreachable
/// for plaintexts under the 2^36 byte AES-GCM-SIV limit).
pub fn encrypt_field(plaintext: &[u8], cipher: &Aes256GcmSiv) -> Result<CipherField, CipherError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CipherError::AeadFailure)?;

    Ok(CipherField {
        nonce: nonce_bytes,
        sealed,
    })
}

/// Decrypt and authenticate a [`CipherField`].
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if authentication fails (wrong key or
/// tampered nonce, ciphertext, or tag).
pub fn decrypt_field(field: &CipherField, cipher: &Aes256GcmSiv) -> Result<Vec<u8>, CipherError> {
    let nonce = Nonce::from_slice(&field.nonce);
    cipher
        .decrypt(nonce, field.sealed.as_ref())
        .map_err(|_| CipherError::AeadFailure)
}

/// Initialise the AEAD from raw key bytes.
pub fn build_cipher(key: &[u8]) -> Result<Aes256GcmSiv, CipherError> {
    if key.len() != KEY_LEN {
        return Err(CipherError::InvalidKeyLength(key.len()));
    }
    Aes256GcmSiv::new_from_slice(key).map_err(|_| CipherError::InvalidKeyLength(key.len()))
}

//! Errors produced by the row and batch codecs.

use thiserror::Error;

use crate::crypto::CipherError;

/// Encryption failed for a sensitive field. Always propagated to the caller.
#[derive(Debug, Error)]
pub enum EncryptError {
    /// The field value could not be serialised.
    #[error("failed to serialise field {field}")]
    Serialize {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// The AEAD refused to seal the field.
    #[error("failed to encrypt field {field}")]
    Cipher {
        field: String,
        #[source]
        source: CipherError,
    },
}

impl EncryptError {
    /// Name of the field that could not be encrypted.
    pub fn field(&self) -> &str {
        match self {
            EncryptError::Serialize { field, .. } | EncryptError::Cipher { field, .. } => field,
        }
    }
}

/// Why a single field was left undecrypted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Authentication failed: wrong key, or the token was altered.
    #[error("decryption failed")]
    DecryptionFailed,

    /// The field authenticated but its plaintext is not a field value.
    #[error("decrypted bytes are not a field value: {0}")]
    InvalidPlaintext(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_error_names_field() {
        let e = EncryptError::Cipher {
            field: "balance".into(),
            source: CipherError::AeadFailure,
        };
        assert_eq!(e.field(), "balance");
        assert!(e.to_string().contains("balance"));
    }
}

//! Key acquisition and import error taxonomy.

use thiserror::Error;

/// Errors raised while acquiring or importing the session encryption key.
///
/// None of these reach UI callers: the session layer absorbs every variant and
/// falls back to pass-through mode. Messages never contain key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The caller's session is missing or no longer valid.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The key endpoint answered, but no key is provisioned server-side.
    #[error("encryption key unavailable: {0}")]
    KeyUnavailable(String),

    /// Network-layer failure: connect, timeout, or unreadable response body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The key material is not valid base64 or has the wrong length.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),
}

impl KeyError {
    /// Map a non-success HTTP status from the key endpoint to an error.
    ///
    /// 401 and 403 mean the session is not accepted; anything else is treated
    /// as the key being unavailable.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => KeyError::Unauthorized(message.into()),
            _ => KeyError::KeyUnavailable(message.into()),
        }
    }

    /// Short machine-readable code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            KeyError::Unauthorized(_) => "unauthorized",
            KeyError::KeyUnavailable(_) => "key_unavailable",
            KeyError::Transport(_) => "transport_error",
            KeyError::InvalidKeyFormat(_) => "invalid_key_format",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(KeyError::from_status(401, "x"), KeyError::Unauthorized(_)));
        assert!(matches!(KeyError::from_status(403, "x"), KeyError::Unauthorized(_)));
        assert!(matches!(KeyError::from_status(500, "x"), KeyError::KeyUnavailable(_)));
        assert!(matches!(KeyError::from_status(404, "x"), KeyError::KeyUnavailable(_)));
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(KeyError::Unauthorized("x".into()).code(), "unauthorized");
        assert_eq!(KeyError::KeyUnavailable("x".into()).code(), "key_unavailable");
        assert_eq!(KeyError::Transport("x".into()).code(), "transport_error");
        assert_eq!(KeyError::InvalidKeyFormat("x".into()).code(), "invalid_key_format");
    }

    #[test]
    fn display_includes_message() {
        let e = KeyError::KeyUnavailable("no key provisioned".into());
        assert!(e.to_string().contains("no key provisioned"));
    }
}

//! Wire types for the key endpoint and the session status snapshot.
//!
//! The key endpoint bodies are JSON. [`SessionStatus`] is what host
//! applications read to decide whether to warn the user that encryption is off.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Key endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `GET` on the key endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyResponse {
    /// Standard base64 encoding of the raw 256-bit key.
    pub key: String,
}

impl fmt::Debug for KeyResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyResponse { key: [REDACTED] }")
    }
}

/// Error body the key endpoint returns alongside a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description, e.g. `"encryption key not configured"`.
    pub error: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// Coarse state of the key session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// No session has been started, or the last one ended.
    Uninitialized,
    /// The key fetch is in flight.
    Loading,
    /// A key is loaded; sensitive fields are encrypted.
    Ready,
    /// Key acquisition failed; records pass through unencrypted.
    Degraded,
}

impl Readiness {
    /// Returns `false` only while codec calls are queued behind the key fetch.
    pub fn is_settled(self) -> bool {
        !matches!(self, Readiness::Loading)
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Readiness::Uninitialized => "uninitialized",
            Readiness::Loading => "loading",
            Readiness::Ready => "ready",
            Readiness::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

/// Serialisable snapshot of the key session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    /// Current state.
    pub state: Readiness,
    /// Whether records are being encrypted right now.
    pub key_ready: bool,
    /// Truncated SHA-256 fingerprint of the loaded key, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_fingerprint: Option<String>,
    /// Machine-readable error code when degraded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_response_parses() {
        let r: KeyResponse = serde_json::from_str(r#"{"key":"AAAA"}"#).unwrap();
        assert_eq!(r.key, "AAAA");
    }

    #[test]
    fn key_response_debug_is_redacted() {
        let r = KeyResponse {
            key: "c2VjcmV0".into(),
        };
        let dbg = format!("{r:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("c2VjcmV0"));
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("encryption key not configured");
        assert!(e.error.contains("not configured"));
    }

    #[test]
    fn readiness_serde_is_snake_case() {
        let json = serde_json::to_string(&Readiness::Degraded).unwrap();
        assert_eq!(json, "\"degraded\"");
        assert_eq!(Readiness::Uninitialized.to_string(), "uninitialized");
        assert!(!Readiness::Loading.is_settled());
        assert!(Readiness::Ready.is_settled());
    }

    #[test]
    fn session_status_omits_empty_optionals() {
        let s = SessionStatus {
            state: Readiness::Ready,
            key_ready: true,
            key_fingerprint: Some("0011223344556677".into()),
            degraded_reason: None,
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("degraded_reason"));
        let decoded: SessionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, s);
    }
}

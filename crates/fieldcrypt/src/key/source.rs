//! Key acquisition: the [`KeySource`] seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use common::protocol::{ErrorResponse, KeyResponse};
use common::KeyError;
use tracing::debug;
use zeroize::Zeroizing;

use super::material::RawKeyBytes;
use crate::config::Config;

/// Something that can deliver the session's raw key in one round trip.
///
/// Implementations assume the caller is already authenticated; they carry
/// whatever credential the caller hands them and never sign in themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the raw key bytes.
    ///
    /// # Errors
    ///
    /// - [`KeyError::Unauthorized`] when the session is not accepted.
    /// - [`KeyError::KeyUnavailable`] when no key is provisioned.
    /// - [`KeyError::Transport`] for network-layer failures.
    /// - [`KeyError::InvalidKeyFormat`] when the delivered key is not base64.
    async fn fetch_key(&self) -> Result<RawKeyBytes, KeyError>;
}

/// Fetches the key with `GET <endpoint>` and a bearer access token.
///
/// Expects `200 {"key": "<base64>"}`. The request timeout is the only timeout
/// applied; it surfaces as [`KeyError::Transport`].
pub struct HttpKeySource {
    client: reqwest::Client,
    endpoint: String,
    access_token: Zeroizing<String>,
}

impl HttpKeySource {
    /// Build a source for `endpoint` using the caller's session `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Transport`] if the HTTP client cannot be constructed.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, KeyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeyError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            access_token: Zeroizing::new(access_token.into()),
        })
    }

    /// Build a source from validated [`Config`].
    pub fn from_config(cfg: &Config, access_token: impl Into<String>) -> Result<Self, KeyError> {
        Self::new(
            cfg.key_endpoint.clone(),
            access_token,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }
}

impl std::fmt::Debug for HttpKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpKeySource")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch_key(&self) -> Result<RawKeyBytes, KeyError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .bearer_auth(self.access_token.as_str())
            .send()
            .await
            .map_err(|e| KeyError::Transport(format!("key request failed: {e}")))?;

        let status = resp.status();
        debug!(status = status.as_u16(), "key endpoint responded");

        if !status.is_success() {
            let message = match resp.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => format!("key endpoint returned {status}"),
            };
            return Err(KeyError::from_status(status.as_u16(), message));
        }

        let body: KeyResponse = resp
            .json()
            .await
            .map_err(|e| KeyError::Transport(format!("unreadable key response: {e}")))?;
        let encoded = Zeroizing::new(body.key);

        if encoded.trim().is_empty() {
            return Err(KeyError::KeyUnavailable(
                "key endpoint returned an empty key".into(),
            ));
        }
        RawKeyBytes::from_base64(&encoded)
    }
}

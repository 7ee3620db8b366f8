//! Session key acquisition and import.
//!
//! # Lifecycle
//!
//! 1. A [`KeySource`] performs one authenticated round trip and returns
//!    [`RawKeyBytes`].
//! 2. [`KeyHandle::import`] consumes the raw bytes and binds them to the AEAD.
//!    The raw buffer is zeroized as soon as the import returns.
//! 3. The session layer owns the resulting handle until logout.
//!
//! # Security invariants
//!
//! - Raw key bytes and access tokens are **never** logged or persisted.
//! - A [`KeyHandle`] cannot hand its key bytes back out.

pub mod material;
pub mod source;

pub use material::{KeyHandle, RawKeyBytes};
pub use source::{HttpKeySource, KeySource};

use common::KeyError;

/// Fetch the raw key from `source` and import it.
///
/// # Errors
///
/// Propagates the source's [`KeyError`], or [`KeyError::InvalidKeyFormat`]
/// from the import step.
pub async fn acquire(source: &dyn KeySource) -> Result<KeyHandle, KeyError> {
    let raw = source.fetch_key().await?;
    KeyHandle::import(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KEY_LEN;
    use super::source::MockKeySource;

    #[tokio::test]
    async fn acquire_imports_fetched_key() {
        let mut src = MockKeySource::new();
        src.expect_fetch_key()
            .times(1)
            .returning(|| Ok(RawKeyBytes::new(vec![9u8; KEY_LEN])));
        let handle = acquire(&src).await.unwrap();
        assert!(!handle.fingerprint().is_empty());
    }

    #[tokio::test]
    async fn acquire_propagates_fetch_error() {
        let mut src = MockKeySource::new();
        src.expect_fetch_key()
            .returning(|| Err(KeyError::Transport("timed out".into())));
        assert_eq!(
            acquire(&src).await.unwrap_err(),
            KeyError::Transport("timed out".into())
        );
    }

    #[tokio::test]
    async fn acquire_rejects_short_key() {
        let mut src = MockKeySource::new();
        src.expect_fetch_key()
            .returning(|| Ok(RawKeyBytes::new(vec![9u8; 24])));
        assert!(matches!(
            acquire(&src).await.unwrap_err(),
            KeyError::InvalidKeyFormat(_)
        ));
    }
}

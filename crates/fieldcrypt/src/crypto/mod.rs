//! AES-256-GCM-SIV field encryption primitives.
//!
//! This module is intentionally free of HTTP and session dependencies.
//! It provides the low-level encrypt/decrypt operations used by the key layer.
//!
//! # Ciphertext format
//!
//! ```text
//! base64-standard( nonce[12] ‖ ciphertext ‖ tag[16] )
//! ```
//!
//! The token is stored in plain text columns. Changing the nonce length, tag
//! length, or base64 alphabet makes previously stored records unreadable.

pub mod cipher;

pub use cipher::{CipherError, CipherField, KEY_LEN, NONCE_LEN, TAG_LEN};

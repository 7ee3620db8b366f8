//! `fieldcrypt` — client-side field-level encryption for financial records.
//!
//! Sensitive fields (credit limits, balances, bill amounts) are sealed with
//! AES-256-GCM-SIV before records are written and opened after they are read.
//! The session key is fetched once per user session; without it every
//! operation passes records through unchanged so the application stays usable.
//!
//! ```text
//! KeySource ─► KeyHandle::import ─► KeySession (Ready | Degraded)
//!                                        │
//!          fields_for(EntityType) ─► encrypt_row / decrypt_row / decrypt_rows
//! ```
//!
//! Typical wiring:
//!
//! ```no_run
//! # async fn demo(token: String) -> anyhow::Result<()> {
//! use std::sync::Arc;
//! use fieldcrypt::{Config, EntityType, HttpKeySource, KeySession, Record};
//!
//! let cfg = Config::from_env()?;
//! fieldcrypt::telemetry::init(&cfg.log_level)?;
//!
//! let session = KeySession::new();
//! session.start(Arc::new(HttpKeySource::from_config(&cfg, token)?));
//!
//! let row = Record::from_json(serde_json::json!({"id": "abc", "credit_limit": 5000}))?;
//! let sealed = session.encrypt_row(EntityType::CreditCards, row).await?;
//! let plain = session.decrypt_row(EntityType::CreditCards, sealed).await;
//! # let _ = plain;
//! session.end();
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod key;
pub mod schema;
pub mod session;
pub mod telemetry;

pub use codec::{Decrypted, EncryptError, FieldError, FieldFailure, FieldValue, Record};
pub use common::{KeyError, Readiness, SessionStatus};
pub use config::Config;
pub use key::{HttpKeySource, KeyHandle, KeySource, RawKeyBytes};
pub use schema::{fields_for, EntityType, FieldSet};
pub use session::KeySession;

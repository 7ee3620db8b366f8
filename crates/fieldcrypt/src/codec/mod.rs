//! Record model and the row/batch field codecs.
//!
//! Sensitive fields are chosen by [`crate::schema::fields_for`]; everything
//! else in a record passes through untouched.
//!
//! # Decrypt failure policy
//!
//! A field that fails to decrypt is left as its stored token and reported in
//! [`Decrypted::failures`]. Decryption never returns an error and never aborts
//! the record or the batch. Encryption failures, by contrast, are hard errors.

pub mod batch;
pub mod error;
pub mod row;
pub mod value;

pub use batch::{decrypt_rows, encrypt_rows};
pub use error::{EncryptError, FieldError};
pub use row::{decrypt_row, encrypt_row, Decrypted, FieldFailure};
pub use value::{FieldValue, Record, RecordError};

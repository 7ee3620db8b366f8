//! Sequence-level wrappers over the row codec.

use tracing::debug;

use super::error::EncryptError;
use super::row::{decrypt_row, encrypt_row, Decrypted};
use super::value::Record;
use crate::key::KeyHandle;
use crate::schema::EntityType;

/// Decrypt every record of a query result.
///
/// Output has the same length and order as the input; a record with failing
/// fields comes back partial in its own slot and does not affect the others.
pub fn decrypt_rows<I>(entity: EntityType, records: I, key: &KeyHandle) -> Vec<Decrypted>
where
    I: IntoIterator<Item = Record>,
{
    let out: Vec<Decrypted> = records
        .into_iter()
        .map(|r| decrypt_row(entity, r, key))
        .collect();

    let partial = out.iter().filter(|d| d.is_partial()).count();
    if partial > 0 {
        debug!(entity = %entity, total = out.len(), partial, "batch decrypted with field failures");
    }
    out
}

/// Encrypt a batch of records for writing.
///
/// # Errors
///
/// Stops at the first [`EncryptError`]; nothing from a failed batch should be
/// written.
pub fn encrypt_rows<I>(entity: EntityType, records: I, key: &KeyHandle) -> Result<Vec<Record>, EncryptError>
where
    I: IntoIterator<Item = Record>,
{
    records
        .into_iter()
        .map(|r| encrypt_row(entity, r, key))
        .collect()
}

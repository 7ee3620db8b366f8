//! Per-record encryption and decryption driven by the field schema registry.

use tracing::warn;
use zeroize::Zeroizing;

use super::error::{EncryptError, FieldError};
use super::value::{FieldValue, Record};
use crate::crypto::CipherField;
use crate::key::KeyHandle;
use crate::schema::{fields_for, EntityType};

/// A field that could not be decrypted and was left as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: String,
    pub error: FieldError,
}

/// Outcome of decrypting one record.
///
/// Fields that fail are kept as their stored token and listed in
/// `failures`, so one bad field never costs the caller the whole record.
#[derive(Debug, Clone, PartialEq)]
pub struct Decrypted {
    pub record: Record,
    pub failures: Vec<FieldFailure>,
}

impl Decrypted {
    /// Wrap a record that needed no decryption.
    pub fn untouched(record: Record) -> Self {
        Self {
            record,
            failures: Vec::new(),
        }
    }

    /// Returns `true` if at least one sensitive field is still ciphertext.
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

/// Encrypt every sensitive field of `record` present with a non-null value.
///
/// Each value is serialised to JSON, sealed under a fresh nonce and replaced by
/// its CipherField token. Other fields are returned untouched.
///
/// # Errors
///
/// Any failure is returned as [`EncryptError`]; a sensitive field is never
/// written in the clear.
pub fn encrypt_row(entity: EntityType, mut record: Record, key: &KeyHandle) -> Result<Record, EncryptError> {
    for &field in fields_for(entity) {
        let Some(value) = record.get_mut(field) else {
            continue;
        };
        if value.is_null() {
            continue;
        }
        let plaintext = Zeroizing::new(serde_json::to_vec(&*value).map_err(|source| {
            EncryptError::Serialize {
                field: field.to_owned(),
                source,
            }
        })?);
        let sealed = key.seal(&plaintext).map_err(|source| EncryptError::Cipher {
            field: field.to_owned(),
            source,
        })?;
        *value = FieldValue::String(sealed.encode());
    }
    Ok(record)
}

/// Decrypt every sensitive field of `record` that holds a CipherField token.
///
/// Values that are not tokens (numbers, plain strings, short or non-base64
/// strings) are assumed to be plaintext written while no key was available and
/// are left alone.
pub fn decrypt_row(entity: EntityType, mut record: Record, key: &KeyHandle) -> Decrypted {
    let mut failures = Vec::new();
    for &field in fields_for(entity) {
        let Some(FieldValue::String(token)) = record.get(field) else {
            continue;
        };
        let Some(sealed) = CipherField::decode(token) else {
            continue;
        };
        match open_value(&sealed, key) {
            Ok(value) => {
                record.insert(field, value);
            }
            Err(error) => {
                warn!(entity = %entity, field, error = %error, "field left undecrypted");
                failures.push(FieldFailure {
                    field: field.to_owned(),
                    error,
                });
            }
        }
    }
    Decrypted { record, failures }
}

fn open_value(sealed: &CipherField, key: &KeyHandle) -> Result<FieldValue, FieldError> {
    let plaintext = Zeroizing::new(key.open(sealed).map_err(|_| FieldError::DecryptionFailed)?);
    serde_json::from_slice(&plaintext).map_err(|e| FieldError::InvalidPlaintext(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{KEY_LEN, NONCE_LEN};
    use crate::key::RawKeyBytes;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;

    fn key(byte: u8) -> KeyHandle {
        KeyHandle::import(RawKeyBytes::new(vec![byte; KEY_LEN])).unwrap()
    }

    fn record(v: serde_json::Value) -> Record {
        Record::from_json(v).unwrap()
    }

    fn nubank() -> Record {
        record(json!({
            "id": "abc",
            "credit_limit": 5000,
            "current_bill": 1200,
            "name": "Nubank"
        }))
    }

    fn flip_byte(token: &str, index: impl FnOnce(usize) -> usize) -> String {
        let mut raw = STANDARD.decode(token).unwrap();
        let i = index(raw.len());
        raw[i] ^= 0x01;
        STANDARD.encode(raw)
    }

    #[test]
    fn credit_card_scenario_round_trips() {
        let k = key(1);
        let encrypted = encrypt_row(EntityType::CreditCards, nubank(), &k).unwrap();

        assert_eq!(encrypted.get("id"), Some(&FieldValue::from("abc")));
        assert_eq!(encrypted.get("name"), Some(&FieldValue::from("Nubank")));
        for field in ["credit_limit", "current_bill"] {
            let token = encrypted.get(field).and_then(FieldValue::as_str).unwrap();
            assert!(CipherField::decode(token).is_some(), "{field} is not a token");
        }

        let decrypted = decrypt_row(EntityType::CreditCards, encrypted, &k);
        assert!(!decrypted.is_partial());
        assert_eq!(decrypted.record, nubank());
    }

    #[test]
    fn encryption_is_non_deterministic() {
        let k = key(2);
        let a = encrypt_row(EntityType::CreditCards, nubank(), &k).unwrap();
        let b = encrypt_row(EntityType::CreditCards, nubank(), &k).unwrap();
        assert_ne!(a.get("credit_limit"), b.get("credit_limit"));
        assert_ne!(a.get("current_bill"), b.get("current_bill"));
        assert_eq!(decrypt_row(EntityType::CreditCards, a, &k).record, nubank());
        assert_eq!(decrypt_row(EntityType::CreditCards, b, &k).record, nubank());
    }

    #[test]
    fn round_trip_for_every_entity_with_sensitive_fields() {
        let k = key(3);
        let samples = [
            FieldValue::from(5000i64),
            FieldValue::from_f64(-12.75).unwrap(),
            FieldValue::from("R$ 1.200,00"),
            FieldValue::from(true),
        ];
        for entity in EntityType::ALL {
            for sample in &samples {
                let mut r = record(json!({"id": "row-1", "note": "keep me"}));
                for &field in fields_for(entity) {
                    r.insert(field, sample.clone());
                }
                let encrypted = encrypt_row(entity, r.clone(), &k).unwrap();
                let decrypted = decrypt_row(entity, encrypted, &k);
                assert!(!decrypted.is_partial(), "{entity}");
                assert_eq!(decrypted.record, r, "{entity} with {sample:?}");
            }
        }
    }

    #[test]
    fn absent_and_null_fields_pass_through() {
        let k = key(4);
        let r = record(json!({"id": "abc", "current_bill": null}));
        let encrypted = encrypt_row(EntityType::CreditCards, r.clone(), &k).unwrap();
        assert_eq!(encrypted, r);
        assert!(!encrypted.contains("credit_limit"));
    }

    #[test]
    fn empty_field_set_is_noop() {
        let k = key(5);
        let r = record(json!({"id": "c1", "label": "Groceries"}));
        assert_eq!(encrypt_row(EntityType::Categories, r.clone(), &k).unwrap(), r);
        assert_eq!(decrypt_row(EntityType::Categories, r.clone(), &k).record, r);
    }

    #[test]
    fn plaintext_record_decrypts_as_noop() {
        let k = key(6);
        let r = record(json!({"credit_limit": 1000, "current_bill": "1200", "name": "Nubank"}));
        let decrypted = decrypt_row(EntityType::CreditCards, r.clone(), &k);
        assert!(!decrypted.is_partial());
        assert_eq!(decrypted.record, r);
    }

    #[test]
    fn tampered_ciphertext_reports_decryption_failed() {
        let k = key(7);
        let mut encrypted = encrypt_row(EntityType::CreditCards, nubank(), &k).unwrap();
        let token = encrypted.get("credit_limit").and_then(FieldValue::as_str).unwrap();
        let tampered = flip_byte(token, |_| NONCE_LEN);
        encrypted.insert("credit_limit", tampered.clone());

        let decrypted = decrypt_row(EntityType::CreditCards, encrypted, &k);
        assert!(decrypted.is_partial());
        assert_eq!(
            decrypted.failures,
            vec![FieldFailure {
                field: "credit_limit".into(),
                error: FieldError::DecryptionFailed,
            }]
        );
        // Failed field keeps its stored token; the other field still decrypts.
        assert_eq!(decrypted.record.get("credit_limit"), Some(&FieldValue::String(tampered)));
        assert_eq!(decrypted.record.get("current_bill"), Some(&FieldValue::from(1200i64)));
    }

    #[test]
    fn tampered_tag_reports_decryption_failed() {
        let k = key(8);
        let mut encrypted = encrypt_row(EntityType::CreditCards, nubank(), &k).unwrap();
        let token = encrypted.get("current_bill").and_then(FieldValue::as_str).unwrap();
        encrypted.insert("current_bill", flip_byte(token, |len| len - 1));

        let decrypted = decrypt_row(EntityType::CreditCards, encrypted, &k);
        assert_eq!(decrypted.failures.len(), 1);
        assert_eq!(decrypted.failures[0].field, "current_bill");
        assert_eq!(decrypted.failures[0].error, FieldError::DecryptionFailed);
    }

    #[test]
    fn wrong_key_fails_every_sensitive_field() {
        let encrypted = encrypt_row(EntityType::CreditCards, nubank(), &key(9)).unwrap();
        let decrypted = decrypt_row(EntityType::CreditCards, encrypted.clone(), &key(10));
        assert_eq!(decrypted.failures.len(), 2);
        assert_eq!(decrypted.record, encrypted);
    }

    #[test]
    fn sealed_non_value_reports_invalid_plaintext() {
        let k = key(11);
        let token = k.seal(b"not json at all").unwrap().encode();
        let r = record(json!({"balance": token}));
        let decrypted = decrypt_row(EntityType::BankAccounts, r, &k);
        assert!(matches!(
            decrypted.failures[0].error,
            FieldError::InvalidPlaintext(_)
        ));
    }
}

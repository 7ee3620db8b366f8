//! Static mapping from [`EntityType`] to its encrypted fields.

use super::entity::EntityType;

/// Ordered, duplicate-free list of field names to encrypt for one entity type.
pub type FieldSet = &'static [&'static str];

/// Fields that must be encrypted for `entity`.
///
/// Total over [`EntityType`]; an empty set means the type carries nothing
/// sensitive and the codec leaves its records alone.
pub fn fields_for(entity: EntityType) -> FieldSet {
    match entity {
        EntityType::CreditCards => &["credit_limit", "current_bill"],
        EntityType::BankAccounts => &["balance"],
        EntityType::Transactions => &["amount"],
        EntityType::Bills => &["amount"],
        EntityType::Categories => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn credit_cards_fields() {
        assert_eq!(
            fields_for(EntityType::CreditCards),
            &["credit_limit", "current_bill"]
        );
    }

    #[test]
    fn every_field_set_is_unique() {
        for t in EntityType::ALL {
            let fields = fields_for(t);
            let unique: HashSet<_> = fields.iter().collect();
            assert_eq!(unique.len(), fields.len(), "duplicate field in {t}");
        }
    }

    #[test]
    fn categories_carry_nothing_sensitive() {
        assert!(fields_for(EntityType::Categories).is_empty());
    }
}

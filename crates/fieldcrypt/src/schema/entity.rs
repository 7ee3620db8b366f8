//! [`EntityType`]: the closed set of record kinds that may carry sensitive fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One variant per table/resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    CreditCards,
    BankAccounts,
    Transactions,
    Bills,
    Categories,
}

/// The table name did not match any [`EntityType`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntityType(pub String);

impl EntityType {
    /// Every variant, in declaration order.
    pub const ALL: [EntityType; 5] = [
        EntityType::CreditCards,
        EntityType::BankAccounts,
        EntityType::Transactions,
        EntityType::Bills,
        EntityType::Categories,
    ];

    /// Table name as used by the persistence layer.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::CreditCards => "credit_cards",
            EntityType::BankAccounts => "bank_accounts",
            EntityType::Transactions => "transactions",
            EntityType::Bills => "bills",
            EntityType::Categories => "categories",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = UnknownEntityType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownEntityType(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_round_trip_through_from_str() {
        for t in EntityType::ALL {
            assert_eq!(t.as_str().parse::<EntityType>().unwrap(), t);
        }
    }

    #[test]
    fn unknown_table_rejected() {
        assert_eq!(
            "loans".parse::<EntityType>(),
            Err(UnknownEntityType("loans".into()))
        );
    }

    #[test]
    fn serde_matches_table_name() {
        for t in EntityType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }
}

//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl $t {
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

// Ids are never minted here; execute-phase code draws them from an injected
// `IdGenerator` so tests stay deterministic.
uuid_newtype!(
    /// Identifier of a sex-segmented `Batch`.
    BatchId, "BatchId"
);
uuid_newtype!(BatchActivityId, "BatchActivityId");
uuid_newtype!(
    /// Identifier of a `BroilerBatch`.
    BroilerBatchId, "BroilerBatchId"
);
uuid_newtype!(ActivityId, "ActivityId");
uuid_newtype!(TransactionId, "TransactionId");
uuid_newtype!(FinancialTransactionId, "FinancialTransactionId");
uuid_newtype!(ProductId, "ProductId");
uuid_newtype!(ProductVariantId, "ProductVariantId");
uuid_newtype!(VendorId, "VendorId");
uuid_newtype!(
    /// Identifier of a `Person` (customers are persons).
    PersonId, "PersonId"
);
uuid_newtype!(AssetId, "AssetId");

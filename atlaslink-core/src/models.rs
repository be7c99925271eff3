//! Outcome model for the collection init check.
//!
//! The check answers "can I safely initialize this collection?" with one of
//! four named states. Earlier deployments encoded the answer as a small
//! integer; that wire encoding is preserved here but only surfaces through
//! the explicit conversion pair.

use serde::{Deserialize, Serialize};

/// Outcome of the ordered collection init check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitCheck {
    /// The target database is absent from the deployment
    DatabaseMissing,
    /// The database exists but the target collection is absent
    CollectionMissing,
    /// Database and collection exist and the collection holds no documents
    CollectionEmpty,
    /// The collection already holds documents
    CollectionNonEmpty,
}

impl InitCheck {
    /// Legacy integer encoding, kept byte-compatible with existing consumers.
    pub const fn legacy_code(self) -> u8 {
        match self {
            Self::CollectionNonEmpty => 0,
            Self::DatabaseMissing => 1,
            Self::CollectionMissing => 2,
            Self::CollectionEmpty => 3,
        }
    }

    /// Decodes the legacy integer encoding; `None` for out-of-range codes.
    pub const fn from_legacy_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::CollectionNonEmpty),
            1 => Some(Self::DatabaseMissing),
            2 => Some(Self::CollectionMissing),
            3 => Some(Self::CollectionEmpty),
            _ => None,
        }
    }

    /// Whether initialization may proceed without clobbering existing data.
    pub const fn can_initialize(self) -> bool {
        !matches!(self, Self::CollectionNonEmpty)
    }
}

impl std::fmt::Display for InitCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitCheck::DatabaseMissing => write!(f, "database missing"),
            InitCheck::CollectionMissing => write!(f, "collection missing"),
            InitCheck::CollectionEmpty => write!(f, "collection empty"),
            InitCheck::CollectionNonEmpty => write!(f, "collection non-empty"),
        }
    }
}

//! Owner and entry identifiers.
//!
//! Both wrap a UUID but are distinct types, so an `OwnerId` cannot be passed
//! where an `EntryId` is expected. Entry IDs are UUID v7 and sort by creation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;

/// A path or query value that is not a valid identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {label}: {input:?}")]
pub struct InvalidId {
    /// What kind of identifier was expected, e.g. `"entry id"`.
    pub label: &'static str,
    /// The rejected input, as received.
    pub input: String,
}

impl From<InvalidId> for AppError {
    fn from(err: InvalidId) -> Self {
        Self::Validation(err.to_string())
    }
}

macro_rules! typed_id {
    ($name:ident, $label:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Human-readable name used in error messages.
            pub const LABEL: &'static str = $label;

            /// Generates a fresh time-ordered (v7) ID.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        // Surrounding whitespace is ignored; anything else must be a UUID.
        impl std::str::FromStr for $name {
            type Err = InvalidId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self).map_err(|_| InvalidId {
                    label: Self::LABEL,
                    input: s.to_string(),
                })
            }
        }
    };
}

typed_id!(OwnerId, "owner id", "The user who owns a set of ledger entries.");
typed_id!(EntryId, "entry id", "A single money book entry.");

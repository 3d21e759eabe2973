//! Type-safe identifier wrappers.
//!
//! Players are identified by the opaque, already-verified identifier handed
//! to the engine by the identity collaborator (a Telegram user id in the
//! current deployment). The engine never parses or validates credentials;
//! it only carries the number around.
//!
//! Inventory items use UUIDs. Item ids minted by the loot roller are drawn
//! from the loot RNG, seeded by player, day and cycle, so a retried victory
//! produces the same id.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Stable, opaque identifier of a registered player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl PlayerId {
    /// Return the inner numeric value.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PlayerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Build an identifier from 16 caller-supplied random bytes.
            ///
            /// The bytes are stamped as a version 4 UUID.
            pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for one owned inventory item.
    ItemInstanceId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_id_serializes_as_bare_number() {
        let id = PlayerId(424_242);
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("424242"));
    }

    #[test]
    fn item_id_from_bytes_is_stable() {
        let a = ItemInstanceId::from_random_bytes([7; 16]);
        let b = ItemInstanceId::from_random_bytes([7; 16]);
        assert_eq!(a, b);
        assert_eq!(a.into_inner().get_version_num(), 4);
    }

    #[test]
    fn id_display_matches_inner() {
        let id = ItemInstanceId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
        assert_eq!(PlayerId(17).to_string(), "17");
    }
}

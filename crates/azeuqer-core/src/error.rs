//! Error taxonomy returned by engine operations.
//!
//! Every variant maps to a stable [`ErrorCode`] the client shell can
//! marshal. A returned error always means nothing was persisted.

use azeuqer_types::{EquipSlot, ErrorCode, ItemInstanceId, PlayerId};

use crate::cohort::CohortError;
use crate::store::StoreError;

/// Errors returned by [`ProgressionEngine`](crate::engine::ProgressionEngine).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The player has not registered.
    #[error("player {player_id} is not registered")]
    NotRegistered {
        /// The unknown player.
        player_id: PlayerId,
    },

    /// A paid scan with an empty energy pool.
    #[error("insufficient energy")]
    InsufficientEnergy,

    /// A combat turn without an active boss for the current cycle.
    #[error("no active encounter")]
    EncounterNotActive,

    /// An allocation larger than the available points.
    #[error("insufficient points: requested {requested}, available {available}")]
    InsufficientPoints {
        /// Points the request asked for.
        requested: u64,
        /// Points the player has.
        available: u64,
    },

    /// Concurrent writers won every compare-and-save attempt.
    #[error("version conflict after {attempts} attempts")]
    VersionConflict {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// The storage backend or cohort gate is unreachable.
    #[error("storage unavailable: {message}")]
    StorageUnavailable {
        /// Backend error description.
        message: String,
    },

    /// A negative or empty allocation.
    #[error("invalid allocation: {reason}")]
    InvalidAllocation {
        /// What is wrong with the request.
        reason: String,
    },

    /// An email that failed validation.
    #[error("invalid email: {email:?}")]
    InvalidEmail {
        /// The rejected input.
        email: String,
    },

    /// The email belongs to another player.
    #[error("email already bound to another player")]
    EmailTaken,

    /// The item is not owned by the player.
    #[error("item {item_id} not found in inventory")]
    ItemNotFound {
        /// The missing item.
        item_id: ItemInstanceId,
    },

    /// The item cannot be worn in the requested slot.
    #[error("item {item_id} fits {expected:?}, not {requested:?}")]
    SlotMismatch {
        /// The item.
        item_id: ItemInstanceId,
        /// The item's own slot.
        expected: EquipSlot,
        /// The slot the caller asked for.
        requested: EquipSlot,
    },

    /// A counter would have overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Which computation overflowed.
        context: String,
    },
}

impl EngineError {
    /// The stable code for this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotRegistered { .. } => ErrorCode::NotRegistered,
            Self::InsufficientEnergy => ErrorCode::InsufficientEnergy,
            Self::EncounterNotActive => ErrorCode::EncounterNotActive,
            Self::InsufficientPoints { .. } => ErrorCode::InsufficientPoints,
            Self::VersionConflict { .. } => ErrorCode::VersionConflict,
            Self::StorageUnavailable { .. } => ErrorCode::StorageUnavailable,
            Self::InvalidAllocation { .. } => ErrorCode::InvalidAllocation,
            Self::InvalidEmail { .. } => ErrorCode::InvalidEmail,
            Self::EmailTaken => ErrorCode::EmailTaken,
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::SlotMismatch { .. } => ErrorCode::SlotMismatch,
            Self::ArithmeticOverflow { .. } => ErrorCode::ArithmeticOverflow,
        }
    }

    pub(crate) fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: context.to_owned(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict | StoreError::AlreadyExists => {
                Self::VersionConflict { attempts: 1 }
            }
            StoreError::EmailTaken => Self::EmailTaken,
            StoreError::Unavailable { message } => Self::StorageUnavailable { message },
        }
    }
}

impl From<CohortError> for EngineError {
    fn from(err: CohortError) -> Self {
        match err {
            CohortError::Unavailable { message } => Self::StorageUnavailable { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            EngineError::InsufficientPoints {
                requested: 5,
                available: 2
            }
            .code(),
            ErrorCode::InsufficientPoints
        );
        assert_eq!(
            EngineError::NotRegistered {
                player_id: PlayerId(1)
            }
            .code(),
            ErrorCode::NotRegistered
        );
    }

    #[test]
    fn store_errors_map_to_engine_errors() {
        let err = EngineError::from(StoreError::Unavailable {
            message: "down".to_owned(),
        });
        assert_eq!(err.code(), ErrorCode::StorageUnavailable);
        assert_eq!(
            EngineError::from(StoreError::EmailTaken).code(),
            ErrorCode::EmailTaken
        );
        assert_eq!(
            EngineError::from(StoreError::VersionConflict).code(),
            ErrorCode::VersionConflict
        );
    }
}

//! # OpenHouse Common
//!
//! Common types shared by the OpenHouse fighter crates.
//!
//! This crate provides:
//! - Player slots and facing directions
//! - Archetype ids
//! - Schema versions for tuning tables and scripts
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_rivalry() {
        assert_eq!(PlayerSlot::Left.rival(), PlayerSlot::Right);
        assert_eq!(PlayerSlot::Right.rival(), PlayerSlot::Left);
        assert_eq!(PlayerSlot::from_index(1), Some(PlayerSlot::Right));
        assert_eq!(PlayerSlot::from_index(2), None);
    }

    #[test]
    fn test_slot_facing_is_mirrored() {
        let left = PlayerSlot::Left.facing();
        let right = PlayerSlot::Right.facing();
        assert_eq!(left.sign(), 1.0);
        assert_eq!(right.sign(), -1.0);
        assert_eq!(left.flipped(), right);
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = SchemaVersion::new(1, 0, 0);
        let v2 = SchemaVersion::new(1, 1, 0);
        let v3 = SchemaVersion::new(2, 0, 0);

        // v2 can read v1 data (newer version reading older data)
        assert!(v2.is_compatible_with(&v1));
        // Different major versions are incompatible
        assert!(!v1.is_compatible_with(&v3));
        assert!(!v3.can_read(&v1));
    }

    #[test]
    fn test_unknown_archetype_message() {
        let err = ArchetypeError::Unknown { id: 9, available: 4 };
        assert_eq!(
            err.to_string(),
            "unknown archetype id 9 (table has 4 archetypes)"
        );
    }
}

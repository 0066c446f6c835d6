//! Error types for OpenHouse.

use thiserror::Error;

use crate::version::SchemaVersion;

/// Top-level error type for OpenHouse operations.
#[derive(Debug, Error)]
pub enum OpenHouseError {
    /// Archetype lookup errors
    #[error("Archetype error: {0}")]
    Archetype(#[from] ArchetypeError),

    /// Tuning table errors
    #[error("Tuning error: {0}")]
    Tuning(#[from] TuningError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Archetype lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArchetypeError {
    /// The id does not index into the archetype table.
    #[error("unknown archetype id {id} (table has {available} archetypes)")]
    Unknown {
        /// Requested id
        id: u8,
        /// Number of archetypes in the table
        available: usize,
    },
}

/// Errors raised while loading or validating a tuning table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    /// The tuning file could not be parsed.
    #[error("Failed to parse tuning table: {0}")]
    Parse(String),

    /// The table contains no archetypes.
    #[error("Tuning table is empty")]
    Empty,

    /// A value in the table is out of its allowed domain.
    #[error("Invalid tuning for '{archetype}': {reason}")]
    Invalid {
        /// Archetype display name
        archetype: String,
        /// What is wrong
        reason: String,
    },

    /// Schema version mismatch
    #[error("Tuning schema mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build understands
        expected: SchemaVersion,
        /// Version found in the file
        actual: SchemaVersion,
    },
}

/// Result type alias for OpenHouse operations.
pub type OpenHouseResult<T> = Result<T, OpenHouseError>;

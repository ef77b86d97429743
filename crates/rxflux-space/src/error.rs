//! Error types for geometry construction and lookups.

use std::fmt;

use crate::section::SectionId;

/// Errors arising from geometry construction or spatial queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SpaceError {
    /// Attempted to build a geometry with zero cells.
    EmptySpace,
    /// A section's dimensions are invalid.
    InvalidSection {
        /// What went wrong.
        reason: String,
    },
    /// A section id does not belong to this geometry.
    UnknownSection(SectionId),
    /// A normalized position is outside `[0, 1]`.
    PositionOutOfRange {
        /// The offending position.
        x: f64,
    },
    /// A connection would not leave the sections forming a tree.
    InvalidConnection {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "space must have at least one cell"),
            Self::InvalidSection { reason } => write!(f, "invalid section: {reason}"),
            Self::UnknownSection(id) => write!(f, "unknown section {id}"),
            Self::PositionOutOfRange { x } => {
                write!(f, "position {x} out of range [0, 1]")
            }
            Self::InvalidConnection { reason } => write!(f, "invalid connection: {reason}"),
        }
    }
}

impl std::error::Error for SpaceError {}

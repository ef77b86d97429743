//! Geometry for rxflux simulations.
//!
//! This crate defines the [`Space`] trait, through which rate terms find a
//! cell's neighbours, volume, and diffusive coupling, and the branched
//! [`Cable`] geometry built from unbranched [`Section`]s.
//!
//! Cells are identified by a dense rank `0..cell_count()`. A cable assigns
//! ranks section by section in insertion order, segments from the 0-end to
//! the 1-end.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cable;
pub mod error;
pub mod section;
pub mod space;

#[cfg(test)]
pub(crate) mod compliance;

pub use cable::{Cable, CableBuilder, Connection};
pub use error::SpaceError;
pub use section::{Section, SectionId};
pub use space::Space;

//! Core types and traits for the rxflux reaction-diffusion integrator.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! identifiers, error types, species definitions, the step snapshot, and
//! the read-only traits shared by the flux, rate, and engine crates.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod snapshot;
pub mod species;
pub mod traits;

pub use error::{FluxError, ModelError, RateError, StepError};
pub use id::{FluxHandle, NodeId, SpaceInstanceId, SpeciesId, StepIndex};
pub use snapshot::Snapshot;
pub use species::{Initial, NodeSite, SpeciesDef};
pub use traits::{ConcentrationReader, NodeLocator};

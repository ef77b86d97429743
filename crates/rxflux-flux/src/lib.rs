//! Flux injection for rxflux nodes.
//!
//! A [`FluxSource`] is one externally supplied contribution to a node's
//! rate of change: a constant, a user callback, or a reference to another
//! node's concentration. Each node owns a [`FluxRegistry`] whose sources
//! are evaluated against the step-start [`Snapshot`](rxflux_core::Snapshot)
//! and summed in registration order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod registry;
pub mod source;

pub use registry::{FluxEntry, FluxRegistry, SourceError};
pub use source::{FluxCallback, FluxKind, FluxSource, FluxUnits};

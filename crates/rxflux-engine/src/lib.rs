//! Two-phase time integrator for rxflux reaction-diffusion models.
//!
//! [`Integrator`] owns the node table and advances it step by step:
//! capture a [`Snapshot`](rxflux_core::Snapshot), evaluate every node's
//! rate terms and flux sources against it, then commit all new
//! concentrations at once. Failed steps leave no trace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod integrator;
pub mod metrics;
pub mod node;

pub use config::{ConfigError, IntegratorConfig, ParallelConfig};
pub use integrator::Integrator;
pub use metrics::{StepMetrics, StepReport};
pub use node::Node;

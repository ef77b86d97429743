//! Reference rate terms for rxflux.
//!
//! - [`CableDiffusion`]: finite-volume diffusion between neighbouring cells
//!   of the same species.
//! - [`FirstOrderDecay`]: linear degradation of one species.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod decay;
pub mod diffusion;

pub use decay::FirstOrderDecay;
pub use diffusion::{CableDiffusion, CableDiffusionBuilder};

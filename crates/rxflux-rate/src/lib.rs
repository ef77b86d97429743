//! Rate term trait and evaluation context for rxflux.
//!
//! A [`RateTerm`] contributes a diffusion or reaction rate to each node
//! during the evaluation phase of a step. Terms see only the step-start
//! snapshot through a [`RateContext`], so they can run on any node in any
//! order. [`validate_terms`] checks a term list once at startup.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod context;
pub mod pipeline;
pub mod term;

pub use context::RateContext;
pub use pipeline::{validate_terms, PipelineError, TermPlan};
pub use term::RateTerm;

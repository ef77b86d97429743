//! Error types for the rxflux integrator.
//!
//! Organized by subsystem: flux evaluation, rate terms, stepping, and
//! model building.

use std::error::Error;
use std::fmt;

use crate::id::{FluxHandle, NodeId, SpeciesId, StepIndex};

/// Errors from evaluating a single flux source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FluxError {
    /// A callback source failed to produce a numeric value: it returned
    /// an error, panicked, or returned NaN.
    InvocationFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A reference source names a node absent from the step snapshot.
    DanglingReference {
        /// The node the source refers to.
        target: NodeId,
    },
}

impl fmt::Display for FluxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvocationFailed { reason } => write!(f, "callback invocation failed: {reason}"),
            Self::DanglingReference { target } => {
                write!(f, "reference to node {target} which does not exist")
            }
        }
    }
}

impl Error for FluxError {}

/// Errors from a diffusion/reaction term.
///
/// Returned by `RateTerm::rate()` and wrapped in
/// [`StepError::RateFailed`] by the integrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RateError {
    /// The term could not be evaluated.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A term-specific constraint was violated.
    ConstraintViolation {
        /// Description of the violated constraint.
        constraint: String,
    },
}

impl fmt::Display for RateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::ConstraintViolation { constraint } => {
                write!(f, "constraint violation: {constraint}")
            }
        }
    }
}

impl Error for RateError {}

/// Errors from the integrator during `step()`.
///
/// Every variant aborts the whole step: no node is updated.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A flux source failed to evaluate.
    FluxEvaluation {
        /// Node whose registry holds the failing source.
        node: NodeId,
        /// The step being computed.
        step: StepIndex,
        /// The failing entry.
        source: FluxHandle,
        /// The underlying flux error.
        reason: FluxError,
    },
    /// A diffusion/reaction term failed.
    RateFailed {
        /// Name of the failing term.
        term: String,
        /// Node being evaluated.
        node: NodeId,
        /// The step being computed.
        step: StepIndex,
        /// The underlying term error.
        reason: RateError,
    },
    /// A post-update concentration is NaN or infinite.
    Divergence {
        /// The offending node.
        node: NodeId,
        /// The step being computed.
        step: StepIndex,
        /// The non-finite value that would have been stored.
        value: f64,
    },
    /// The requested dt is NaN, infinite, zero, or negative.
    InvalidDt {
        /// The invalid value.
        value: f64,
    },
    /// The requested dt exceeds a term's stability limit.
    DtOutOfRange {
        /// The dt that was requested.
        dt: f64,
        /// The tightest `max_dt` constraint.
        max_supported: f64,
        /// Which term constrains it.
        constraining_term: String,
    },
}

impl StepError {
    /// The node the error is attributed to, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Self::FluxEvaluation { node, .. }
            | Self::RateFailed { node, .. }
            | Self::Divergence { node, .. } => Some(*node),
            Self::InvalidDt { .. } | Self::DtOutOfRange { .. } => None,
        }
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FluxEvaluation {
                node,
                step,
                source,
                reason,
            } => write!(
                f,
                "flux source {source} on node {node} failed at step {step}: {reason}"
            ),
            Self::RateFailed {
                term,
                node,
                step,
                reason,
            } => write!(
                f,
                "rate term '{term}' failed on node {node} at step {step}: {reason}"
            ),
            Self::Divergence { node, step, value } => write!(
                f,
                "concentration of node {node} diverged to {value} at step {step}"
            ),
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::DtOutOfRange {
                dt,
                max_supported,
                constraining_term,
            } => write!(
                f,
                "dt {dt} exceeds max_dt {max_supported} (constrained by '{constraining_term}')"
            ),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FluxEvaluation { reason, .. } => Some(reason),
            Self::RateFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Errors from building or editing the node table between steps.
#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    /// No node with this id exists.
    UnknownNode(NodeId),
    /// No species with this id exists.
    UnknownSpecies(SpeciesId),
    /// The location rank is outside the geometry.
    LocationOutOfRange {
        /// The requested rank.
        location: usize,
        /// Number of cells in the geometry.
        cell_count: usize,
    },
    /// A node of this species already occupies the location.
    LocationOccupied {
        /// The species.
        species: SpeciesId,
        /// The occupied rank.
        location: usize,
        /// The node already there.
        existing: NodeId,
    },
    /// A concentration must be finite.
    NonFiniteConcentration {
        /// The node being set.
        node: NodeId,
        /// The rejected value.
        value: f64,
    },
    /// The node id space is exhausted.
    NodeIdOverflow,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "unknown node {id}"),
            Self::UnknownSpecies(id) => write!(f, "unknown species {id}"),
            Self::LocationOutOfRange {
                location,
                cell_count,
            } => write!(f, "location {location} out of range [0, {cell_count})"),
            Self::LocationOccupied {
                species,
                location,
                existing,
            } => write!(
                f,
                "species {species} already has node {existing} at location {location}"
            ),
            Self::NonFiniteConcentration { node, value } => {
                write!(f, "concentration for node {node} must be finite, got {value}")
            }
            Self::NodeIdOverflow => write!(f, "node id space exhausted"),
        }
    }
}

impl Error for ModelError {}

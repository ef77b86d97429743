//! Startup validation of the rate term list.
//!
//! [`validate_terms`] runs once when the integrator is built and produces
//! a [`TermPlan`] holding the tightest timestep constraint, which every
//! `step()` consults before touching any node.

use indexmap::IndexMap;
use rxflux_core::{SpeciesDef, StepError};
use rxflux_space::Space;

use crate::term::RateTerm;

use std::error::Error;
use std::fmt;

// ── Plan ───────────────────────────────────────────────────────────

/// The validated shape of a term list.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct TermPlan {
    names: Vec<String>,
    max_dt: Option<f64>,
    constraining_term: Option<String>,
}

impl TermPlan {
    /// Term names in evaluation order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no terms.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The tightest `max_dt` across all terms, if any term imposes one.
    pub fn max_dt(&self) -> Option<f64> {
        self.max_dt
    }

    /// Name of the term that imposes [`max_dt`](TermPlan::max_dt).
    pub fn constraining_term(&self) -> Option<&str> {
        self.constraining_term.as_deref()
    }

    /// Check a requested timestep.
    ///
    /// Rejects NaN, infinite, zero, and negative values with
    /// [`StepError::InvalidDt`], and values above the tightest constraint
    /// with [`StepError::DtOutOfRange`].
    pub fn check_dt(&self, dt: f64) -> Result<(), StepError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(StepError::InvalidDt { value: dt });
        }
        if let Some(max) = self.max_dt {
            if dt > max {
                return Err(StepError::DtOutOfRange {
                    dt,
                    max_supported: max,
                    constraining_term: self.constraining_term.clone().unwrap_or_default(),
                });
            }
        }
        Ok(())
    }
}

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from term validation (startup-time, not per-step).
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Two terms share a name, which would make error reports ambiguous.
    DuplicateTerm {
        /// The repeated name.
        name: String,
        /// Positions of the first and second occurrence.
        positions: (usize, usize),
    },

    /// A term's `max_dt()` returned a non-finite or non-positive value.
    InvalidMaxDt {
        /// Which term.
        term: String,
        /// The invalid max_dt value.
        value: f64,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTerm { name, positions } => write!(
                f,
                "rate term name '{name}' used at positions {} and {}",
                positions.0, positions.1
            ),
            Self::InvalidMaxDt { term, value } => write!(
                f,
                "rate term '{term}' returned invalid max_dt: {value} \
                 (must be finite and positive)"
            ),
        }
    }
}

impl Error for PipelineError {}

// ── Validation ─────────────────────────────────────────────────────

/// Validate a term list against a geometry and species set.
///
/// Checks performed:
///
/// 1. Term names are unique.
/// 2. Every `max_dt()` is `None` or finite and positive.
///
/// An empty list is valid: nodes then change only through injected flux.
pub fn validate_terms(
    terms: &[Box<dyn RateTerm>],
    space: &dyn Space,
    species: &[SpeciesDef],
) -> Result<TermPlan, PipelineError> {
    let mut seen: IndexMap<&str, usize> = IndexMap::with_capacity(terms.len());
    for (i, term) in terms.iter().enumerate() {
        if let Some(&first) = seen.get(term.name()) {
            return Err(PipelineError::DuplicateTerm {
                name: term.name().to_string(),
                positions: (first, i),
            });
        }
        seen.insert(term.name(), i);
    }

    let mut max_dt: Option<f64> = None;
    let mut constraining_term = None;
    for term in terms {
        if let Some(max) = term.max_dt(space, species) {
            if !max.is_finite() || max <= 0.0 {
                return Err(PipelineError::InvalidMaxDt {
                    term: term.name().to_string(),
                    value: max,
                });
            }
            if max_dt.is_none_or(|cur| max < cur) {
                max_dt = Some(max);
                constraining_term = Some(term.name().to_string());
            }
        }
    }

    Ok(TermPlan {
        names: seen.keys().map(|s| s.to_string()).collect(),
        max_dt,
        constraining_term,
    })
}

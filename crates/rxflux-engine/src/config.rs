//! Integrator configuration, validation, and error types.
//!
//! [`IntegratorConfig`] is the input for constructing an
//! [`Integrator`](crate::Integrator). [`validate()`](IntegratorConfig::validate)
//! checks structural invariants up front; the constructor calls it and then
//! keeps the resulting [`TermPlan`] for per-step dt checks.

use std::error::Error;
use std::fmt;

use indexmap::IndexSet;
use rxflux_core::{ModelError, SpeciesDef};
use rxflux_rate::{validate_terms, PipelineError, RateTerm, TermPlan};
use rxflux_space::{Space, SpaceError};

// ── ParallelConfig ─────────────────────────────────────────────────

/// When the evaluation phase of a step runs on the rayon pool.
///
/// Parallel and sequential evaluation produce bitwise identical results;
/// this only trades thread overhead against throughput.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Evaluate in parallel once the node count reaches this threshold.
    /// `None` always evaluates sequentially. Default: `Some(4096)`.
    pub min_nodes: Option<usize>,
}

impl ParallelConfig {
    /// Always evaluate sequentially.
    pub fn sequential() -> Self {
        Self { min_nodes: None }
    }

    /// Always evaluate in parallel.
    pub fn always() -> Self {
        Self { min_nodes: Some(0) }
    }

    /// Whether a step over `node_count` nodes should run in parallel.
    pub fn use_parallel(&self, node_count: usize) -> bool {
        self.min_nodes.is_some_and(|min| node_count >= min)
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            min_nodes: Some(4096),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating an [`IntegratorConfig`] or building
/// an integrator from it.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Rate term validation failed.
    Pipeline(PipelineError),
    /// The geometry could not be built.
    Space(SpaceError),
    /// Initial conditions could not be applied.
    Model(ModelError),
    /// Space has zero cells.
    EmptySpace,
    /// No species registered.
    NoSpecies,
    /// A species definition failed validation.
    InvalidSpecies {
        /// Description of the validation failure.
        reason: String,
    },
    /// Two species share a name.
    DuplicateSpecies {
        /// The repeated name.
        name: String,
    },
    /// `species × cells` does not fit the `u32` node id space.
    NodeCountOverflow {
        /// The value that overflowed.
        value: usize,
    },
    /// dt is NaN, infinite, zero, or negative.
    InvalidDt {
        /// The invalid value.
        value: f64,
    },
    /// The configured dt exceeds a term's `max_dt`.
    DtTooLarge {
        /// The dt that was configured.
        configured_dt: f64,
        /// The tightest `max_dt` constraint.
        max_supported: f64,
        /// Which term constrains it.
        constraining_term: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pipeline(e) => write!(f, "rate terms: {e}"),
            Self::Space(e) => write!(f, "space: {e}"),
            Self::Model(e) => write!(f, "model: {e}"),
            Self::EmptySpace => write!(f, "space has zero cells"),
            Self::NoSpecies => write!(f, "no species registered"),
            Self::InvalidSpecies { reason } => write!(f, "invalid species: {reason}"),
            Self::DuplicateSpecies { name } => write!(f, "species name '{name}' is used twice"),
            Self::NodeCountOverflow { value } => {
                write!(f, "node count {value} exceeds u32::MAX")
            }
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::DtTooLarge {
                configured_dt,
                max_supported,
                constraining_term,
            } => write!(
                f,
                "dt {configured_dt} exceeds max_dt {max_supported} \
                 (constrained by '{constraining_term}')"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Pipeline(e) => Some(e),
            Self::Space(e) => Some(e),
            Self::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PipelineError> for ConfigError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        Self::Space(e)
    }
}

impl From<ModelError> for ConfigError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

// ── IntegratorConfig ───────────────────────────────────────────────

/// Complete configuration for constructing an integrator.
pub struct IntegratorConfig {
    /// The geometry.
    pub space: Box<dyn Space>,
    /// Species definitions. `SpeciesId(n)` corresponds to `species[n]`.
    pub species: Vec<SpeciesDef>,
    /// Rate terms, summed in this order for every node.
    pub terms: Vec<Box<dyn RateTerm>>,
    /// Default timestep, used by `continue_run`.
    pub dt: f64,
    /// Evaluation-phase threading.
    pub parallel: ParallelConfig,
}

impl IntegratorConfig {
    /// A configuration with no rate terms and default threading.
    pub fn new(space: impl Space, species: Vec<SpeciesDef>, dt: f64) -> Self {
        Self {
            space: Box::new(space),
            species,
            terms: Vec::new(),
            dt,
            parallel: ParallelConfig::default(),
        }
    }

    /// Append a rate term.
    pub fn with_term(mut self, term: impl RateTerm) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    /// Override the threading policy.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let _ = self.validated_plan()?;
        Ok(())
    }

    /// Validate and return the term plan.
    pub(crate) fn validated_plan(&self) -> Result<TermPlan, ConfigError> {
        // 1. Space must have at least one cell.
        let cell_count = self.space.cell_count();
        if cell_count == 0 {
            return Err(ConfigError::EmptySpace);
        }
        // 2. Must have at least one species, each valid, names unique.
        if self.species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        let mut names = IndexSet::with_capacity(self.species.len());
        for def in &self.species {
            def.validate()
                .map_err(|reason| ConfigError::InvalidSpecies { reason })?;
            if !names.insert(def.name.as_str()) {
                return Err(ConfigError::DuplicateSpecies {
                    name: def.name.clone(),
                });
            }
        }
        // 3. One node per species per cell must fit the id space.
        let node_count = self
            .species
            .len()
            .checked_mul(cell_count)
            .unwrap_or(usize::MAX);
        if u32::try_from(node_count).is_err() {
            return Err(ConfigError::NodeCountOverflow { value: node_count });
        }
        // 4. dt must be finite and positive.
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidDt { value: self.dt });
        }
        // 5. Terms validate and the default dt respects every max_dt.
        let plan = validate_terms(&self.terms, self.space.as_ref(), &self.species)?;
        if let Some(max) = plan.max_dt() {
            if self.dt > max {
                return Err(ConfigError::DtTooLarge {
                    configured_dt: self.dt,
                    max_supported: max,
                    constraining_term: plan.constraining_term().unwrap_or_default().to_string(),
                });
            }
        }
        Ok(plan)
    }
}

impl fmt::Debug for IntegratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegratorConfig")
            .field("space_cell_count", &self.space.cell_count())
            .field("species", &self.species)
            .field("terms", &self.terms.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("dt", &self.dt)
            .field("parallel", &self.parallel)
            .finish()
    }
}

//! Species definitions and node sites.

use std::fmt;
use std::sync::Arc;

use crate::id::{NodeId, SpeciesId};

/// Initial condition applied to every node of a species on initialization.
#[derive(Clone)]
pub enum Initial {
    /// The same concentration everywhere.
    Uniform(f64),
    /// Concentration as a function of the node's location rank.
    Function(Arc<dyn Fn(usize) -> f64 + Send + Sync>),
}

impl Initial {
    /// Wrap a closure of the location rank.
    pub fn from_fn(f: impl Fn(usize) -> f64 + Send + Sync + 'static) -> Self {
        Self::Function(Arc::new(f))
    }

    /// Initial concentration at `location`.
    pub fn value_at(&self, location: usize) -> f64 {
        match self {
            Self::Uniform(v) => *v,
            Self::Function(f) => f(location),
        }
    }
}

impl Default for Initial {
    fn default() -> Self {
        Self::Uniform(0.0)
    }
}

impl fmt::Debug for Initial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(v) => f.debug_tuple("Uniform").field(v).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Definition of a chemical species tracked by the integrator.
///
/// Species are registered at construction; `SpeciesId` is the index into
/// the species list.
#[derive(Clone, Debug)]
pub struct SpeciesDef {
    /// Human-readable name for diagnostics.
    pub name: String,
    /// Diffusion coefficient (length²/time). Zero disables diffusion.
    pub diffusion: f64,
    /// Initial concentration.
    pub initial: Initial,
}

impl SpeciesDef {
    /// A non-diffusing species with zero initial concentration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffusion: 0.0,
            initial: Initial::default(),
        }
    }

    /// Set the diffusion coefficient.
    pub fn with_diffusion(mut self, d: f64) -> Self {
        self.diffusion = d;
        self
    }

    /// Set the initial condition.
    pub fn with_initial(mut self, initial: Initial) -> Self {
        self.initial = initial;
        self
    }

    /// Check structural invariants.
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("species name must not be empty".to_string());
        }
        if !self.diffusion.is_finite() || self.diffusion < 0.0 {
            return Err(format!(
                "species '{}': diffusion must be finite and non-negative, got {}",
                self.name, self.diffusion
            ));
        }
        if let Initial::Uniform(v) = self.initial {
            if !v.is_finite() {
                return Err(format!(
                    "species '{}': initial concentration must be finite, got {v}",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

/// Where a node lives: its species and its location rank in the geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeSite {
    /// The node.
    pub id: NodeId,
    /// Species whose concentration the node holds.
    pub species: SpeciesId,
    /// Cell rank in the geometry.
    pub location: usize,
}

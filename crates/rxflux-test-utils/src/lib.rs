//! Test utilities and mock types for rxflux development.
//!
//! Provides mock implementations of the core reader traits
//! ([`ConcentrationReader`], [`NodeLocator`]), reusable rate term
//! fixtures, trajectory recording and comparison, and an independent
//! reference solver for uniform cables.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::HashMap;

use rxflux_core::{ConcentrationReader, NodeId, NodeLocator, SpeciesId};
use rxflux_space::{Cable, Section};

pub mod fixtures;
pub mod reference;
pub mod trajectory;

pub use fixtures::{ConstRate, FailingRate};
pub use reference::UniformCableReference;
pub use trajectory::{max_relative_error, trajectory_hash, Trajectory};

/// Mock implementation of [`ConcentrationReader`].
///
/// Backed by a `HashMap<NodeId, f64>`. Absent nodes read as `None`.
#[derive(Clone, Debug, Default)]
pub struct MockConcentrations {
    values: HashMap<NodeId, f64>,
}

impl MockConcentrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concentration a node reads as.
    pub fn set(&mut self, node: NodeId, value: f64) {
        self.values.insert(node, value);
    }

    /// Forget a node so that it reads as absent.
    pub fn remove(&mut self, node: NodeId) {
        self.values.remove(&node);
    }
}

impl ConcentrationReader for MockConcentrations {
    fn concentration(&self, node: NodeId) -> Option<f64> {
        self.values.get(&node).copied()
    }
}

/// Mock implementation of [`NodeLocator`].
#[derive(Clone, Debug, Default)]
pub struct MockLocator {
    sites: HashMap<(SpeciesId, usize), NodeId>,
}

impl MockLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `node` at `(species, location)`.
    pub fn insert(&mut self, species: SpeciesId, location: usize, node: NodeId) {
        self.sites.insert((species, location), node);
    }
}

impl NodeLocator for MockLocator {
    fn locate(&self, species: SpeciesId, location: usize) -> Option<NodeId> {
        self.sites.get(&(species, location)).copied()
    }
}

/// A single-section cable.
///
/// # Panics
///
/// Panics on invalid dimensions.
pub fn uniform_cable(length: f64, nseg: u32, diam: f64) -> Cable {
    let section = Section::new("sec", length, nseg, diam).expect("valid section");
    Cable::single(section).expect("non-empty cable")
}

//! Read-only access traits used during the evaluation phase of a step.

use crate::id::{NodeId, SpeciesId};

/// Read-only access to node concentrations.
///
/// Implemented by [`Snapshot`](crate::Snapshot) so that flux sources read
/// step-start values, and by mocks in tests. Returns `None` if the node
/// does not exist.
pub trait ConcentrationReader: Sync {
    /// Concentration of `node`, or `None` if it is not present.
    fn concentration(&self, node: NodeId) -> Option<f64>;
}

/// Maps a `(species, location)` pair to the node that holds it.
///
/// Used by rate terms to find a node's spatial neighbours of the same
/// species.
pub trait NodeLocator: Sync {
    /// The node of `species` at location rank `location`, if any.
    fn locate(&self, species: SpeciesId, location: usize) -> Option<NodeId>;
}

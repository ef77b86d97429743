//! The immutable step-start view of all node concentrations.

use indexmap::IndexMap;

use crate::id::{NodeId, StepIndex};
use crate::traits::ConcentrationReader;

/// Concentrations of every node as of the start of a step.
///
/// Captured once by the integrator before any node is evaluated, then
/// only read for the rest of the step. Entries keep the integrator's node
/// order, so positional access via [`get_index`](Snapshot::get_index)
/// lines up with the node table.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    step: StepIndex,
    time: f64,
    values: IndexMap<NodeId, f64>,
}

impl Snapshot {
    /// Capture `(node, concentration)` pairs in iteration order.
    ///
    /// `step` is the index of the step this snapshot feeds, `time` the
    /// simulation time at its start. A repeated node id keeps its first
    /// position and the last value.
    pub fn capture(
        step: StepIndex,
        time: f64,
        values: impl IntoIterator<Item = (NodeId, f64)>,
    ) -> Self {
        Self {
            step,
            time,
            values: values.into_iter().collect(),
        }
    }

    /// The step this snapshot feeds.
    pub fn step(&self) -> StepIndex {
        self.step
    }

    /// Simulation time at the start of the step.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of nodes captured.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no nodes were captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Concentration of `node` at step start.
    pub fn get(&self, node: NodeId) -> Option<f64> {
        self.values.get(&node).copied()
    }

    /// Whether `node` was present at step start.
    pub fn contains(&self, node: NodeId) -> bool {
        self.values.contains_key(&node)
    }

    /// The `i`-th captured entry in node order.
    pub fn get_index(&self, i: usize) -> Option<(NodeId, f64)> {
        self.values.get_index(i).map(|(&id, &v)| (id, v))
    }

    /// Iterate over `(node, concentration)` in node order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.values.iter().map(|(&id, &v)| (id, v))
    }
}

impl ConcentrationReader for Snapshot {
    fn concentration(&self, node: NodeId) -> Option<f64> {
        self.get(node)
    }
}

//! Per-node ordered collection of flux sources.

use std::error::Error;
use std::fmt;

use rxflux_core::{ConcentrationReader, FluxError, FluxHandle, NodeId};

use crate::source::FluxSource;

/// A registered source and the factor its value is scaled by.
#[derive(Clone, Debug)]
pub struct FluxEntry {
    /// The source.
    pub source: FluxSource,
    /// Multiplier applied to the source's value. `1.0` for plain
    /// registrations.
    pub weight: f64,
}

impl FluxEntry {
    /// The weighted contribution of this entry for the step.
    pub fn contribution(&self, snapshot: &dyn ConcentrationReader) -> Result<f64, FluxError> {
        Ok(self.weight * self.source.evaluate(snapshot)?)
    }
}

/// A [`FluxError`] tagged with the entry that produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceError {
    /// The failing entry.
    pub handle: FluxHandle,
    /// What went wrong.
    pub error: FluxError,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flux source {}: {}", self.handle, self.error)
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// The flux sources attached to one node, in registration order.
///
/// Registering the same source twice makes it contribute twice. Entries
/// are summed left to right, so the total is reproducible bit for bit.
///
/// # Examples
///
/// ```
/// use rxflux_core::{NodeId, Snapshot, StepIndex};
/// use rxflux_flux::{FluxRegistry, FluxSource};
///
/// let snap = Snapshot::capture(StepIndex(1), 0.0, [(NodeId(1), 10.0)]);
/// let mut reg = FluxRegistry::new(NodeId(0));
/// reg.register(FluxSource::constant(1.5));
/// reg.register(FluxSource::reference(NodeId(1)));
/// assert_eq!(reg.total_flux(&snap), Ok(11.5));
/// ```
#[derive(Clone, Debug)]
pub struct FluxRegistry {
    node: NodeId,
    entries: Vec<FluxEntry>,
}

impl FluxRegistry {
    /// An empty registry owned by `node`.
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            entries: Vec::new(),
        }
    }

    /// The owning node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Append a source with weight `1.0`.
    pub fn register(&mut self, source: FluxSource) -> FluxHandle {
        self.register_weighted(source, 1.0)
    }

    /// Append a source whose value is multiplied by `weight`.
    pub fn register_weighted(&mut self, source: FluxSource, weight: f64) -> FluxHandle {
        let handle = FluxHandle {
            node: self.node,
            index: self.entries.len() as u32,
        };
        self.entries.push(FluxEntry { source, weight });
        handle
    }

    /// Sum every entry's contribution in registration order.
    ///
    /// Returns `0.0` when empty. Stops at the first failing entry.
    pub fn total_flux(&self, snapshot: &dyn ConcentrationReader) -> Result<f64, SourceError> {
        let mut total = 0.0;
        for (i, entry) in self.entries.iter().enumerate() {
            total += entry.contribution(snapshot).map_err(|error| SourceError {
                handle: FluxHandle {
                    node: self.node,
                    index: i as u32,
                },
                error,
            })?;
        }
        Ok(total)
    }

    /// Remove every entry. Handles issued earlier become meaningless.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no source is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, FluxEntry> {
        self.entries.iter()
    }

    /// The entry behind `handle`, if it belongs to this registry.
    pub fn get(&self, handle: FluxHandle) -> Option<&FluxEntry> {
        if handle.node != self.node {
            return None;
        }
        self.entries.get(handle.index as usize)
    }
}

impl<'a> IntoIterator for &'a FluxRegistry {
    type Item = &'a FluxEntry;
    type IntoIter = std::slice::Iter<'a, FluxEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rxflux_test_utils::MockConcentrations;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn empty() -> MockConcentrations {
        MockConcentrations::new()
    }

    #[test]
    fn empty_registry_totals_zero() {
        let reg = FluxRegistry::new(NodeId(0));
        assert!(reg.is_empty());
        assert_eq!(reg.total_flux(&empty()), Ok(0.0));
    }

    #[test]
    fn handles_follow_insertion_order() {
        let mut reg = FluxRegistry::new(NodeId(4));
        let a = reg.register(FluxSource::constant(1.0));
        let b = reg.register(FluxSource::constant(2.0));
        assert_eq!(a, FluxHandle { node: NodeId(4), index: 0 });
        assert_eq!(b, FluxHandle { node: NodeId(4), index: 1 });
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.node(), NodeId(4));
        assert!(reg.get(b).is_some());
        assert!(reg.get(FluxHandle { node: NodeId(5), index: 0 }).is_none());
    }

    #[test]
    fn repeated_registration_accumulates() {
        let mut reg = FluxRegistry::new(NodeId(0));
        reg.register(FluxSource::constant(1000.0));
        reg.register(FluxSource::constant(1000.0));
        assert_eq!(reg.total_flux(&empty()), Ok(2000.0));
    }

    #[test]
    fn weighted_entry_scales_value() {
        let mut reg = FluxRegistry::new(NodeId(0));
        reg.register_weighted(FluxSource::constant(10.0), 0.25);
        reg.register(FluxSource::constant(1.0));
        assert_eq!(reg.total_flux(&empty()), Ok(3.5));
    }

    #[test]
    fn first_failure_is_reported_with_handle() {
        let mut reg = FluxRegistry::new(NodeId(2));
        reg.register(FluxSource::constant(1.0));
        reg.register(FluxSource::reference(NodeId(77)));
        reg.register(FluxSource::callback(|| f64::NAN));
        let err = reg.total_flux(&empty()).unwrap_err();
        assert_eq!(err.handle, FluxHandle { node: NodeId(2), index: 1 });
        assert_eq!(err.error, FluxError::DanglingReference { target: NodeId(77) });
        assert!(err.to_string().contains("2#1"));
    }

    #[test]
    fn failure_stops_later_callbacks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let mut reg = FluxRegistry::new(NodeId(0));
        reg.register(FluxSource::reference(NodeId(1)));
        reg.register(FluxSource::callback(move || {
            c.fetch_add(1, Ordering::SeqCst);
            1.0
        }));
        assert!(reg.total_flux(&empty()).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn clear_empties_registry() {
        let mut reg = FluxRegistry::new(NodeId(0));
        reg.register(FluxSource::constant(1.0));
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.total_flux(&empty()), Ok(0.0));
    }

    #[test]
    fn mixed_sources_sum() {
        let mut snap = MockConcentrations::new();
        snap.set(NodeId(9), 1000.0);
        let mut reg = FluxRegistry::new(NodeId(0));
        reg.register(FluxSource::constant(1000.0));
        reg.register(FluxSource::callback(|| 1000.0));
        reg.register(FluxSource::reference(NodeId(9)));
        assert_eq!(reg.total_flux(&snap), Ok(3000.0));
        let kinds: Vec<_> = reg.iter().map(|e| e.source.kind()).collect();
        assert_eq!(kinds.len(), 3);
    }

    proptest! {
        #[test]
        fn constants_add(rates in prop::collection::vec(-1e3f64..1e3, 0..32)) {
            let mut reg = FluxRegistry::new(NodeId(0));
            for &r in &rates {
                reg.register(FluxSource::constant(r));
            }
            let expected = rates.iter().fold(0.0, |acc, r| acc + r);
            prop_assert_eq!(reg.total_flux(&empty()).unwrap(), expected);
        }

        #[test]
        fn total_is_deterministic(rates in prop::collection::vec(-1e6f64..1e6, 1..32)) {
            let mut reg = FluxRegistry::new(NodeId(0));
            for &r in &rates {
                reg.register(FluxSource::constant(r));
            }
            let a = reg.total_flux(&empty()).unwrap();
            let b = reg.total_flux(&empty()).unwrap();
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}

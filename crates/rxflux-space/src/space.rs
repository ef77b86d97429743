//! The core `Space` trait and `dyn Space` downcast support.

use rxflux_core::SpaceInstanceId;
use smallvec::SmallVec;
use std::any::Any;

/// Spatial abstraction for rxflux simulations.
///
/// Rate terms see the geometry only through this trait. Cells are dense
/// ranks `0..cell_count()`; methods taking a rank may panic when it is out
/// of range.
///
/// # Object Safety
///
/// This trait is designed for use as `dyn Space`. Use `downcast_ref` for
/// opt-in specialization on concrete types.
///
/// # Thread Safety
///
/// `Sync` is required because the evaluation phase may read the geometry
/// from several worker threads at once.
pub trait Space: Any + Send + Sync + 'static {
    /// Total number of cells.
    fn cell_count(&self) -> usize;

    /// Ranks of the cells sharing a face with `rank`.
    ///
    /// Returns ranks in a deterministic, backend-defined order. Never
    /// contains `rank` itself.
    fn neighbours(&self, rank: usize) -> SmallVec<[usize; 4]>;

    /// Volume of a cell.
    fn volume(&self, rank: usize) -> f64;

    /// Diffusive coupling between two cells: shared face area divided by
    /// centre-to-centre distance.
    ///
    /// Symmetric. Returns `None` when the cells are not neighbours.
    fn coupling(&self, a: usize, b: usize) -> Option<f64>;

    /// Largest neighbour count over all cells.
    fn max_neighbour_degree(&self) -> usize {
        (0..self.cell_count())
            .map(|r| self.neighbours(r).len())
            .max()
            .unwrap_or(0)
    }

    /// Unique instance identifier for this geometry object.
    fn instance_id(&self) -> SpaceInstanceId;

    /// Returns `true` if `self` and `other` are the same concrete type with
    /// identical behavior-relevant parameters.
    fn topology_eq(&self, other: &dyn Space) -> bool;
}

impl dyn Space {
    /// Attempt to downcast a trait object to a concrete Space type.
    pub fn downcast_ref<T: Space>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }
}

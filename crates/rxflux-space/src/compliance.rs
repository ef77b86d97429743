//! Space trait compliance test helpers.
//!
//! These functions verify that a Space implementation satisfies the
//! invariants rate terms rely on. Reused by every geometry test module.

use crate::space::Space;

/// Assert that `b in neighbours(a)` implies `a in neighbours(b)`.
pub fn assert_neighbours_symmetric(space: &dyn Space) {
    for a in 0..space.cell_count() {
        for b in space.neighbours(a) {
            assert!(
                space.neighbours(b).contains(&a),
                "neighbour symmetry violated: {b} in N({a}) but {a} not in N({b})"
            );
        }
    }
}

/// Assert that neighbours are in range, unique, and never the cell itself.
pub fn assert_neighbours_well_formed(space: &dyn Space) {
    let n = space.cell_count();
    for a in 0..n {
        let nbs = space.neighbours(a);
        for (i, &b) in nbs.iter().enumerate() {
            assert!(b < n, "N({a}) contains out-of-range rank {b} (cell_count {n})");
            assert_ne!(a, b, "N({a}) contains itself");
            assert!(!nbs[..i].contains(&b), "N({a}) lists {b} twice");
        }
    }
}

/// Assert that coupling is positive and symmetric between neighbours and
/// `None` otherwise.
pub fn assert_coupling_consistent(space: &dyn Space) {
    let n = space.cell_count();
    for a in 0..n {
        let nbs = space.neighbours(a);
        for b in 0..n {
            let gab = space.coupling(a, b);
            if nbs.contains(&b) {
                let g = gab.unwrap_or_else(|| panic!("coupling({a}, {b}) missing for neighbours"));
                assert!(g.is_finite() && g > 0.0, "coupling({a}, {b}) = {g}");
                let gba = space.coupling(b, a).unwrap_or(f64::NAN);
                assert!(
                    (g - gba).abs() <= 1e-12 * g.abs(),
                    "coupling({a}, {b}) = {g} != coupling({b}, {a}) = {gba}"
                );
            } else {
                assert_eq!(gab, None, "coupling({a}, {b}) present for non-neighbours");
            }
        }
    }
}

/// Assert that every cell has a finite positive volume.
pub fn assert_volumes_positive(space: &dyn Space) {
    for r in 0..space.cell_count() {
        let v = space.volume(r);
        assert!(v.is_finite() && v > 0.0, "volume({r}) = {v}");
    }
}

/// Assert that two calls to `neighbours` return the same order.
pub fn assert_neighbours_deterministic(space: &dyn Space) {
    for r in 0..space.cell_count() {
        assert_eq!(
            space.neighbours(r),
            space.neighbours(r),
            "neighbours({r}) is non-deterministic"
        );
    }
}

/// Assert that `max_neighbour_degree` matches the largest neighbour list.
pub fn assert_max_degree_matches(space: &dyn Space) {
    let expected = (0..space.cell_count())
        .map(|r| space.neighbours(r).len())
        .max()
        .unwrap_or(0);
    assert_eq!(space.max_neighbour_degree(), expected);
}

/// Run all compliance checks on a space.
pub fn run_full_compliance(space: &dyn Space) {
    assert!(space.cell_count() > 0, "space has no cells");
    assert_neighbours_symmetric(space);
    assert_neighbours_well_formed(space);
    assert_coupling_consistent(space);
    assert_volumes_positive(space);
    assert_neighbours_deterministic(space);
    assert_max_degree_matches(space);
    assert!(space.topology_eq(space), "topology_eq is not reflexive");
}

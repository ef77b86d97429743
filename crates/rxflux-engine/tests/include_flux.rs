//! Integration test: the three flux source kinds on an eleven-segment cable.
//!
//! A 10 µm, 5 µm diameter section split into 11 segments holds one species.
//! The segment at x=0.3 starts at 1000 and every other segment at 0. Three
//! segments receive injected flux:
//!
//! - x=0.1: a constant 1000
//! - x=0.5: a callback returning 1000
//! - x=0.9: a reference to the x=0.3 node
//!
//! Runs are compared against an independent explicit-Euler solver working
//! on the closed-form uniform-cable stencil.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rxflux_core::{Initial, NodeId, SpeciesDef, SpeciesId};
use rxflux_engine::{Integrator, IntegratorConfig, ParallelConfig};
use rxflux_flux::FluxSource;
use rxflux_space::{Cable, SectionId};
use rxflux_terms::CableDiffusion;
use rxflux_test_utils::{max_relative_error, uniform_cable, Trajectory, UniformCableReference};

const LENGTH: f64 = 10.0;
const NSEG: u32 = 11;
const DIAM: f64 = 5.0;
const DT: f64 = 0.025;
const T_STOP: f64 = 10.0;

// ── Setup ────────────────────────────────────────────────────────────

struct Probes {
    constant: NodeId,
    callback: NodeId,
    reference: NodeId,
    target: NodeId,
}

fn rank_at(cable: &Cable, x: f64) -> usize {
    cable.segment_at(SectionId(0), x).unwrap()
}

fn initial_profile(target_rank: usize) -> Vec<f64> {
    (0..NSEG as usize)
        .map(|r| if r == target_rank { 1000.0 } else { 0.0 })
        .collect()
}

fn build(diffusion: f64, parallel: ParallelConfig, calls: Arc<AtomicUsize>) -> (Integrator, Probes) {
    let cable = uniform_cable(LENGTH, NSEG, DIAM);
    let ranks = [0.1, 0.5, 0.9, 0.3].map(|x| rank_at(&cable, x));
    let target_rank = ranks[3];

    let species = SpeciesDef::new("ip3")
        .with_diffusion(diffusion)
        .with_initial(Initial::from_fn(move |r| if r == target_rank { 1000.0 } else { 0.0 }));
    let mut config = IntegratorConfig::new(cable, vec![species], DT).with_parallel(parallel);
    if diffusion > 0.0 {
        config = config.with_term(CableDiffusion::new());
    }
    let mut sim = Integrator::new(config).unwrap();

    let at = |rank| sim.node_at(SpeciesId(0), rank).unwrap();
    let probes = Probes {
        constant: at(ranks[0]),
        callback: at(ranks[1]),
        reference: at(ranks[2]),
        target: at(ranks[3]),
    };

    sim.include_flux(probes.constant, FluxSource::constant(1000.0))
        .unwrap();
    sim.include_flux(
        probes.callback,
        FluxSource::callback(move || {
            calls.fetch_add(1, Ordering::Relaxed);
            1000.0
        }),
    )
    .unwrap();
    sim.include_flux(probes.reference, FluxSource::reference(probes.target))
        .unwrap();
    (sim, probes)
}

fn values(sim: &Integrator) -> Vec<f64> {
    sim.nodes().map(|n| n.concentration()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn segment_lookup_matches_layout() {
    let cable = uniform_cable(LENGTH, NSEG, DIAM);
    assert_eq!(rank_at(&cable, 0.1), 1);
    assert_eq!(rank_at(&cable, 0.3), 3);
    assert_eq!(rank_at(&cable, 0.5), 5);
    assert_eq!(rank_at(&cable, 0.9), 9);
}

#[test]
fn without_diffusion_injection_is_linear() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (mut sim, p) = build(0.0, ParallelConfig::sequential(), calls.clone());

    let mut traj = Trajectory::new(4);
    let probe_ids = [p.constant, p.callback, p.reference, p.target];
    traj.record(sim.time(), probe_ids.map(|id| sim.concentration(id).unwrap()));
    while sim.time() < T_STOP - DT / 2.0 {
        sim.step(DT).unwrap();
        traj.record(sim.time(), probe_ids.map(|id| sim.concentration(id).unwrap()));
    }

    assert_eq!(traj.len(), 401);
    assert_eq!(calls.load(Ordering::Relaxed), 400);

    let expected: Vec<f64> = traj.times.iter().map(|t| 1000.0 * t).collect();
    for probe in 0..3 {
        assert!(max_relative_error(traj.probe(probe), &expected, 1.0) < 1e-9);
    }
    assert!(traj.probe(3).iter().all(|&c| c == 1000.0));

    // Untouched segments stay at zero.
    assert_eq!(sim.concentration(NodeId(0)), Some(0.0));
    assert_eq!(sim.concentration(NodeId(10)), Some(0.0));
}

#[test]
fn without_diffusion_matches_reference_solver_exactly() {
    let (mut sim, p) = build(0.0, ParallelConfig::sequential(), Arc::default());
    let target = p.target.0 as usize;
    let inject = [p.constant.0 as usize, p.callback.0 as usize];
    let referencing = p.reference.0 as usize;

    let mut reference = UniformCableReference::new(LENGTH, 0.0, initial_profile(target));
    let steps = sim.continue_run(T_STOP).unwrap();
    reference.run(DT, steps as usize, |v| {
        let mut inj = vec![0.0; v.len()];
        for i in inject {
            inj[i] = 1000.0;
        }
        inj[referencing] = v[target];
        inj
    });
    assert_eq!(values(&sim), reference.values);
}

#[test]
fn with_diffusion_matches_reference_solver() {
    let diffusion = 1.0;
    let (mut sim, p) = build(diffusion, ParallelConfig::sequential(), Arc::default());
    let target = p.target.0 as usize;
    let inject = [p.constant.0 as usize, p.callback.0 as usize];
    let referencing = p.reference.0 as usize;

    let mut reference = UniformCableReference::new(LENGTH, diffusion, initial_profile(target));
    let mut worst = 0.0f64;
    while sim.time() < T_STOP - DT / 2.0 {
        let inj = {
            let v = &reference.values;
            let mut inj = vec![0.0; v.len()];
            for i in inject {
                inj[i] = 1000.0;
            }
            inj[referencing] = v[target];
            inj
        };
        reference.step(DT, &inj);
        sim.step(DT).unwrap();
        worst = worst.max(max_relative_error(&values(&sim), &reference.values, 1.0));
    }
    assert!(worst < 1e-6, "worst relative error {worst}");
    assert!((sim.time() - reference.time).abs() < 1e-9);
}

#[test]
fn parallel_run_is_bitwise_identical() {
    let (mut seq, _) = build(1.0, ParallelConfig::sequential(), Arc::default());
    let (mut par, _) = build(1.0, ParallelConfig::always(), Arc::default());
    seq.continue_run(T_STOP).unwrap();
    par.continue_run(T_STOP).unwrap();
    assert!(par.last_metrics().parallel);
    assert!(!seq.last_metrics().parallel);
    let bits = |sim: &Integrator| values(sim).iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&seq), bits(&par));
}

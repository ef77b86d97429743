//! Criterion micro-benchmarks for integrator stepping and flux evaluation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rxflux_bench::{attach_fluxes, reference_profile, stress_profile};
use rxflux_core::{NodeId, SpeciesDef};
use rxflux_engine::{Integrator, IntegratorConfig, ParallelConfig, StepReport};
use rxflux_flux::{FluxRegistry, FluxSource};
use rxflux_space::{Cable, Section};

/// Step once, rewinding first so that self-amplifying reference loops
/// cannot run to overflow over a long measurement.
fn step_bounded(sim: &mut Integrator) -> StepReport {
    if sim.time() > 100.0 {
        sim.initialize().unwrap();
    }
    sim.step(0.025).unwrap()
}

/// Benchmark: one step of the reference profile with 256 flux sources.
fn bench_step_reference(c: &mut Criterion) {
    let mut sim = Integrator::new(reference_profile(42)).unwrap();
    attach_fluxes(&mut sim, 256, 42);

    c.bench_function("step_reference_2k_nodes", |b| {
        b.iter(|| {
            black_box(step_bounded(&mut sim));
        });
    });
}

/// Benchmark: one step of the stress profile, sequential vs parallel.
fn bench_step_stress(c: &mut Criterion) {
    for (label, parallel) in [
        ("step_stress_sequential", ParallelConfig::sequential()),
        ("step_stress_parallel", ParallelConfig::always()),
    ] {
        let mut sim = Integrator::new(stress_profile(42).with_parallel(parallel)).unwrap();
        attach_fluxes(&mut sim, 4096, 42);

        c.bench_function(label, |b| {
            b.iter(|| {
                black_box(step_bounded(&mut sim));
            });
        });
    }
}

/// Benchmark: flux-only stepping, no rate terms, every node injected.
fn bench_step_flux_only(c: &mut Criterion) {
    let cable = Cable::single(Section::new("axon", 1000.0, 10_000, 1.0).unwrap()).unwrap();
    let mut sim = Integrator::new(
        IntegratorConfig::new(cable, vec![SpeciesDef::new("na")], 0.025)
            .with_parallel(ParallelConfig::sequential()),
    )
    .unwrap();
    for i in 0..10_000u32 {
        sim.include_flux(NodeId(i), FluxSource::reference(NodeId((i + 1) % 10_000)))
            .unwrap();
    }

    c.bench_function("step_flux_only_10k_refs", |b| {
        b.iter(|| {
            black_box(step_bounded(&mut sim));
        });
    });
}

/// Benchmark: sum a registry holding 64 mixed sources.
fn bench_registry_total(c: &mut Criterion) {
    let sim = Integrator::new(reference_profile(7)).unwrap();
    let snapshot = sim.snapshot();
    let mut registry = FluxRegistry::new(NodeId(0));
    for i in 0..64u32 {
        match i % 3 {
            0 => registry.register(FluxSource::constant(1.0)),
            1 => registry.register(FluxSource::callback(move || i as f64)),
            _ => registry.register(FluxSource::reference(NodeId(i))),
        };
    }

    c.bench_function("registry_total_64_sources", |b| {
        b.iter(|| {
            let total = registry.total_flux(&snapshot).unwrap();
            black_box(total);
        });
    });
}

criterion_group!(
    benches,
    bench_step_reference,
    bench_step_stress,
    bench_step_flux_only,
    bench_registry_total
);
criterion_main!(benches);

//! Benchmark profiles and utilities for the rxflux integrator.
//!
//! Provides pre-built [`IntegratorConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: branched cable, ~1K segments, two species
//! - [`stress_profile`]: branched cable, ~50K segments, two species
//! - [`attach_fluxes`]: deterministic flux-source placement via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rxflux_core::{Initial, NodeId, SpeciesDef, SpeciesId};
use rxflux_engine::{Integrator, IntegratorConfig, ParallelConfig};
use rxflux_flux::FluxSource;
use rxflux_space::{Cable, Section};
use rxflux_terms::{CableDiffusion, FirstOrderDecay};

/// Build a random dendritic tree of `n_sections` sections with `nseg`
/// segments each.
///
/// Section 0 is a soma; every later section attaches to a uniformly
/// chosen earlier one at a random position. Same seed, same tree.
pub fn dendrite_cable(n_sections: usize, nseg: u32, seed: u64) -> Cable {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut b = Cable::builder();
    let soma = b.section(Section::new("soma", 20.0, nseg, 20.0).expect("valid soma"));
    let mut ids = vec![soma];
    for i in 1..n_sections {
        let length = 50.0 + (rng.next_u32() % 150) as f64;
        let diam = 0.5 + (rng.next_u32() % 20) as f64 / 10.0;
        let id = b.section(Section::new(format!("dend[{i}]"), length, nseg, diam).expect("valid dendrite"));
        let parent = ids[rng.next_u32() as usize % ids.len()];
        let x = (rng.next_u32() % 1001) as f64 / 1000.0;
        b.connect(id, parent, x);
        ids.push(id);
    }
    b.build().expect("random tree is acyclic")
}

fn profile(n_sections: usize, nseg: u32, seed: u64) -> IntegratorConfig {
    let species = vec![
        SpeciesDef::new("ca")
            .with_diffusion(0.6)
            .with_initial(Initial::Uniform(1e-4)),
        SpeciesDef::new("ip3")
            .with_diffusion(0.28)
            .with_initial(Initial::from_fn(|r| if r < 10 { 1.0 } else { 0.0 })),
    ];
    IntegratorConfig::new(dendrite_cable(n_sections, nseg, seed), species, 0.025)
        .with_term(CableDiffusion::new())
        .with_term(FirstOrderDecay::new(SpeciesId(1), 0.14).expect("valid rate constant"))
}

/// Build a reference benchmark profile: 100 sections of 11 segments.
///
/// Terms: CableDiffusion → decay of ip3 (k=0.14). dt=0.025.
pub fn reference_profile(seed: u64) -> IntegratorConfig {
    profile(100, 11, seed)
}

/// Build a stress benchmark profile: 2500 sections of 21 segments.
///
/// Same terms as [`reference_profile`] at roughly 50x the node count.
pub fn stress_profile(seed: u64) -> IntegratorConfig {
    profile(2500, 21, seed).with_parallel(ParallelConfig::default())
}

/// Attach `n` flux sources at deterministic node positions.
///
/// Kinds rotate constant → callback → reference. Reference targets are
/// also drawn from the seed. Returns the nodes that received a source.
pub fn attach_fluxes(sim: &mut Integrator, n: usize, seed: u64) -> Vec<NodeId> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let ids: Vec<NodeId> = sim.nodes().map(|node| node.id()).collect();
    let mut targets = Vec::with_capacity(n);
    for i in 0..n {
        let node = ids[rng.next_u64() as usize % ids.len()];
        let source = match i % 3 {
            0 => FluxSource::constant(0.5),
            1 => {
                let level = (rng.next_u32() % 100) as f64 / 100.0;
                FluxSource::callback(move || level)
            }
            _ => FluxSource::reference(ids[rng.next_u64() as usize % ids.len()]),
        };
        if sim.include_flux(node, source).is_ok() {
            targets.push(node);
        }
    }
    targets
}

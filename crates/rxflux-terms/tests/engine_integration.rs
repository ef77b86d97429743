//! Integration test: the reference terms driven by the integrator.
//!
//! Exercises diffusion on a branched cable (amount is conserved and
//! reaches every tip), first-order decay against its closed form, and a
//! two-species model where only one species diffuses.

use rxflux_core::{Initial, NodeId, SpeciesDef, SpeciesId};
use rxflux_engine::{Integrator, IntegratorConfig};
use rxflux_flux::FluxSource;
use rxflux_space::{Cable, Section, Space};
use rxflux_terms::{CableDiffusion, FirstOrderDecay};
use rxflux_test_utils::uniform_cable;

fn branched() -> Cable {
    let mut b = Cable::builder();
    let soma = b.section(Section::new("soma", 10.0, 3, 10.0).unwrap());
    let apical = b.section(Section::new("apical", 40.0, 8, 2.0).unwrap());
    let basal = b.section(Section::new("basal", 20.0, 5, 1.0).unwrap());
    b.connect(apical, soma, 1.0);
    b.connect(basal, soma, 0.0);
    b.build().unwrap()
}

fn total_amount(sim: &Integrator, species: SpeciesId) -> f64 {
    sim.nodes()
        .filter(|n| n.species() == species)
        .map(|n| n.concentration() * sim.space().volume(n.location()))
        .sum()
}

#[test]
fn diffusion_conserves_amount_on_branched_cable() {
    let species = SpeciesDef::new("ca")
        .with_diffusion(0.5)
        .with_initial(Initial::from_fn(|r| if r == 1 { 100.0 } else { 0.0 }));
    let config =
        IntegratorConfig::new(branched(), vec![species], 0.05).with_term(CableDiffusion::new());
    let mut sim = Integrator::new(config).unwrap();

    let before = total_amount(&sim, SpeciesId(0));
    sim.continue_run(200.0).unwrap();
    let after = total_amount(&sim, SpeciesId(0));
    assert!((after - before).abs() / before < 1e-9, "{before} -> {after}");

    // Material reached the tips of both dendrites.
    let cable = sim.space().downcast_ref::<Cable>().unwrap();
    let apical = cable.section_by_name("apical").unwrap();
    let basal = cable.section_by_name("basal").unwrap();
    let tip = |id| cable.section_ranks(id).unwrap().end - 1;
    let (apical_tip, basal_tip) = (tip(apical), tip(basal));
    assert!(sim.concentration(NodeId(apical_tip as u32)).unwrap() > 0.0);
    assert!(sim.concentration(NodeId(basal_tip as u32)).unwrap() > 0.0);
    assert!(sim.nodes().all(|n| n.concentration() >= 0.0));
}

#[test]
fn configured_dt_above_stability_limit_is_rejected() {
    let species = SpeciesDef::new("ca").with_diffusion(100.0);
    let config = IntegratorConfig::new(uniform_cable(10.0, 10, 1.0), vec![species], 0.5)
        .with_term(CableDiffusion::new());
    let err = Integrator::new(config).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("cable_diffusion"), "{message}");
}

#[test]
fn decay_tracks_closed_form() {
    let k = 0.3;
    let dt = 1e-3;
    let species = SpeciesDef::new("ip3").with_initial(Initial::Uniform(10.0));
    let config = IntegratorConfig::new(uniform_cable(1.0, 1, 1.0), vec![species], dt)
        .with_term(FirstOrderDecay::new(SpeciesId(0), k).unwrap());
    let mut sim = Integrator::new(config).unwrap();
    sim.continue_run(2.0).unwrap();

    let exact = 10.0 * (-k * sim.time()).exp();
    let c = sim.concentration(NodeId(0)).unwrap();
    // Explicit Euler error is O(dt).
    assert!((c - exact).abs() / exact < 1e-3, "{c} vs {exact}");
}

#[test]
fn decay_balances_constant_injection() {
    // dc/dt = J - k c settles at J / k.
    let k = 2.0;
    let config = IntegratorConfig::new(uniform_cable(1.0, 1, 1.0), vec![SpeciesDef::new("a")], 0.01)
        .with_term(FirstOrderDecay::new(SpeciesId(0), k).unwrap());
    let mut sim = Integrator::new(config).unwrap();
    sim.include_flux(NodeId(0), FluxSource::constant(50.0)).unwrap();
    sim.continue_run(20.0).unwrap();
    assert!((sim.concentration(NodeId(0)).unwrap() - 25.0).abs() < 1e-6);
}

#[test]
fn only_diffusing_species_spreads() {
    let pulse = Initial::from_fn(|r| if r == 0 { 1.0 } else { 0.0 });
    let species = vec![
        SpeciesDef::new("mobile")
            .with_diffusion(1.0)
            .with_initial(pulse.clone()),
        SpeciesDef::new("bound").with_initial(pulse),
    ];
    let config = IntegratorConfig::new(uniform_cable(5.0, 5, 1.0), species, 0.1)
        .with_term(CableDiffusion::new());
    let mut sim = Integrator::new(config).unwrap();
    sim.continue_run(1.0).unwrap();

    let mobile_far = sim.node_at(SpeciesId(0), 2).unwrap();
    let bound_far = sim.node_at(SpeciesId(1), 2).unwrap();
    let bound_origin = sim.node_at(SpeciesId(1), 0).unwrap();
    assert!(sim.concentration(mobile_far).unwrap() > 0.0);
    assert_eq!(sim.concentration(bound_far), Some(0.0));
    assert_eq!(sim.concentration(bound_origin), Some(1.0));
}

#[test]
fn removed_node_is_a_sealed_boundary() {
    let species = SpeciesDef::new("a")
        .with_diffusion(1.0)
        .with_initial(Initial::from_fn(|r| if r == 0 { 1.0 } else { 0.0 }));
    let config = IntegratorConfig::new(uniform_cable(5.0, 5, 1.0), vec![species], 0.1)
        .with_term(CableDiffusion::new());
    let mut sim = Integrator::new(config).unwrap();
    sim.remove_node(NodeId(2)).unwrap();
    sim.continue_run(5.0).unwrap();

    assert!(sim.concentration(NodeId(1)).unwrap() > 0.0);
    assert_eq!(sim.concentration(NodeId(3)), Some(0.0));
    assert_eq!(sim.concentration(NodeId(4)), Some(0.0));
}

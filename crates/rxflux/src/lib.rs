//! rxflux: a reaction-diffusion state integrator with external flux injection.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! rxflux sub-crates. For most users, adding `rxflux` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use rxflux::prelude::*;
//!
//! // A 10 µm cable, 5 µm across, in 11 segments.
//! let cable = Cable::single(Section::new("dend", 10.0, 11, 5.0).unwrap()).unwrap();
//! let soma_end = cable.segment_at(SectionId(0), 0.1).unwrap();
//! let tip = cable.segment_at(SectionId(0), 0.9).unwrap();
//!
//! let species = vec![SpeciesDef::new("ip3").with_diffusion(1.0)];
//! let config = IntegratorConfig::new(cable, species, 0.025).with_term(CableDiffusion::new());
//! let mut sim = Integrator::new(config).unwrap();
//!
//! let pump = sim.node_at(SpeciesId(0), soma_end).unwrap();
//! let probe = sim.node_at(SpeciesId(0), tip).unwrap();
//! sim.include_flux(pump, FluxSource::constant(1000.0)).unwrap();
//! sim.include_flux(probe, FluxSource::callback(|| 5.0)).unwrap();
//!
//! let report = sim.step(0.025).unwrap();
//! assert_eq!(report.step, StepIndex(1));
//! assert!(sim.concentration(pump).unwrap() > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rxflux-core` | IDs, species, snapshots, errors, reader traits |
//! | [`space`] | `rxflux-space` | The `Space` trait and the cable geometry |
//! | [`flux`] | `rxflux-flux` | Flux sources and per-node registries |
//! | [`rate`] | `rxflux-rate` | Rate term trait and term validation |
//! | [`terms`] | `rxflux-terms` | Reference terms (cable diffusion, decay) |
//! | [`engine`] | `rxflux-engine` | The integrator |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`rxflux-core`).
///
/// Contains species definitions, the step [`types::Snapshot`], the error
/// types, and the reader traits ([`types::ConcentrationReader`],
/// [`types::NodeLocator`]).
pub use rxflux_core as types;

/// Geometry (`rxflux-space`).
///
/// Provides the [`space::Space`] trait and the branched [`space::Cable`].
pub use rxflux_space as space;

/// Flux sources and registries (`rxflux-flux`).
///
/// [`flux::FluxSource`] is what `include_flux` attaches to a node.
pub use rxflux_flux as flux;

/// Rate term trait and validation (`rxflux-rate`).
///
/// The [`rate::RateTerm`] trait is the extension point for user-defined
/// reaction kinetics.
pub use rxflux_rate as rate;

/// Reference rate term implementations (`rxflux-terms`).
pub use rxflux_terms as terms;

/// The integrator (`rxflux-engine`).
pub use rxflux_engine as engine;

/// Common imports for typical rxflux usage.
///
/// ```rust
/// use rxflux::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use rxflux_core::{
        ConcentrationReader, FluxHandle, Initial, NodeId, NodeSite, Snapshot, SpeciesDef,
        SpeciesId, StepIndex,
    };

    // Errors
    pub use rxflux_core::{FluxError, ModelError, RateError, StepError};

    // Space
    pub use rxflux_space::{Cable, Section, SectionId, Space};

    // Flux
    pub use rxflux_flux::{FluxSource, FluxUnits};

    // Rate terms
    pub use rxflux_rate::{RateContext, RateTerm};
    pub use rxflux_terms::{CableDiffusion, FirstOrderDecay};

    // Engine
    pub use rxflux_engine::{
        ConfigError, Integrator, IntegratorConfig, ParallelConfig, StepMetrics, StepReport,
    };
}

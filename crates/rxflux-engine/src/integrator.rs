//! The integrator: node table plus the two-phase step.
//!
//! Every [`step`](Integrator::step) runs in three phases:
//!
//! 1. **Snapshot**: capture every node's concentration into an immutable
//!    [`Snapshot`].
//! 2. **Evaluation**: for each node, sum the rate terms and the node's
//!    flux sources against the snapshot. No node is written, so this
//!    phase may run on the rayon pool.
//! 3. **Update**: only after every node evaluated successfully, compute
//!    `c + (reaction + injected) * dt` for all nodes, check finiteness,
//!    then commit.
//!
//! A failure in any phase commits nothing. The integrator is left exactly
//! as it was before the call and the caller may retry.

use std::fmt;
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use rxflux_core::{
    FluxHandle, ModelError, NodeId, NodeSite, Snapshot, SpeciesDef, SpeciesId, StepError,
    StepIndex,
};
use rxflux_flux::{FluxSource, FluxUnits};
use rxflux_rate::{RateContext, RateTerm, TermPlan};
use rxflux_space::Space;

use crate::config::{ConfigError, IntegratorConfig, ParallelConfig};
use crate::metrics::{StepMetrics, StepReport};
use crate::node::{Node, SiteIndex};

/// Reaction-diffusion state integrator with per-node flux injection.
///
/// Owns the geometry, the species list, the rate terms, and the node
/// table. Construction creates one node per species per cell, with id
/// `species * cell_count + rank`, and applies initial conditions.
///
/// # Examples
///
/// ```
/// use rxflux_core::{Initial, SpeciesDef, SpeciesId};
/// use rxflux_engine::{Integrator, IntegratorConfig};
/// use rxflux_flux::FluxSource;
/// use rxflux_space::{Cable, Section};
///
/// let cable = Cable::single(Section::new("sec", 10.0, 11, 5.0).unwrap()).unwrap();
/// let rank = cable.segment_at(rxflux_space::SectionId(0), 0.1).unwrap();
/// let species = vec![SpeciesDef::new("ip3")];
///
/// let mut sim = Integrator::new(IntegratorConfig::new(cable, species, 0.025)).unwrap();
/// let node = sim.node_at(SpeciesId(0), rank).unwrap();
/// sim.include_flux(node, FluxSource::constant(1000.0)).unwrap();
///
/// sim.continue_run(1.0).unwrap();
/// assert!((sim.concentration(node).unwrap() - 1000.0).abs() < 1e-9);
/// ```
pub struct Integrator {
    space: Box<dyn Space>,
    species: Vec<SpeciesDef>,
    terms: Vec<Box<dyn RateTerm>>,
    plan: TermPlan,
    dt: f64,
    parallel: ParallelConfig,
    nodes: IndexMap<NodeId, Node>,
    sites: SiteIndex,
    next_id: u32,
    current_step: StepIndex,
    time: f64,
    consecutive_failures: u32,
    last_metrics: StepMetrics,
}

impl Integrator {
    /// Validate `config`, discretize the geometry, and initialize.
    pub fn new(config: IntegratorConfig) -> Result<Self, ConfigError> {
        let plan = config.validated_plan()?;
        let IntegratorConfig {
            space,
            species,
            terms,
            dt,
            parallel,
        } = config;

        let cell_count = space.cell_count();
        let total = species.len() * cell_count;
        let mut nodes = IndexMap::with_capacity(total);
        let mut sites = SiteIndex::with_capacity(total);
        let mut next_id: u32 = 0;
        for s in 0..species.len() {
            for rank in 0..cell_count {
                let site = NodeSite {
                    id: NodeId(next_id),
                    species: SpeciesId(s as u32),
                    location: rank,
                };
                nodes.insert(site.id, Node::new(site, 0.0));
                sites.insert(site);
                next_id += 1;
            }
        }

        let mut integrator = Self {
            space,
            species,
            terms,
            plan,
            dt,
            parallel,
            nodes,
            sites,
            next_id,
            current_step: StepIndex(0),
            time: 0.0,
            consecutive_failures: 0,
            last_metrics: StepMetrics::default(),
        };
        integrator.initialize()?;
        log::debug!(
            "integrator created: {} species, {} cells, {} nodes, {} terms, dt={}",
            integrator.species.len(),
            cell_count,
            integrator.nodes.len(),
            integrator.terms.len(),
            integrator.dt,
        );
        Ok(integrator)
    }

    // ── Model building ─────────────────────────────────────────────

    /// Create a node of `species` at cell `location`.
    ///
    /// Fails if the location already holds a node of that species; remove
    /// it first. The new node gets a fresh id, never one used before.
    pub fn add_node(
        &mut self,
        species: SpeciesId,
        location: usize,
        initial: f64,
    ) -> Result<NodeId, ModelError> {
        if species.0 as usize >= self.species.len() {
            return Err(ModelError::UnknownSpecies(species));
        }
        let cell_count = self.space.cell_count();
        if location >= cell_count {
            return Err(ModelError::LocationOutOfRange {
                location,
                cell_count,
            });
        }
        if let Some(existing) = self.sites.get(species, location) {
            return Err(ModelError::LocationOccupied {
                species,
                location,
                existing,
            });
        }
        let id = NodeId(self.next_id);
        if !initial.is_finite() {
            return Err(ModelError::NonFiniteConcentration {
                node: id,
                value: initial,
            });
        }
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(ModelError::NodeIdOverflow)?;

        let site = NodeSite {
            id,
            species,
            location,
        };
        self.nodes.insert(id, Node::new(site, initial));
        self.sites.insert(site);
        log::debug!("node {id} added: species {species} at location {location}");
        Ok(id)
    }

    /// Remove a node and return it with its registry cleared.
    ///
    /// Reference sources elsewhere that target it fail with a dangling
    /// reference on the next step.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node, ModelError> {
        let mut node = self
            .nodes
            .shift_remove(&id)
            .ok_or(ModelError::UnknownNode(id))?;
        self.sites.remove(node.site());
        node.fluxes_mut().clear();
        log::debug!("node {id} removed");
        Ok(node)
    }

    /// Attach a flux source to `node`, in concentration per unit time.
    ///
    /// Accepts anything convertible to a [`FluxSource`]: an `f64` becomes a
    /// constant, a [`NodeId`] a reference. Attaching the same source twice
    /// makes it contribute twice. Reference targets are not checked here.
    pub fn include_flux(
        &mut self,
        node: NodeId,
        source: impl Into<FluxSource>,
    ) -> Result<FluxHandle, ModelError> {
        self.include_flux_with_units(node, source, FluxUnits::Concentration)
    }

    /// Attach a flux source whose value is in the given units.
    ///
    /// [`FluxUnits::Amount`] values are divided by the node's cell volume.
    pub fn include_flux_with_units(
        &mut self,
        node: NodeId,
        source: impl Into<FluxSource>,
        units: FluxUnits,
    ) -> Result<FluxHandle, ModelError> {
        let source = source.into();
        let target = self
            .nodes
            .get_mut(&node)
            .ok_or(ModelError::UnknownNode(node))?;
        let kind = source.kind();
        let handle = match units {
            FluxUnits::Concentration => target.fluxes_mut().register(source),
            FluxUnits::Amount => {
                let volume = self.space.volume(target.location());
                target.fluxes_mut().register_weighted(source, 1.0 / volume)
            }
        };
        log::debug!("{kind} flux {handle} included on node {node} ({units:?})");
        Ok(handle)
    }

    /// Remove every flux source attached to `node`.
    pub fn clear_fluxes(&mut self, node: NodeId) -> Result<(), ModelError> {
        self.nodes
            .get_mut(&node)
            .ok_or(ModelError::UnknownNode(node))?
            .fluxes_mut()
            .clear();
        Ok(())
    }

    /// Re-apply every species' initial condition and rewind to step 0.
    ///
    /// Flux registrations are kept. On error nothing changes.
    pub fn initialize(&mut self) -> Result<(), ModelError> {
        let values: Vec<f64> = self
            .nodes
            .values()
            .map(|n| self.species[n.species().0 as usize].initial.value_at(n.location()))
            .collect();
        if let Some((node, &value)) = self
            .nodes
            .values()
            .zip(&values)
            .find(|(_, v)| !v.is_finite())
        {
            return Err(ModelError::NonFiniteConcentration {
                node: node.id(),
                value,
            });
        }
        for (node, value) in self.nodes.values_mut().zip(values) {
            node.reset(value);
        }
        self.current_step = StepIndex(0);
        self.time = 0.0;
        self.consecutive_failures = 0;
        self.last_metrics = StepMetrics::default();
        log::debug!("integrator initialized: {} nodes", self.nodes.len());
        Ok(())
    }

    /// Overwrite a node's concentration between steps.
    pub fn set_concentration(&mut self, node: NodeId, value: f64) -> Result<(), ModelError> {
        if !value.is_finite() {
            return Err(ModelError::NonFiniteConcentration { node, value });
        }
        self.nodes
            .get_mut(&node)
            .ok_or(ModelError::UnknownNode(node))?
            .set_concentration(value);
        Ok(())
    }

    // ── Stepping ───────────────────────────────────────────────────

    /// Advance every node by `dt`.
    ///
    /// On error nothing is committed and the consecutive-failure counter
    /// increments; a later successful step resets it.
    pub fn step(&mut self, dt: f64) -> Result<StepReport, StepError> {
        match self.try_step(dt) {
            Ok(report) => {
                self.consecutive_failures = 0;
                self.last_metrics = report.metrics.clone();
                log::trace!(
                    "step {} done: t={} nodes={} sources={} parallel={}",
                    report.step,
                    report.time,
                    report.metrics.node_count,
                    report.metrics.sources_evaluated,
                    report.metrics.parallel,
                );
                Ok(report)
            }
            Err(e) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                log::warn!(
                    "step {} aborted ({} consecutive failures): {e}",
                    self.current_step.next(),
                    self.consecutive_failures,
                );
                Err(e)
            }
        }
    }

    /// Step with the configured dt until `time() >= t_stop - dt / 2`.
    ///
    /// Returns the number of steps taken. Stops at the first failing step.
    pub fn continue_run(&mut self, t_stop: f64) -> Result<u64, StepError> {
        let dt = self.dt;
        let mut steps = 0;
        while self.time < t_stop - dt / 2.0 {
            self.step(dt)?;
            steps += 1;
        }
        Ok(steps)
    }

    fn try_step(&mut self, dt: f64) -> Result<StepReport, StepError> {
        let step_start = Instant::now();
        self.plan.check_dt(dt)?;
        let step = self.current_step.next();

        // 1. Snapshot phase.
        let snapshot_start = Instant::now();
        let snapshot = Snapshot::capture(
            step,
            self.time,
            self.nodes.iter().map(|(&id, n)| (id, n.concentration())),
        );
        let snapshot_us = snapshot_start.elapsed().as_micros() as u64;

        // 2. Evaluation phase. Errors resolve in node order either way.
        let eval_start = Instant::now();
        let parallel = self.parallel.use_parallel(self.nodes.len());
        let ctx = RateContext::new(
            &snapshot,
            &self.sites,
            self.space.as_ref(),
            &self.species,
            step,
            self.time,
            dt,
        );
        let terms = self.terms.as_slice();
        let evaluate = |node: &Node| evaluate_node(node, terms, &ctx, &snapshot, step);
        let rates: Vec<(f64, f64)> = if parallel {
            let results: Vec<Result<(f64, f64), StepError>> =
                self.nodes.par_values().map(evaluate).collect();
            results.into_iter().collect::<Result<_, _>>()?
        } else {
            self.nodes
                .values()
                .map(evaluate)
                .collect::<Result<_, _>>()?
        };
        let evaluation_us = eval_start.elapsed().as_micros() as u64;

        // 3. Update phase: stage, check, then commit.
        let update_start = Instant::now();
        let mut staged = Vec::with_capacity(rates.len());
        for (node, &(reaction, injected)) in self.nodes.values().zip(&rates) {
            let next = node.concentration() + (reaction + injected) * dt;
            if !next.is_finite() {
                return Err(StepError::Divergence {
                    node: node.id(),
                    step,
                    value: next,
                });
            }
            staged.push(next);
        }
        let mut sources_evaluated = 0;
        for ((node, next), (_, injected)) in self.nodes.values_mut().zip(staged).zip(rates) {
            node.commit(next, injected);
            sources_evaluated += node.fluxes().len();
        }
        self.current_step = step;
        self.time += dt;
        let update_us = update_start.elapsed().as_micros() as u64;

        Ok(StepReport {
            step,
            time: self.time,
            metrics: StepMetrics {
                total_us: step_start.elapsed().as_micros() as u64,
                snapshot_us,
                evaluation_us,
                update_us,
                node_count: self.nodes.len(),
                sources_evaluated,
                parallel,
            },
        })
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// Current concentration of a node.
    pub fn concentration(&self, node: NodeId) -> Option<f64> {
        self.nodes.get(&node).map(Node::concentration)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// All nodes in node order (creation order, removals closing gaps).
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// The node of `species` at cell `location`.
    pub fn node_at(&self, species: SpeciesId, location: usize) -> Option<NodeId> {
        self.sites.get(species, location)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Index of the last completed step; `StepIndex(0)` after initialization.
    pub fn current_step(&self) -> StepIndex {
        self.current_step
    }

    /// The geometry. Use `space().downcast_ref::<Cable>()` to reach
    /// cable-specific lookups.
    pub fn space(&self) -> &dyn Space {
        self.space.as_ref()
    }

    /// Species definitions.
    pub fn species(&self) -> &[SpeciesDef] {
        &self.species
    }

    /// The configured default dt.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Number of failed steps since the last successful one.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Capture the current state as the next step would see it.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.current_step.next(),
            self.time,
            self.nodes.iter().map(|(&id, n)| (id, n.concentration())),
        )
    }
}

/// Reaction rate and injected flux of one node against the snapshot.
fn evaluate_node(
    node: &Node,
    terms: &[Box<dyn RateTerm>],
    ctx: &RateContext<'_>,
    snapshot: &Snapshot,
    step: StepIndex,
) -> Result<(f64, f64), StepError> {
    let site = node.site();
    let mut reaction = 0.0;
    for term in terms {
        reaction += term
            .rate(site, ctx)
            .map_err(|reason| StepError::RateFailed {
                term: term.name().to_string(),
                node: site.id,
                step,
                reason,
            })?;
    }
    let injected = node
        .fluxes()
        .total_flux(snapshot)
        .map_err(|e| StepError::FluxEvaluation {
            node: site.id,
            step,
            source: e.handle,
            reason: e.error,
        })?;
    Ok((reaction, injected))
}

impl fmt::Debug for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Integrator")
            .field("space_cell_count", &self.space.cell_count())
            .field("species", &self.species.len())
            .field("terms", &self.plan.names())
            .field("nodes", &self.nodes.len())
            .field("dt", &self.dt)
            .field("current_step", &self.current_step)
            .field("time", &self.time)
            .field("consecutive_failures", &self.consecutive_failures)
            .finish()
    }
}

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::area::{Activation, Area, AreaId, Recall};
use crate::config::{AreaConfig, BrainConfig, StimulusConfig};
use crate::error::{BrainError, EntityKind, Result};
use crate::prng::Prng;
use crate::projection::{Projection, ResolvedProjection};
use crate::stimulus::{Stimulus, StimulusId};
use crate::synapse::NeuronId;

/// Summary of one `project` round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoundReport {
    /// Distinct destination areas reset and re-selected.
    pub destinations: usize,
    /// `(source, destination)` pairs that fired.
    pub pairs: usize,
    /// Synapses strengthened during the reinforce phase.
    pub reinforced_synapses: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    pub area_count: usize,
    pub stimulus_count: usize,
    /// Materialized `(source, destination)` matrices.
    pub matrix_count: usize,
    pub synapse_count: usize,
    pub saved_assembly_count: usize,
    pub rounds: u64,
}

/// Registry of areas and stimuli, and orchestrator of projection rounds.
///
/// Entities live in arenas owned by the brain and are addressed by
/// [`AreaId`] / [`StimulusId`]; names resolve through the index maps. Nothing
/// is ever removed.
pub struct Brain {
    cfg: BrainConfig,
    rng: Prng,

    areas: Vec<Area>,
    stimuli: Vec<Stimulus>,
    area_index: HashMap<String, AreaId>,
    stimulus_index: HashMap<String, StimulusId>,

    rounds: u64,
}

impl Default for Brain {
    fn default() -> Self {
        Self::new(BrainConfig::default())
    }
}

impl Brain {
    pub fn new(cfg: BrainConfig) -> Self {
        Self {
            rng: Prng::new(cfg.effective_seed()),
            cfg,
            areas: Vec::new(),
            stimuli: Vec::new(),
            area_index: HashMap::new(),
            stimulus_index: HashMap::new(),
            rounds: 0,
        }
    }

    pub fn config(&self) -> &BrainConfig {
        &self.cfg
    }

    /// Number of `project` calls completed so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    // ---------------------------------------------------------------------
    // Registry
    // ---------------------------------------------------------------------

    pub fn create_area(
        &mut self,
        name: &str,
        n: usize,
        k: usize,
        p: f64,
        default_beta: f64,
    ) -> Result<AreaId> {
        self.create_area_with(name, AreaConfig::new(n, k, p, default_beta))
    }

    pub fn create_area_with(&mut self, name: &str, cfg: AreaConfig) -> Result<AreaId> {
        if self.area_index.contains_key(name) {
            return Err(BrainError::duplicate(EntityKind::Area, name));
        }
        cfg.validate()?;

        let id = AreaId::from_index(self.areas.len());
        self.areas.push(Area::new(id, name, cfg));
        self.area_index.insert(name.to_string(), id);
        tracing::debug!(area = name, n = cfg.n, k = cfg.k, p = cfg.p, "created area");
        Ok(id)
    }

    pub fn create_stimulus(
        &mut self,
        name: &str,
        k: usize,
        p: f64,
        default_beta: f64,
    ) -> Result<StimulusId> {
        self.create_stimulus_with(name, StimulusConfig::new(k, p, default_beta))
    }

    pub fn create_stimulus_with(&mut self, name: &str, cfg: StimulusConfig) -> Result<StimulusId> {
        if self.stimulus_index.contains_key(name) {
            return Err(BrainError::duplicate(EntityKind::Stimulus, name));
        }
        cfg.validate()?;

        let id = StimulusId::from_index(self.stimuli.len());
        self.stimuli.push(Stimulus::new(id, name, cfg));
        self.stimulus_index.insert(name.to_string(), id);
        tracing::debug!(stimulus = name, k = cfg.k, p = cfg.p, "created stimulus");
        Ok(id)
    }

    pub fn lookup_area(&self, name: &str) -> Result<AreaId> {
        self.area_index
            .get(name)
            .copied()
            .ok_or_else(|| BrainError::not_found(EntityKind::Area, name))
    }

    pub fn lookup_stimulus(&self, name: &str) -> Result<StimulusId> {
        self.stimulus_index
            .get(name)
            .copied()
            .ok_or_else(|| BrainError::not_found(EntityKind::Stimulus, name))
    }

    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(id.index())
    }

    pub fn stimulus(&self, id: StimulusId) -> Option<&Stimulus> {
        self.stimuli.get(id.index())
    }

    pub fn area_named(&self, name: &str) -> Result<&Area> {
        let id = self.lookup_area(name)?;
        Ok(&self.areas[id.index()])
    }

    pub fn stimulus_named(&self, name: &str) -> Result<&Stimulus> {
        let id = self.lookup_stimulus(name)?;
        Ok(&self.stimuli[id.index()])
    }

    /// Areas in creation order.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Stimuli in creation order.
    pub fn stimuli(&self) -> &[Stimulus] {
        &self.stimuli
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn stimulus_count(&self) -> usize {
        self.stimuli.len()
    }

    /// Current winners of the named area, ascending.
    pub fn winners(&self, area: &str) -> Result<&[NeuronId]> {
        Ok(self.area_named(area)?.winners())
    }

    // ---------------------------------------------------------------------
    // Learning rates
    // ---------------------------------------------------------------------

    /// Override the plasticity rate of `src -> dest` area synapses.
    pub fn set_area_beta(&mut self, src: &str, dest: &str, beta: f64) -> Result<()> {
        let src = self.lookup_area(src)?;
        let dest = self.lookup_area(dest)?;
        self.areas[src.index()].set_beta(dest, beta)
    }

    pub fn area_beta(&self, src: &str, dest: &str) -> Result<f64> {
        let dest = self.lookup_area(dest)?;
        Ok(self.area_named(src)?.beta(dest))
    }

    /// Override the plasticity rate of `stimulus -> dest` synapses.
    pub fn set_stimulus_beta(&mut self, stimulus: &str, dest: &str, beta: f64) -> Result<()> {
        let src = self.lookup_stimulus(stimulus)?;
        let dest = self.lookup_area(dest)?;
        self.stimuli[src.index()].set_beta(dest, beta)
    }

    pub fn stimulus_beta(&self, stimulus: &str, dest: &str) -> Result<f64> {
        let dest = self.lookup_area(dest)?;
        Ok(self.stimulus_named(stimulus)?.beta(dest))
    }

    pub fn set_area_default_beta(&mut self, area: &str, beta: f64) -> Result<()> {
        let id = self.lookup_area(area)?;
        self.areas[id.index()].set_default_beta(beta)
    }

    pub fn set_stimulus_default_beta(&mut self, stimulus: &str, beta: f64) -> Result<()> {
        let id = self.lookup_stimulus(stimulus)?;
        self.stimuli[id.index()].set_default_beta(beta)
    }

    // ---------------------------------------------------------------------
    // Projection
    // ---------------------------------------------------------------------

    /// Translates a name-keyed request into arena ids.
    pub fn resolve(&self, request: &Projection) -> Result<ResolvedProjection> {
        let mut resolved = ResolvedProjection::new();
        for (src, dests) in request.stimulus_edges() {
            let src = self.lookup_stimulus(src)?;
            let dests = dests
                .iter()
                .map(|d| self.lookup_area(d))
                .collect::<Result<Vec<_>>>()?;
            resolved = resolved.stimulus(src, dests);
        }
        for (src, dests) in request.area_edges() {
            let src = self.lookup_area(src)?;
            let dests = dests
                .iter()
                .map(|d| self.lookup_area(d))
                .collect::<Result<Vec<_>>>()?;
            resolved = resolved.area(src, dests);
        }
        Ok(resolved)
    }

    /// Runs one synchronized round. Every name is resolved before anything is
    /// mutated, so an unknown name leaves the brain untouched.
    pub fn project(&mut self, request: &Projection) -> Result<RoundReport> {
        let resolved = self.resolve(request)?;
        Ok(self.run_round(&resolved))
    }

    pub fn project_resolved(&mut self, request: &ResolvedProjection) -> Result<RoundReport> {
        self.check_ids(request)?;
        Ok(self.run_round(request))
    }

    fn check_ids(&self, request: &ResolvedProjection) -> Result<()> {
        if let Some(id) = request
            .stimulus_sources()
            .find(|id| id.index() >= self.stimuli.len())
        {
            return Err(BrainError::UnknownId {
                kind: EntityKind::Stimulus,
                index: id.index(),
            });
        }
        let bad_area = request
            .area_sources()
            .chain(request.destinations())
            .find(|id| id.index() >= self.areas.len());
        if let Some(id) = bad_area {
            return Err(BrainError::UnknownId {
                kind: EntityKind::Area,
                index: id.index(),
            });
        }
        Ok(())
    }

    /// Reset, accumulate, select, reinforce.
    ///
    /// Winner selection only runs after every pair has accumulated, and
    /// reinforcement only runs after every destination has selected, so the
    /// outcome does not depend on the order sources are visited in.
    fn run_round(&mut self, request: &ResolvedProjection) -> RoundReport {
        self.rounds += 1;

        if request.is_empty() {
            return RoundReport::default();
        }
        let destinations = request.destinations();
        let stimulus_pairs = request.stimulus_pairs();
        let area_pairs = request.area_pairs();

        // Reset each destination once and hold its buffer outside the arena so
        // an area can be a source and a destination in the same round.
        let mut buffers: HashMap<AreaId, Vec<Activation>> = destinations
            .iter()
            .map(|&d| {
                let area = &mut self.areas[d.index()];
                area.reset_activations();
                (d, area.take_activations())
            })
            .collect();

        for &(src, dest) in &stimulus_pairs {
            let dest_n = self.areas[dest.index()].n();
            if let Some(buffer) = buffers.get_mut(&dest) {
                self.stimuli[src.index()].project_into(dest, dest_n, buffer, &mut self.rng);
            }
        }
        for &(src, dest) in &area_pairs {
            let dest_n = self.areas[dest.index()].n();
            if let Some(buffer) = buffers.get_mut(&dest) {
                self.areas[src.index()].project_into(dest, dest_n, buffer, &mut self.rng);
            }
        }

        for &dest in &destinations {
            let area = &mut self.areas[dest.index()];
            if let Some(buffer) = buffers.remove(&dest) {
                area.restore_activations(buffer);
            }
            area.recalculate_winners();
        }

        let mut reinforced = 0;
        for &(src, dest) in &stimulus_pairs {
            let winners = self.areas[dest.index()].winners();
            reinforced += self.stimuli[src.index()].update_plasticities(dest, winners);
        }
        // Area sources reinforce from their current winners, which are this
        // round's winners if the source was also a destination.
        for &(src, dest) in &area_pairs {
            let fired = self.areas[src.index()].winners().to_vec();
            let winners = self.areas[dest.index()].winners().to_vec();
            reinforced += self.areas[src.index()].update_plasticities(dest, &fired, &winners);
        }

        let report = RoundReport {
            destinations: destinations.len(),
            pairs: stimulus_pairs.len() + area_pairs.len(),
            reinforced_synapses: reinforced,
        };
        tracing::debug!(
            round = self.rounds,
            destinations = report.destinations,
            pairs = report.pairs,
            reinforced = report.reinforced_synapses,
            "projection round"
        );
        report
    }

    // ---------------------------------------------------------------------
    // Assemblies
    // ---------------------------------------------------------------------

    /// Fires `stimulus` alone into `area` and records the resulting winners as
    /// that stimulus's assembly. Weights are left unchanged.
    pub fn save_assembly(&mut self, area: &str, stimulus: &str) -> Result<()> {
        let area = self.lookup_area(area)?;
        let stimulus = self.lookup_stimulus(stimulus)?;
        self.areas[area.index()].save_assembly(&mut self.stimuli[stimulus.index()], &mut self.rng);
        Ok(())
    }

    /// Which saved assembly the area's current winners overlap most.
    pub fn read_assembly(&self, area: &str) -> Result<Recall> {
        let area = self.area_named(area)?;
        let recall = area.read_assembly();
        tracing::debug!(area = area.name(), ?recall, "read assembly");
        Ok(recall)
    }

    /// Name of the recognized stimulus, or `None` when nothing was saved.
    pub fn recognize(&self, area: &str) -> Result<Option<&str>> {
        Ok(self
            .read_assembly(area)?
            .stimulus()
            .and_then(|id| self.stimulus(id))
            .map(Stimulus::name))
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let outgoing = self
            .areas
            .iter()
            .map(Area::outgoing)
            .chain(self.stimuli.iter().map(Stimulus::outgoing));
        let (mut matrix_count, mut synapse_count) = (0, 0);
        for out in outgoing {
            matrix_count += out.len();
            synapse_count += out.edge_count();
        }
        Diagnostics {
            area_count: self.areas.len(),
            stimulus_count: self.stimuli.len(),
            matrix_count,
            synapse_count,
            saved_assembly_count: self
                .areas
                .iter()
                .map(|a| a.saved_assemblies().count())
                .sum(),
            rounds: self.rounds,
        }
    }
}

use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{validate_beta, AreaConfig};
use crate::error::Result;
use crate::prng::Prng;
use crate::stimulus::{Stimulus, StimulusId};
use crate::synapse::{NeuronId, OutgoingSynapses, SynapseMatrix};

/// Accumulated input of a neuron during one round.
pub type Activation = f64;

/// Stable handle of an area inside its brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AreaId(u32);

impl AreaId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Winner set recorded when a stimulus fired alone into an area.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SavedAssembly {
    pub stimulus: StimulusId,
    /// Ascending neuron indices.
    pub neurons: Vec<NeuronId>,
}

/// Outcome of a recognition query against an area's saved assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Recall {
    /// Best matching saved assembly and how many winners it shares.
    Match {
        stimulus: StimulusId,
        overlap: usize,
    },
    /// Nothing has been saved in this area yet.
    NoMatch,
}

impl Recall {
    pub fn stimulus(&self) -> Option<StimulusId> {
        match self {
            Recall::Match { stimulus, .. } => Some(*stimulus),
            Recall::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Recall::Match { .. })
    }
}

/// A population of `n` neurons with k-winner-take-all dynamics.
#[derive(Debug, Clone)]
pub struct Area {
    id: AreaId,
    name: String,
    n: usize,
    k: usize,
    p: f64,
    default_beta: f64,
    custom_betas: HashMap<AreaId, f64>,

    // Transient: reset at the start of every round that targets this area.
    activations: Vec<Activation>,
    // Ascending; persists until the next round that targets this area.
    winners: Vec<NeuronId>,

    outgoing: OutgoingSynapses,
    // Keyed by stimulus name so enumeration (and recall tie-breaks) follow
    // lexicographic order.
    saved_assemblies: BTreeMap<String, SavedAssembly>,
}

impl Area {
    pub(crate) fn new(id: AreaId, name: &str, cfg: AreaConfig) -> Self {
        Self {
            id,
            name: name.to_string(),
            n: cfg.n,
            k: cfg.k,
            p: cfg.p,
            default_beta: cfg.default_beta,
            custom_betas: HashMap::new(),
            activations: vec![0.0; cfg.n],
            winners: Vec::new(),
            outgoing: OutgoingSynapses::default(),
            saved_assemblies: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> AreaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Configured winner cap.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of winners a round actually selects: `min(k, n)`.
    pub fn winner_count(&self) -> usize {
        self.k.min(self.n)
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn default_beta(&self) -> f64 {
        self.default_beta
    }

    pub(crate) fn set_default_beta(&mut self, beta: f64) -> Result<()> {
        validate_beta(beta)?;
        self.default_beta = beta;
        Ok(())
    }

    pub fn beta(&self, dest: AreaId) -> f64 {
        self.custom_betas
            .get(&dest)
            .copied()
            .unwrap_or(self.default_beta)
    }

    pub(crate) fn set_beta(&mut self, dest: AreaId, beta: f64) -> Result<()> {
        validate_beta(beta)?;
        self.custom_betas.insert(dest, beta);
        Ok(())
    }

    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    pub fn winners(&self) -> &[NeuronId] {
        &self.winners
    }

    pub fn synapses_to(&self, dest: AreaId) -> Option<&SynapseMatrix> {
        self.outgoing.get(dest)
    }

    pub fn outgoing(&self) -> &OutgoingSynapses {
        &self.outgoing
    }

    pub fn saved_assemblies(&self) -> impl Iterator<Item = (&str, &SavedAssembly)> {
        self.saved_assemblies
            .iter()
            .map(|(name, saved)| (name.as_str(), saved))
    }

    pub fn saved_assembly(&self, stimulus_name: &str) -> Option<&SavedAssembly> {
        self.saved_assemblies.get(stimulus_name)
    }

    pub fn reset_activations(&mut self) {
        self.activations.clear();
        self.activations.resize(self.n, 0.0);
    }

    /// Moves the activation buffer out so other sources can accumulate into
    /// it while this area is itself borrowed as a source.
    pub(crate) fn take_activations(&mut self) -> Vec<Activation> {
        core::mem::take(&mut self.activations)
    }

    pub(crate) fn restore_activations(&mut self, activations: Vec<Activation>) {
        debug_assert_eq!(activations.len(), self.n);
        self.activations = activations;
    }

    /// Adds the outgoing weights of this area's current winners into the
    /// destination's activations, generating the `n x dest_n` matrix on first
    /// use. Only winners fire.
    pub(crate) fn project_into(
        &mut self,
        dest: AreaId,
        dest_n: usize,
        activations: &mut [Activation],
        rng: &mut Prng,
    ) {
        let matrix = self
            .outgoing
            .get_or_generate(&self.name, dest, self.n, dest_n, self.p, rng);
        matrix.accumulate(self.winners.iter().copied(), activations);
    }

    /// Selects the top `min(k, n)` neurons by activation.
    ///
    /// Ties go to the lower neuron index. The stored winners are ascending.
    pub fn recalculate_winners(&mut self) {
        let take = self.winner_count().min(self.activations.len());
        let activations = &self.activations;
        let mut ranked: Vec<NeuronId> = (0..activations.len()).collect();
        let by_rank = |a: &NeuronId, b: &NeuronId| {
            activations[*b]
                .total_cmp(&activations[*a])
                .then_with(|| a.cmp(b))
        };

        if take > 0 && take < ranked.len() {
            ranked.select_nth_unstable_by(take - 1, by_rank);
        }
        ranked.truncate(take);
        ranked.sort_unstable();
        self.winners = ranked;
    }

    /// Strengthens every `firing -> dest winner` edge by `1 + beta(dest)`.
    pub(crate) fn update_plasticities(
        &mut self,
        dest: AreaId,
        firing: &[NeuronId],
        dest_winners: &[NeuronId],
    ) -> usize {
        let factor = 1.0 + self.beta(dest);
        match self.outgoing.get_mut(dest) {
            Some(matrix) => matrix.reinforce(firing.iter().copied(), dest_winners, factor),
            None => 0,
        }
    }

    /// Fires `stimulus` alone into this area and records the winners it
    /// settles on. No plasticity is applied.
    pub(crate) fn save_assembly(&mut self, stimulus: &mut Stimulus, rng: &mut Prng) {
        self.reset_activations();
        let mut activations = self.take_activations();
        stimulus.project_into(self.id, self.n, &mut activations, rng);
        self.restore_activations(activations);
        self.recalculate_winners();

        tracing::debug!(
            area = %self.name,
            stimulus = stimulus.name(),
            winners = self.winners.len(),
            "saved assembly"
        );
        self.saved_assemblies.insert(
            stimulus.name().to_string(),
            SavedAssembly {
                stimulus: stimulus.id(),
                neurons: self.winners.clone(),
            },
        );
    }

    /// Finds the saved assembly sharing the most neurons with the current
    /// winners. Equal overlaps resolve to the lexicographically smallest
    /// stimulus name.
    pub fn read_assembly(&self) -> Recall {
        let mut best = Recall::NoMatch;
        let mut best_overlap = 0;
        for saved in self.saved_assemblies.values() {
            let overlap = overlap_count(&self.winners, &saved.neurons);
            if !best.is_match() || overlap > best_overlap {
                best = Recall::Match {
                    stimulus: saved.stimulus,
                    overlap,
                };
                best_overlap = overlap;
            }
        }
        best
    }
}

/// Size of the intersection of two ascending index lists, in one merge pass.
pub fn overlap_count(a: &[NeuronId], b: &[NeuronId]) -> usize {
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            core::cmp::Ordering::Less => i += 1,
            core::cmp::Ordering::Greater => j += 1,
            core::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    common
}

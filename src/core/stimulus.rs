use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::area::AreaId;
use crate::config::{validate_beta, StimulusConfig};
use crate::error::Result;
use crate::prng::Prng;
use crate::synapse::{NeuronId, OutgoingSynapses, SynapseMatrix};

/// Stable handle of a stimulus inside its brain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StimulusId(u32);

impl StimulusId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An always-firing input population with `k` output lines.
///
/// A stimulus has no neurons of its own: every line fires every round it is
/// projected, so its firing set is always `0..k`.
#[derive(Debug, Clone)]
pub struct Stimulus {
    id: StimulusId,
    name: String,
    k: usize,
    p: f64,
    default_beta: f64,
    custom_betas: HashMap<AreaId, f64>,
    outgoing: OutgoingSynapses,
}

impl Stimulus {
    pub(crate) fn new(id: StimulusId, name: &str, cfg: StimulusConfig) -> Self {
        Self {
            id,
            name: name.to_string(),
            k: cfg.k,
            p: cfg.p,
            default_beta: cfg.default_beta,
            custom_betas: HashMap::new(),
            outgoing: OutgoingSynapses::default(),
        }
    }

    pub fn id(&self) -> StimulusId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn k(&self) -> usize {
        self.k
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

    /// Plasticity rate toward `area`: the override if set, else the default.
    pub fn beta(&self, area: AreaId) -> f64 {
        self.custom_betas
            .get(&area)
            .copied()
            .unwrap_or(self.default_beta)
    }

    pub(crate) fn set_beta(&mut self, area: AreaId, beta: f64) -> Result<()> {
        validate_beta(beta)?;
        self.custom_betas.insert(area, beta);
        Ok(())
    }

    pub fn synapses_to(&self, area: AreaId) -> Option<&SynapseMatrix> {
        self.outgoing.get(area)
    }

    pub fn outgoing(&self) -> &OutgoingSynapses {
        &self.outgoing
    }

    /// Adds every line's outgoing weights into the destination's activations,
    /// generating the `k x area_n` matrix on first use.
    pub(crate) fn project_into(
        &mut self,
        area: AreaId,
        area_n: usize,
        activations: &mut [f64],
        rng: &mut Prng,
    ) {
        let matrix = self
            .outgoing
            .get_or_generate(&self.name, area, self.k, area_n, self.p, rng);
        matrix.accumulate(0..self.k, activations);
    }

    /// Strengthens every `line -> winner` edge by `1 + beta`.
    ///
    /// A stimulus that never projected into `area` has nothing to reinforce.
    pub(crate) fn update_plasticities(&mut self, area: AreaId, winners: &[NeuronId]) -> usize {
        let factor = 1.0 + self.beta(area);
        let k = self.k;
        match self.outgoing.get_mut(area) {
            Some(matrix) => matrix.reinforce(0..k, winners, factor),
            None => 0,
        }
    }
}

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::area::AreaId;
use crate::prng::Prng;

/// Index of a neuron inside its area (or of a line inside a stimulus).
pub type NeuronId = usize;

/// Synaptic weight; every generated edge starts at 1.0.
pub type Weight = f64;

/// Weight carried by a freshly generated synapse.
pub const INITIAL_WEIGHT: Weight = 1.0;

/// CSR (Compressed Sparse Row) adjacency from a source population to a
/// destination area.
///
/// Row `i` owns entries `offsets[i]..offsets[i + 1]`, and its targets are
/// strictly ascending. Plasticity relies on that order to binary-search a
/// winner inside a row. The edge set is fixed at generation; only weights
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynapseMatrix {
    cols: usize,
    /// Flat array of all connection targets.
    targets: Vec<NeuronId>,
    /// Parallel array of connection weights.
    weights: Vec<Weight>,
    /// Length = rows + 1.
    offsets: Vec<usize>,
}

impl SynapseMatrix {
    /// Draws an independent Bernoulli(`p`) edge for every `(row, col)` pair.
    ///
    /// Draw order is row-major with ascending columns, so each row comes out
    /// sorted and the same `rng` state always yields the same matrix.
    pub fn random(rows: usize, cols: usize, p: f64, rng: &mut Prng) -> Self {
        let expected = ((rows as f64) * (cols as f64) * p.clamp(0.0, 1.0)) as usize;
        let mut targets = Vec::with_capacity(expected);
        let mut offsets = Vec::with_capacity(rows + 1);
        offsets.push(0);

        for _ in 0..rows {
            for col in 0..cols {
                if rng.bernoulli(p) {
                    targets.push(col);
                }
            }
            offsets.push(targets.len());
        }

        let weights = vec![INITIAL_WEIGHT; targets.len()];
        Self {
            cols,
            targets,
            weights,
            offsets,
        }
    }

    /// Builds a matrix from explicit rows. Each row is sorted and deduplicated.
    #[cfg(test)]
    pub(crate) fn from_rows(cols: usize, rows: &[Vec<NeuronId>]) -> Self {
        let mut targets = Vec::new();
        let mut offsets = Vec::with_capacity(rows.len() + 1);
        offsets.push(0);
        for row in rows {
            let mut row = row.clone();
            row.sort_unstable();
            row.dedup();
            debug_assert!(row.last().map_or(true, |&t| t < cols));
            targets.extend(row);
            offsets.push(targets.len());
        }
        let weights = vec![INITIAL_WEIGHT; targets.len()];
        Self {
            cols,
            targets,
            weights,
            offsets,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.targets.len()
    }

    #[inline]
    fn range(&self, row: NeuronId) -> core::ops::Range<usize> {
        self.offsets[row]..self.offsets[row + 1]
    }

    /// Targets and weights of one source row.
    pub fn row(&self, row: NeuronId) -> (&[NeuronId], &[Weight]) {
        let r = self.range(row);
        (&self.targets[r.clone()], &self.weights[r])
    }

    /// Weight of edge `row -> target`, if the edge exists.
    pub fn weight(&self, row: NeuronId, target: NeuronId) -> Option<Weight> {
        let r = self.range(row);
        let pos = self.targets[r.clone()].binary_search(&target).ok()?;
        Some(self.weights[r.start + pos])
    }

    pub fn total_weight(&self) -> Weight {
        self.weights.iter().sum()
    }

    /// Adds the outgoing weights of every firing row into `activations`.
    pub fn accumulate<I>(&self, firing: I, activations: &mut [f64])
    where
        I: IntoIterator<Item = NeuronId>,
    {
        debug_assert_eq!(activations.len(), self.cols);
        for src in firing {
            let r = self.range(src);
            for (&target, &w) in self.targets[r.clone()].iter().zip(&self.weights[r]) {
                activations[target] += w;
            }
        }
    }

    /// Multiplies by `factor` every edge from a firing row to a winner.
    ///
    /// Returns how many edges were touched.
    pub fn reinforce<I>(&mut self, firing: I, winners: &[NeuronId], factor: f64) -> usize
    where
        I: IntoIterator<Item = NeuronId>,
    {
        let mut touched = 0;
        for src in firing {
            let r = self.range(src);
            let row = &self.targets[r.clone()];
            for w in winners {
                if let Ok(pos) = row.binary_search(w) {
                    self.weights[r.start + pos] *= factor;
                    touched += 1;
                }
            }
        }
        touched
    }
}

/// Lazily materialized adjacency from one source to every area it has
/// projected into.
///
/// A matrix is generated the first time a destination is requested and is
/// never regenerated afterwards.
#[derive(Debug, Clone, Default)]
pub struct OutgoingSynapses {
    matrices: HashMap<AreaId, SynapseMatrix>,
}

impl OutgoingSynapses {
    pub fn get(&self, dest: AreaId) -> Option<&SynapseMatrix> {
        self.matrices.get(&dest)
    }

    pub(crate) fn get_mut(&mut self, dest: AreaId) -> Option<&mut SynapseMatrix> {
        self.matrices.get_mut(&dest)
    }

    /// Generate-if-absent accessor for the `source -> dest` matrix.
    pub(crate) fn get_or_generate(
        &mut self,
        source: &str,
        dest: AreaId,
        rows: usize,
        cols: usize,
        p: f64,
        rng: &mut Prng,
    ) -> &mut SynapseMatrix {
        self.matrices.entry(dest).or_insert_with(|| {
            let matrix = SynapseMatrix::random(rows, cols, p, rng);
            tracing::trace!(
                source,
                dest = dest.index(),
                rows,
                cols,
                edges = matrix.edge_count(),
                "generated synapses"
            );
            matrix
        })
    }

    /// Destinations with a materialized matrix, ascending by id.
    pub fn destinations(&self) -> Vec<AreaId> {
        let mut ids: Vec<AreaId> = self.matrices.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.matrices.values().map(SynapseMatrix::edge_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_rows_are_sorted_with_unit_weights() {
        let mut rng = Prng::new(5);
        let m = SynapseMatrix::random(20, 200, 0.1, &mut rng);
        assert_eq!(m.rows(), 20);
        assert_eq!(m.cols(), 200);
        assert!(m.edge_count() > 0);
        for i in 0..m.rows() {
            let (targets, weights) = m.row(i);
            assert!(targets.windows(2).all(|w| w[0] < w[1]));
            assert!(targets.iter().all(|&t| t < 200));
            assert!(weights.iter().all(|&w| w == INITIAL_WEIGHT));
        }
    }

    #[test]
    fn generation_is_reproducible_from_seed() {
        let a = SynapseMatrix::random(10, 50, 0.2, &mut Prng::new(99));
        let b = SynapseMatrix::random(10, 50, 0.2, &mut Prng::new(99));
        assert_eq!(a, b);
    }

    #[test]
    fn density_extremes() {
        let mut rng = Prng::new(1);
        let empty = SynapseMatrix::random(4, 8, 0.0, &mut rng);
        assert_eq!(empty.edge_count(), 0);
        let full = SynapseMatrix::random(4, 8, 1.0, &mut rng);
        assert_eq!(full.edge_count(), 32);
    }

    #[test]
    fn accumulate_sums_only_firing_rows() {
        let m = SynapseMatrix::from_rows(4, &[vec![0, 2], vec![2, 3], vec![1]]);
        let mut act = vec![0.0; 4];
        m.accumulate([0, 1], &mut act);
        assert_eq!(act, vec![1.0, 0.0, 2.0, 1.0]);
    }

    #[test]
    fn reinforce_touches_only_firing_to_winner_edges() {
        let mut m = SynapseMatrix::from_rows(4, &[vec![0, 2], vec![2, 3], vec![1, 2]]);
        let touched = m.reinforce([0, 1], &[2, 3], 1.5);
        assert_eq!(touched, 3);
        assert_eq!(m.weight(0, 2), Some(1.5));
        assert_eq!(m.weight(1, 2), Some(1.5));
        assert_eq!(m.weight(1, 3), Some(1.5));
        assert_eq!(m.weight(0, 0), Some(1.0));
        // Row 2 did not fire.
        assert_eq!(m.weight(2, 2), Some(1.0));
        assert_eq!(m.weight(0, 1), None);
    }

    #[test]
    fn outgoing_generates_once_per_destination() {
        let mut rng = Prng::new(8);
        let mut out = OutgoingSynapses::default();
        let dest = AreaId::from_index(0);
        assert!(out.get(dest).is_none());
        assert_eq!(out.len(), 0);

        let first = out.get_or_generate("src", dest, 5, 40, 0.3, &mut rng).clone();
        first_row_weights_bump(&mut out, dest);
        let again = out.get_or_generate("src", dest, 5, 40, 0.3, &mut rng);
        assert_eq!(again.rows(), first.rows());
        for i in 0..first.rows() {
            assert_eq!(again.row(i).0, first.row(i).0);
        }
        assert_eq!(out.len(), 1);
        assert_eq!(out.destinations(), vec![dest]);
    }

    fn first_row_weights_bump(out: &mut OutgoingSynapses, dest: AreaId) {
        if let Some(m) = out.get_mut(dest) {
            let targets = m.row(0).0.to_vec();
            m.reinforce([0], &targets, 2.0);
        }
    }
}

//! Projection requests.
//!
//! A request maps sources (stimuli and areas) to the destination areas they
//! fire into during one synchronized round. [`Projection`] is keyed by name and
//! is what orchestration code builds; [`ResolvedProjection`] is the same shape
//! keyed by arena ids, produced by `Brain::resolve`.

use std::collections::BTreeMap;

use crate::area::AreaId;
use crate::stimulus::StimulusId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    stimuli: BTreeMap<String, Vec<String>>,
    areas: BTreeMap<String, Vec<String>>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a request from `source -> destinations` maps.
    pub fn from_maps<S, A, K, V, D>(stimuli: S, areas: A) -> Self
    where
        S: IntoIterator<Item = (K, V)>,
        A: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoIterator<Item = D>,
        D: Into<String>,
    {
        let mut request = Self::new();
        for (src, dests) in stimuli {
            request = request.stimulus(src, dests);
        }
        for (src, dests) in areas {
            request = request.area(src, dests);
        }
        request
    }

    /// Fire stimulus `name` into each of `dests`.
    ///
    /// Calling this again for the same stimulus extends its destination list.
    /// A destination named more than once for the same stimulus is projected
    /// and reinforced once per round.
    pub fn stimulus<N, I, D>(mut self, name: N, dests: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.stimuli
            .entry(name.into())
            .or_default()
            .extend(dests.into_iter().map(Into::into));
        self
    }

    /// Fire area `name`'s current winners into each of `dests`.
    ///
    /// As with [`Projection::stimulus`], a repeated destination counts once.
    pub fn area<N, I, D>(mut self, name: N, dests: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = D>,
        D: Into<String>,
    {
        self.areas
            .entry(name.into())
            .or_default()
            .extend(dests.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stimuli.values().all(Vec::is_empty) && self.areas.values().all(Vec::is_empty)
    }

    pub fn stimulus_edges(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.stimuli.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn area_edges(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.areas.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// A projection request expressed in arena ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProjection {
    stimuli: BTreeMap<StimulusId, Vec<AreaId>>,
    areas: BTreeMap<AreaId, Vec<AreaId>>,
}

impl ResolvedProjection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stimulus(mut self, src: StimulusId, dests: impl IntoIterator<Item = AreaId>) -> Self {
        self.stimuli.entry(src).or_default().extend(dests);
        self
    }

    pub fn area(mut self, src: AreaId, dests: impl IntoIterator<Item = AreaId>) -> Self {
        self.areas.entry(src).or_default().extend(dests);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stimuli.values().all(Vec::is_empty) && self.areas.values().all(Vec::is_empty)
    }

    pub(crate) fn stimulus_sources(&self) -> impl Iterator<Item = StimulusId> + '_ {
        self.stimuli.keys().copied()
    }

    pub(crate) fn area_sources(&self) -> impl Iterator<Item = AreaId> + '_ {
        self.areas.keys().copied()
    }

    /// `(stimulus, destination)` pairs; a destination listed twice for the
    /// same source counts once.
    pub fn stimulus_pairs(&self) -> Vec<(StimulusId, AreaId)> {
        pairs(&self.stimuli)
    }

    pub fn area_pairs(&self) -> Vec<(AreaId, AreaId)> {
        pairs(&self.areas)
    }

    /// Every destination named in either half, ascending and deduplicated.
    pub fn destinations(&self) -> Vec<AreaId> {
        let mut dests: Vec<AreaId> = self
            .stimuli
            .values()
            .chain(self.areas.values())
            .flatten()
            .copied()
            .collect();
        dests.sort_unstable();
        dests.dedup();
        dests
    }
}

fn pairs<S: Copy>(edges: &BTreeMap<S, Vec<AreaId>>) -> Vec<(S, AreaId)> {
    let mut out = Vec::new();
    for (&src, dests) in edges {
        let mut seen: Vec<AreaId> = Vec::with_capacity(dests.len());
        for &dest in dests {
            if !seen.contains(&dest) {
                seen.push(dest);
                out.push((src, dest));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_extends_destinations_per_source() {
        let p = Projection::new()
            .stimulus("cat", ["v1"])
            .stimulus("cat", ["v2"])
            .area("v1", ["wp"]);
        let stim: Vec<_> = p.stimulus_edges().collect();
        assert_eq!(stim.len(), 1);
        assert_eq!(stim[0].1, ["v1".to_string(), "v2".to_string()]);
        assert!(!p.is_empty());
        assert!(Projection::new().is_empty());
    }

    #[test]
    fn from_maps_matches_builder() {
        let stimuli = [("cat", vec!["v1", "v2"])];
        let areas = [("v1", vec!["wp"])];
        let p = Projection::from_maps(stimuli, areas);
        let q = Projection::new()
            .stimulus("cat", ["v1", "v2"])
            .area("v1", ["wp"]);
        assert_eq!(p, q);
    }

    #[test]
    fn destinations_are_deduplicated_across_halves() {
        let a = AreaId::from_index(0);
        let b = AreaId::from_index(1);
        let c = AreaId::from_index(2);
        let r = ResolvedProjection::new()
            .stimulus(StimulusId::from_index(0), [c, a])
            .stimulus(StimulusId::from_index(1), [a])
            .area(b, [a, c]);
        assert_eq!(r.destinations(), vec![a, c]);
    }

    #[test]
    fn repeated_destination_is_one_pair() {
        let a = AreaId::from_index(0);
        let s = StimulusId::from_index(0);
        let r = ResolvedProjection::new().stimulus(s, [a, a, a]);
        assert_eq!(r.stimulus_pairs(), vec![(s, a)]);
    }

    #[test]
    fn empty_destination_list_is_empty_request() {
        let r = ResolvedProjection::new().area(AreaId::from_index(0), []);
        assert!(r.is_empty());
        assert!(r.destinations().is_empty());
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::substrate::{Brain, Diagnostics};
use crate::synapse::NeuronId;

/// A read-only snapshot of a brain.
///
/// Observers cannot mutate the brain; snapshotting allocates and is meant to
/// be taken between rounds.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BrainSnapshot {
    pub diagnostics: Diagnostics,
    pub areas: Vec<AreaSnapshot>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AreaSnapshot {
    pub name: String,
    pub n: usize,
    pub k: usize,
    pub winners: Vec<NeuronId>,
    /// Stimuli with a saved assembly here, in name order.
    pub saved: Vec<String>,
    /// Areas this one has projected into, in creation order.
    pub destinations: Vec<String>,
}

pub struct BrainAdapter<'a> {
    brain: &'a Brain,
}

impl<'a> BrainAdapter<'a> {
    pub fn new(brain: &'a Brain) -> Self {
        Self { brain }
    }

    pub fn snapshot(&self) -> BrainSnapshot {
        BrainSnapshot {
            diagnostics: self.brain.diagnostics(),
            areas: self
                .brain
                .areas()
                .iter()
                .map(|a| self.area_snapshot(a))
                .collect(),
        }
    }

    fn area_snapshot(&self, area: &Area) -> AreaSnapshot {
        AreaSnapshot {
            name: area.name().to_string(),
            n: area.n(),
            k: area.k(),
            winners: area.winners().to_vec(),
            saved: area
                .saved_assemblies()
                .map(|(name, _)| name.to_string())
                .collect(),
            destinations: area
                .outgoing()
                .destinations()
                .into_iter()
                .filter_map(|id| self.brain.area(id).map(|a| a.name().to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrainConfig;
    use crate::projection::Projection;

    #[test]
    fn snapshot_reflects_brain_state() {
        let mut brain = Brain::new(BrainConfig::default().with_seed(5));
        brain.create_area("v", 100, 5, 0.1, 0.1).unwrap();
        brain.create_area("w", 100, 5, 0.1, 0.1).unwrap();
        brain.create_stimulus("s", 5, 0.1, 0.1).unwrap();
        brain
            .project(&Projection::new().stimulus("s", ["v"]))
            .unwrap();
        brain.project(&Projection::new().area("v", ["w"])).unwrap();
        brain.save_assembly("v", "s").unwrap();

        let snap = BrainAdapter::new(&brain).snapshot();
        assert_eq!(snap.diagnostics.rounds, 2);
        assert_eq!(snap.diagnostics.matrix_count, 2);
        assert_eq!(snap.areas.len(), 2);

        let v = &snap.areas[0];
        assert_eq!(v.name, "v");
        assert_eq!(v.winners.len(), 5);
        assert_eq!(v.saved, vec!["s".to_string()]);
        assert_eq!(v.destinations, vec!["w".to_string()]);
        assert!(snap.areas[1].destinations.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_serializes_to_json() {
        let mut brain = Brain::new(BrainConfig::default().with_seed(5));
        brain.create_area("v", 10, 2, 0.5, 0.1).unwrap();
        let snap = BrainAdapter::new(&brain).snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"name\":\"v\""));
    }
}

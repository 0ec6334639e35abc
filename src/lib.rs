//! # assemblies
//!
//! A simulation engine for the Assembly Calculus: named areas of abstract
//! neurons joined by sparse random synapses, k-winner-take-all competition,
//! and multiplicative Hebbian plasticity.
//!
//! ## Quick Start
//!
//! ```
//! use assemblies::prelude::*;
//!
//! let mut brain = Brain::new(BrainConfig::default().with_seed(42));
//! brain.create_area("vocab", 1000, 30, 0.02, 0.05)?;
//! brain.create_stimulus("apple", 30, 0.02, 0.05)?;
//!
//! // Fire the stimulus into the area a few times to form an assembly.
//! let request = Projection::new().stimulus("apple", ["vocab"]);
//! for _ in 0..10 {
//!     brain.project(&request)?;
//! }
//!
//! brain.save_assembly("vocab", "apple")?;
//! brain.project(&request)?;
//! assert_eq!(brain.recognize("vocab")?, Some("apple"));
//! # Ok::<(), assemblies::error::BrainError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): serialization for configs, reports and snapshots
//!
//! ## Modules
//!
//! - [`substrate`]: the brain registry and projection rounds
//! - [`area`] / [`stimulus`]: the two kinds of firing sources
//! - [`synapse`]: lazily generated sparse adjacency
//! - [`observer`]: read-only snapshots

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/synapse.rs"]
pub mod synapse;

#[path = "core/stimulus.rs"]
pub mod stimulus;

#[path = "core/area.rs"]
pub mod area;

#[path = "core/projection.rs"]
pub mod projection;

#[path = "core/substrate.rs"]
pub mod substrate;

pub mod observer;

/// Prelude module for convenient imports.
///
/// ```
/// use assemblies::prelude::*;
/// ```
pub mod prelude {
    pub use crate::area::{Activation, Area, AreaId, Recall, SavedAssembly};
    pub use crate::config::{AreaConfig, BrainConfig, StimulusConfig};
    pub use crate::error::{BrainError, EntityKind};
    pub use crate::projection::{Projection, ResolvedProjection};
    pub use crate::stimulus::{Stimulus, StimulusId};
    pub use crate::substrate::{Brain, Diagnostics, RoundReport};
    pub use crate::synapse::{NeuronId, SynapseMatrix, Weight};
}

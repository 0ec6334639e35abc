#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{BrainError, Result};

/// Brain-wide settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BrainConfig {
    // If set, selects the synapse-generation stream. Unset falls back to seed 1.
    pub seed: Option<u64>,
}

impl BrainConfig {
    pub const DEFAULT_SEED: u64 = 1;

    /// Set the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub(crate) fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(Self::DEFAULT_SEED)
    }
}

/// Parameters of a neural area.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AreaConfig {
    /// Neuron count.
    pub n: usize,
    /// Winner cap per round; effectively `min(k, n)`.
    pub k: usize,
    /// Edge density for synapses this area generates toward other areas.
    pub p: f64,
    /// Plasticity rate used when no per-destination override is set.
    pub default_beta: f64,
}

impl Default for AreaConfig {
    /// The canonical assembly-calculus area: 2500 neurons, 50 winners,
    /// 1% connectivity and a 5% learning rate.
    fn default() -> Self {
        Self {
            n: 2500,
            k: 50,
            p: 0.01,
            default_beta: 0.05,
        }
    }
}

impl AreaConfig {
    pub fn new(n: usize, k: usize, p: f64, default_beta: f64) -> Self {
        Self {
            n,
            k,
            p,
            default_beta,
        }
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.default_beta = beta;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_density(self.p)?;
        validate_beta(self.default_beta)
    }
}

/// Parameters of an always-firing stimulus.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StimulusConfig {
    /// Number of output lines; every line fires every round.
    pub k: usize,
    pub p: f64,
    pub default_beta: f64,
}

impl Default for StimulusConfig {
    fn default() -> Self {
        let area = AreaConfig::default();
        Self {
            k: area.k,
            p: area.p,
            default_beta: area.default_beta,
        }
    }
}

impl StimulusConfig {
    pub fn new(k: usize, p: f64, default_beta: f64) -> Self {
        Self { k, p, default_beta }
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.default_beta = beta;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_density(self.p)?;
        validate_beta(self.default_beta)
    }
}

pub(crate) fn validate_density(p: f64) -> Result<()> {
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(BrainError::InvalidParameter {
            name: "p",
            reason: "must be in [0, 1]",
        });
    }
    Ok(())
}

pub(crate) fn validate_beta(beta: f64) -> Result<()> {
    if !beta.is_finite() || beta < 0.0 {
        return Err(BrainError::InvalidParameter {
            name: "beta",
            reason: "must be finite and >= 0",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AreaConfig::default().validate().is_ok());
        assert!(StimulusConfig::default().validate().is_ok());
        assert_eq!(BrainConfig::default().effective_seed(), BrainConfig::DEFAULT_SEED);
        assert_eq!(BrainConfig::default().with_seed(9).effective_seed(), 9);
    }

    #[test]
    fn density_out_of_range_is_rejected() {
        assert!(AreaConfig::new(10, 2, 1.5, 0.1).validate().is_err());
        assert!(AreaConfig::new(10, 2, -0.1, 0.1).validate().is_err());
        assert!(StimulusConfig::new(2, f64::NAN, 0.1).validate().is_err());
    }

    #[test]
    fn negative_beta_is_rejected() {
        let err = AreaConfig::new(10, 2, 0.5, -0.1).validate().unwrap_err();
        assert!(matches!(err, BrainError::InvalidParameter { name: "beta", .. }));
        assert!(StimulusConfig::default().with_beta(f64::INFINITY).validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn area_config_from_json() {
        let cfg: AreaConfig =
            serde_json::from_str(r#"{"n": 100, "k": 10, "p": 0.1, "default_beta": 0.2}"#).unwrap();
        assert_eq!(cfg, AreaConfig::new(100, 10, 0.1, 0.2));

        let brain: BrainConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(brain.seed, None);
    }
}

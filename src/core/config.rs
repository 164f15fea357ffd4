//! Simulation configuration with documented tunables
//!
//! Fixed rate tables live in `simulation::rates`; this module holds the
//! knobs an operator is expected to adjust per deployment, with notes on
//! how they interact.

use serde::Deserialize;

use crate::core::error::{Result, SimError};

/// Operator-tunable configuration for a running world
///
/// These values have been tuned to produce believable pacing at the default
/// rates. Changing them shifts how eagerly entities act and how expensive
/// movement is, not the underlying need arithmetic.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    // === PRIORITY RESOLUTION ===
    /// Minimum urgency score before a need produces an action
    ///
    /// Urgency = deficit x channel weight. Below this floor the person
    /// stays idle rather than chasing marginal improvements. At 60, a
    /// hungry person acts around consumption 92 (deficit 8 x weight 8)
    /// while environment only triggers below 85.
    pub urgency_floor: f32,

    /// Aggregate adequacy (percent) a Maslow level must reach before the
    /// level above accepts fulfillment
    ///
    /// 50 is the documented gate. Raising it makes higher needs harder to
    /// reach; it never affects depletion.
    pub adequacy_threshold: f32,

    // === MOVEMENT ===
    /// Map units a person covers per simulated hour of travel
    ///
    /// Travel time = ceil(distance / this), minimum one hour.
    pub travel_units_per_hour: f32,

    // === ECONOMY ===
    /// Fraction of employed residents' income collected weekly as tax
    pub tax_rate: f32,

    // === AUTOTICKER ===
    /// Lower bound on the autoticker interval (milliseconds)
    ///
    /// Sub-second intervals would make the poll/check model outrun most
    /// hosts; the control surface rejects anything smaller.
    pub min_tick_interval_ms: u64,

    // === PARALLELIZATION ===
    /// Minimum person count before the hourly calculator pass uses rayon
    ///
    /// Below this threshold, thread overhead exceeds benefits.
    pub parallel_threshold: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            urgency_floor: 60.0,
            adequacy_threshold: 50.0,
            travel_units_per_hour: 10.0,
            tax_rate: 0.2,
            min_tick_interval_ms: 1000,
            parallel_threshold: 1000,
        }
    }
}

impl WorldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, falling back to defaults for absent keys
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: WorldConfig =
            toml::from_str(s).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.adequacy_threshold) {
            return Err(SimError::Config(format!(
                "adequacy_threshold ({}) must be within 0-100",
                self.adequacy_threshold
            )));
        }

        if self.urgency_floor < 0.0 {
            return Err(SimError::Config(format!(
                "urgency_floor ({}) must be non-negative",
                self.urgency_floor
            )));
        }

        if self.travel_units_per_hour <= 0.0 {
            return Err(SimError::Config(
                "travel_units_per_hour must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(SimError::Config(format!(
                "tax_rate ({}) must be a fraction within 0-1",
                self.tax_rate
            )));
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<WorldConfig> = OnceLock::new();

/// Get the global world config (initializes with defaults if not set)
pub fn config() -> &'static WorldConfig {
    CONFIG.get_or_init(WorldConfig::default)
}

/// Set the global world config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: WorldConfig) -> std::result::Result<(), WorldConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_toml_overrides_subset() {
        let config = WorldConfig::from_toml_str("urgency_floor = 40.0\ntax_rate = 0.1\n")
            .expect("valid toml");
        assert_eq!(config.urgency_floor, 40.0);
        assert_eq!(config.tax_rate, 0.1);
        // Untouched keys keep defaults
        assert_eq!(config.parallel_threshold, WorldConfig::default().parallel_threshold);
    }

    #[test]
    fn test_bad_tax_rate_rejected() {
        assert!(WorldConfig::from_toml_str("tax_rate = 1.5").is_err());
    }
}

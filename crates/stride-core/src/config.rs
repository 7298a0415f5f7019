use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::types::{PreviewPhase, PreviewSchedule, SlipModel};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_sample_time() -> f64 {
    0.001
}
const fn default_step_height() -> f64 {
    0.1
}
const fn default_force_threshold() -> f64 {
    0.0
}

// ---------------------------------------------------------------------------
// Field checks (shared with the engine setters)
// ---------------------------------------------------------------------------

pub fn check_sample_time(sample_time: f64) -> Result<(), ConfigError> {
    if sample_time <= 0.0 || !sample_time.is_finite() {
        return Err(ConfigError::InvalidSampleTime(sample_time));
    }
    Ok(())
}

pub fn check_step_height(step_height: f64) -> Result<(), ConfigError> {
    if step_height < 0.0 || !step_height.is_finite() {
        return Err(ConfigError::InvalidStepHeight(step_height));
    }
    Ok(())
}

pub fn check_force_threshold(force_threshold: f64) -> Result<(), ConfigError> {
    if force_threshold < 0.0 || !force_threshold.is_finite() {
        return Err(ConfigError::InvalidForceThreshold(force_threshold));
    }
    Ok(())
}

/// Both SLIP constants must be positive and finite.
pub fn check_slip(slip: &SlipModel) -> Result<(), ConfigError> {
    for (field, value) in [("height", slip.height), ("stiffness", slip.stiffness)] {
        if value <= 0.0 || !value.is_finite() {
            return Err(ConfigError::InvalidSlip { field, value });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// PreviewConfig
// ---------------------------------------------------------------------------

/// Settings of a preview engine, loadable from TOML.
///
/// ```toml
/// sample_time = 0.01
/// step_height = 0.08
///
/// [slip]
/// height = 0.55
/// stiffness = 9000.0
///
/// [[schedule]]
/// type = "stance"
/// feet = ["lf_foot", "rf_foot", "lh_foot", "rh_foot"]
/// duration = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Preview sample period in seconds (default: 0.001).
    #[serde(default = "default_sample_time")]
    pub sample_time: f64,

    /// Swing foot clearance in meters (default: 0.1).
    #[serde(default = "default_step_height")]
    pub step_height: f64,

    /// Contact force magnitude (norm of the linear force) above which a
    /// contact counts as active, in N (default: 0).
    #[serde(default = "default_force_threshold")]
    pub force_threshold: f64,

    #[serde(default)]
    pub slip: SlipModel,

    /// Phases to preview. Empty means the schedule is set later.
    #[serde(default)]
    pub schedule: Vec<PreviewPhase>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            sample_time: default_sample_time(),
            step_height: default_step_height(),
            force_threshold: default_force_threshold(),
            slip: SlipModel::default(),
            schedule: Vec::new(),
        }
    }
}

impl PreviewConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_sample_time(self.sample_time)?;
        check_step_height(self.step_height)?;
        check_force_threshold(self.force_threshold)?;
        check_slip(&self.slip)?;
        for (index, phase) in self.schedule.iter().enumerate() {
            if phase.duration <= 0.0 || !phase.duration.is_finite() {
                return Err(ConfigError::InvalidPhaseDuration {
                    index,
                    duration: phase.duration,
                });
            }
        }
        Ok(())
    }

    /// The configured schedule, or `None` when no phase is listed.
    #[must_use]
    pub fn preview_schedule(&self) -> Option<PreviewSchedule> {
        if self.schedule.is_empty() {
            None
        } else {
            Some(PreviewSchedule::new(self.schedule.clone()))
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            phases = config.schedule.len(),
            "loaded preview config"
        );
        Ok(config)
    }
}

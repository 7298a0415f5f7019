use thiserror::Error;

/// Errors reported by the preview engine.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("Preview schedule is not defined")]
    ScheduleNotSet,

    #[error("Control dimension mismatch: expected {expected}, got {got}")]
    ControlDimension { expected: usize, got: usize },

    #[error("Phase count mismatch: schedule has {expected} phases, control has {got}")]
    PhaseCount { expected: usize, got: usize },

    #[error("Missing foothold shift for foot: {0}")]
    MissingFootShift(String),

    #[error("Phase index {index} out of range for a schedule of {phases} phases")]
    PhaseIndex { index: usize, phases: usize },

    #[error("Cannot sample duration {duration} at sample time {sample_time}")]
    SampleCount { duration: f64, sample_time: f64 },

    #[error("Invalid {field}: {value} (must be positive and finite)")]
    InvalidDynamics { field: &'static str, value: f64 },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid sample_time: {0} (must be > 0)")]
    InvalidSampleTime(f64),

    #[error("Invalid step_height: {0} (must be >= 0)")]
    InvalidStepHeight(f64),

    #[error("Invalid force_threshold: {0} (must be >= 0)")]
    InvalidForceThreshold(f64),

    #[error("Invalid SLIP {field}: {value} (must be > 0)")]
    InvalidSlip { field: &'static str, value: f64 },

    #[error("Invalid duration {duration} for phase {index} (must be > 0)")]
    InvalidPhaseDuration { index: usize, duration: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_error_from_config_error() {
        let err: PreviewError = ConfigError::InvalidSampleTime(-1.0).into();
        assert!(matches!(err, PreviewError::Config(_)));
        assert!(err.to_string().contains("-1"));
    }

    #[test]
    fn sample_errors_display() {
        assert_eq!(
            PreviewError::SampleCount {
                duration: 1e6,
                sample_time: 0.01
            }
            .to_string(),
            "Cannot sample duration 1000000 at sample time 0.01"
        );
        assert_eq!(
            PreviewError::InvalidDynamics {
                field: "mass",
                value: 0.0
            }
            .to_string(),
            "Invalid mass: 0 (must be positive and finite)"
        );
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let config_err: ConfigError = io_err.into();
        assert!(matches!(config_err, ConfigError::Io(_)));
    }

    #[test]
    fn preview_error_display_messages() {
        assert_eq!(
            PreviewError::ScheduleNotSet.to_string(),
            "Preview schedule is not defined"
        );
        assert_eq!(
            PreviewError::ControlDimension {
                expected: 13,
                got: 12
            }
            .to_string(),
            "Control dimension mismatch: expected 13, got 12"
        );
        assert_eq!(
            PreviewError::PhaseCount {
                expected: 2,
                got: 1
            }
            .to_string(),
            "Phase count mismatch: schedule has 2 phases, control has 1"
        );
        assert_eq!(
            PreviewError::MissingFootShift("lf_foot".into()).to_string(),
            "Missing foothold shift for foot: lf_foot"
        );
        assert_eq!(
            PreviewError::PhaseIndex {
                index: 4,
                phases: 2
            }
            .to_string(),
            "Phase index 4 out of range for a schedule of 2 phases"
        );
    }

    #[test]
    fn config_error_display_messages() {
        assert_eq!(
            ConfigError::InvalidSampleTime(0.0).to_string(),
            "Invalid sample_time: 0 (must be > 0)"
        );
        assert_eq!(
            ConfigError::InvalidSlip {
                field: "height",
                value: -0.5
            }
            .to_string(),
            "Invalid SLIP height: -0.5 (must be > 0)"
        );
        assert_eq!(
            ConfigError::InvalidPhaseDuration {
                index: 1,
                duration: 0.0
            }
            .to_string(),
            "Invalid duration 0 for phase 1 (must be > 0)"
        );
    }
}

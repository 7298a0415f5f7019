// stride-core: Types, collaborator traits, config and errors for the stride preview engine.

pub mod config;
pub mod error;
pub mod model;
pub mod traits;
pub mod types;

pub mod prelude {
    pub use crate::config::PreviewConfig;
    pub use crate::error::{ConfigError, PreviewError};
    pub use crate::model::{EndEffector, RigidBaseModel};
    pub use crate::traits::{
        FlatTerrain, FloatingBaseModel, FootPatternGenerator, STANDARD_GRAVITY, TerrainHeight,
    };
    pub use crate::types::{
        BodyVector, BodyWrench, EndEffectorKind, PhaseType, PreviewControl, PreviewParams,
        PreviewPhase, PreviewSchedule, PreviewState, PreviewTrajectory, SlipModel, StepParameters,
        SwingParams, SwingSample, WholeBodyState, WholeBodyTrajectory,
    };
}

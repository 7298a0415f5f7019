//! Shared setup and helpers for the stride preview demos.

pub mod error;
pub mod gait;
pub mod quadruped_setup;

pub use error::DemoError;
pub use gait::{GaitCommand, PreviewRun, PreviewSummary, nominal_control, run_preview};
pub use quadruped_setup::{
    QUADRUPED_FEET, quadruped_engine, quadruped_model, stand_config, standing_whole_body_state,
    trot_config,
};

//! Shared test fixtures and utilities for stride crates.
//!
//! Provides a lumped quadruped model, standing states, common schedules and
//! mock collaborators that can be used in any crate's test suite.

pub mod fixtures;
pub mod mocks;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use fixtures::{
    QUADRUPED_FEET, QUADRUPED_MASS, STANDING_HEIGHT, quadruped_model, stance_schedule,
    standing_state, standing_whole_body_state, trot_schedule, zero_control,
};
pub use mocks::{JointShiftModel, LinearSwing};

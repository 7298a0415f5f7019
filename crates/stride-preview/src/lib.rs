//! Preview of legged locomotion over a schedule of stance and flight phases.
//!
//! The centroidal motion of each phase has a closed form (SLIP in stance,
//! ballistic in flight). Swing feet are overlaid by a
//! [`FootPatternGenerator`](stride_core::traits::FootPatternGenerator), and
//! the whole preview is driven from a flat decision vector so that it can sit
//! inside an optimizer.

pub mod control;
pub mod convert;
pub mod engine;
pub mod slip;
pub mod swing;

pub use engine::PreviewLocomotion;
pub use slip::{MAX_PREVIEW_SAMPLES, PhaseDynamics};
pub use swing::BezierSwing;

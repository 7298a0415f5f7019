//! Nominal gait control and the preview pipeline shared by the demos.
//!
//! Pipeline:
//!   whole-body state -> reduced state
//!   command -> structured control -> decision vector -> structured control
//!   multi-phase preview -> whole-body trajectory
//!
//! The round trip through the decision vector is the path an optimizer takes.

use nalgebra::{Vector2, Vector3};
use serde::Serialize;
use stride_core::error::PreviewError;
use stride_core::traits::{FloatingBaseModel, FootPatternGenerator};
use stride_core::types::{
    PhaseType, PreviewControl, PreviewParams, PreviewSchedule, PreviewState, PreviewTrajectory,
    WholeBodyState, WholeBodyTrajectory,
};
use stride_preview::PreviewLocomotion;
use tracing::{debug, info};

use crate::DemoError;

/// Desired body motion used to build a nominal control.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GaitCommand {
    /// Forward speed in m/s.
    pub forward_velocity: f64,
    /// Heading acceleration applied in every stance phase.
    pub head_acc: f64,
    /// Pendulum length change per stance phase.
    pub length_shift: f64,
}

/// Control that walks the CoP forward at the commanded speed and places
/// every foot one schedule length ahead.
#[must_use]
pub fn nominal_control(
    schedule: &PreviewSchedule,
    feet: &[String],
    command: GaitCommand,
) -> PreviewControl {
    let params = schedule
        .iter()
        .map(|phase| match phase.phase_type {
            PhaseType::Stance => PreviewParams::stance(
                phase.duration,
                Vector2::new(command.forward_velocity * phase.duration, 0.0),
                command.length_shift,
                command.head_acc,
            ),
            PhaseType::Flight => PreviewParams::flight(phase.duration),
        })
        .collect();

    let step = Vector2::new(command.forward_velocity * schedule.nominal_duration(), 0.0);
    PreviewControl {
        params,
        feet_shift: feet.iter().map(|foot| (foot.clone(), step)).collect(),
    }
}

/// Everything produced by one preview run.
#[derive(Clone, Debug)]
pub struct PreviewRun {
    pub initial: PreviewState,
    pub trajectory: PreviewTrajectory,
    pub whole_body: WholeBodyTrajectory,
}

/// Reduce `full_state`, preview the engine's schedule under the nominal
/// control for `command`, and lift the result back to whole-body states.
pub fn run_preview<M, G>(
    engine: &mut PreviewLocomotion<M, G>,
    full_state: &WholeBodyState,
    command: GaitCommand,
) -> Result<PreviewRun, DemoError>
where
    M: FloatingBaseModel,
    G: FootPatternGenerator,
{
    let initial = engine.from_whole_body_state(full_state);
    let schedule = engine
        .schedule()
        .cloned()
        .ok_or(PreviewError::ScheduleNotSet)?;

    let control = nominal_control(&schedule, engine.feet(), command);
    let decision = engine.from_preview_control(&control)?;
    debug!(dimension = decision.len(), "nominal decision vector");
    let control = engine.to_preview_control(&decision)?;

    let trajectory = engine.multi_phase_preview(&initial, &control)?;
    let whole_body = engine.to_whole_body_trajectory(&trajectory);
    info!(
        phases = schedule.len(),
        samples = trajectory.len(),
        "preview finished"
    );

    Ok(PreviewRun {
        initial,
        trajectory,
        whole_body,
    })
}

/// Compact telemetry of a preview trajectory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewSummary {
    pub samples: usize,
    pub duration: f64,
    pub com_travel: Vector3<f64>,
    pub min_com_height: f64,
    pub max_com_height: f64,
    pub final_heading: f64,
}

impl PreviewSummary {
    /// Summary of `trajectory` relative to `initial`; `None` when empty.
    #[must_use]
    pub fn new(initial: &PreviewState, trajectory: &[PreviewState]) -> Option<Self> {
        let last = trajectory.last()?;
        let (min_com_height, max_com_height) = trajectory
            .iter()
            .map(|s| s.com_pos.z)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), z| {
                (lo.min(z), hi.max(z))
            });
        Some(Self {
            samples: trajectory.len(),
            duration: last.time - initial.time,
            com_travel: last.com_pos - initial.com_pos,
            min_com_height,
            max_com_height,
            final_heading: last.head_pos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use stride_core::types::PreviewPhase;

    fn feet() -> Vec<String> {
        vec!["a".into(), "b".into()]
    }

    #[test]
    fn nominal_control_follows_schedule() {
        let schedule = PreviewSchedule::new(vec![
            PreviewPhase::stance(["a"], 0.2),
            PreviewPhase::flight(0.1),
        ]);
        let command = GaitCommand {
            forward_velocity: 0.5,
            ..GaitCommand::default()
        };
        let control = nominal_control(&schedule, &feet(), command);
        assert_eq!(control.params.len(), 2);
        assert_relative_eq!(control.params[0].cop_shift, Vector2::new(0.1, 0.0));
        assert_eq!(control.params[1], PreviewParams::flight(0.1));
        assert_relative_eq!(control.feet_shift["b"], Vector2::new(0.15, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn summary_of_empty_trajectory() {
        assert!(PreviewSummary::new(&PreviewState::default(), &[]).is_none());
    }

    #[test]
    fn summary_tracks_extremes() {
        let initial = PreviewState::default();
        let trajectory: Vec<PreviewState> = [0.4, 0.5, 0.45]
            .into_iter()
            .enumerate()
            .map(|(k, z)| PreviewState {
                time: 0.1 * (k + 1) as f64,
                com_pos: Vector3::new(0.0, 0.0, z),
                ..PreviewState::default()
            })
            .collect();
        let summary = PreviewSummary::new(&initial, &trajectory).unwrap();
        assert_eq!(summary.samples, 3);
        assert_relative_eq!(summary.min_com_height, 0.4);
        assert_relative_eq!(summary.max_com_height, 0.5);
        assert_relative_eq!(summary.duration, 0.3, epsilon = 1e-12);
    }
}

//! Mapping between the optimizer's flat decision vector and [`PreviewControl`].
//!
//! Layout, in schedule order followed by foot order:
//!
//! ```text
//! stance phase:  [duration, cop_x, cop_y, length_shift, head_acc]
//! flight phase:  [duration]
//! per foot:      [shift_x, shift_y]
//! ```

use nalgebra::{DVector, Vector2};
use stride_core::error::PreviewError;
use stride_core::types::{PhaseType, PreviewControl, PreviewParams, PreviewSchedule};

/// Width of the foothold block per foot.
pub const FOOT_SHIFT_DIMENSION: usize = 2;

/// Length of a decision vector for `schedule` with `num_feet` feet.
#[must_use]
pub fn control_dimension(schedule: &PreviewSchedule, num_feet: usize) -> usize {
    schedule.params_dimension() + FOOT_SHIFT_DIMENSION * num_feet
}

/// Slice a decision vector into per-phase parameters and foothold shifts.
pub fn to_preview_control(
    schedule: &PreviewSchedule,
    feet: &[String],
    decision: &DVector<f64>,
) -> Result<PreviewControl, PreviewError> {
    let expected = control_dimension(schedule, feet.len());
    if decision.len() != expected {
        return Err(PreviewError::ControlDimension {
            expected,
            got: decision.len(),
        });
    }

    let mut control = PreviewControl {
        params: Vec::with_capacity(schedule.len()),
        ..PreviewControl::default()
    };
    let mut idx = 0;
    for phase in schedule {
        let params = match phase.phase_type {
            PhaseType::Stance => PreviewParams::stance(
                decision[idx],
                Vector2::new(decision[idx + 1], decision[idx + 2]),
                decision[idx + 3],
                decision[idx + 4],
            ),
            PhaseType::Flight => PreviewParams::flight(decision[idx]),
        };
        control.params.push(params);
        idx += phase.params_dimension();
    }

    for foot in feet {
        control
            .feet_shift
            .insert(foot.clone(), Vector2::new(decision[idx], decision[idx + 1]));
        idx += FOOT_SHIFT_DIMENSION;
    }

    Ok(control)
}

/// Flatten a control into a decision vector; exact inverse of
/// [`to_preview_control`].
pub fn from_preview_control(
    schedule: &PreviewSchedule,
    feet: &[String],
    control: &PreviewControl,
) -> Result<DVector<f64>, PreviewError> {
    if control.params.len() != schedule.len() {
        return Err(PreviewError::PhaseCount {
            expected: schedule.len(),
            got: control.params.len(),
        });
    }

    let mut decision = DVector::zeros(control_dimension(schedule, feet.len()));
    let mut idx = 0;
    for (phase, params) in schedule.iter().zip(&control.params) {
        decision[idx] = params.duration;
        idx += 1;

        match phase.phase_type {
            PhaseType::Stance => {
                decision[idx] = params.cop_shift.x;
                decision[idx + 1] = params.cop_shift.y;
                decision[idx + 2] = params.length_shift;
                decision[idx + 3] = params.head_acc;
                idx += 4;
            }
            PhaseType::Flight => {}
        }
    }

    for foot in feet {
        let shift = control
            .feet_shift
            .get(foot)
            .ok_or_else(|| PreviewError::MissingFootShift(foot.clone()))?;
        decision[idx] = shift.x;
        decision[idx + 1] = shift.y;
        idx += FOOT_SHIFT_DIMENSION;
    }

    Ok(decision)
}

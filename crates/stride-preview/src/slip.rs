//! Closed-form phase dynamics of the reduced model.
//!
//! Stance phases follow a spring-loaded inverted pendulum (SLIP):
//!
//! ```text
//! horizontal:  c̈_xy = ω² (c_xy − p_xy),          ω   = √(g / h)
//! vertical:    z̈    = −ω_v² (z − z_rest),         ω_v = √(k / m)
//! heading:     ψ̈    = constant
//! ```
//!
//! with the center of pressure `p` moving linearly by the commanded shift and
//! the rest length drifting linearly by the commanded length shift. Flight
//! phases are ballistic with constant heading rate.
//!
//! Every sample is an independent evaluation of the closed forms at its
//! elapsed time, so results do not depend on accumulated integration error.

use nalgebra::{Vector2, Vector3};
use stride_core::error::PreviewError;
use stride_core::types::{PreviewParams, PreviewState, PreviewTrajectory, SlipModel};

/// Relative slack so that `duration / sample_time` quotients landing just
/// above an integer do not spawn an extra sample.
const SAMPLE_COUNT_TOLERANCE: f64 = 1e-9;

/// Upper bound on the samples of one preview (a single phase or a whole
/// schedule).
pub const MAX_PREVIEW_SAMPLES: usize = 1_000_000;

/// Number of samples covering `duration`: ⌈duration / sample_time⌉, or zero
/// when the phase is shorter than one sample period.
///
/// Fails when the sample time is not positive, the duration is NaN, or the
/// count exceeds [`MAX_PREVIEW_SAMPLES`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sample_count(duration: f64, sample_time: f64) -> Result<usize, PreviewError> {
    let invalid = PreviewError::SampleCount {
        duration,
        sample_time,
    };
    if sample_time <= 0.0 || !sample_time.is_finite() || duration.is_nan() {
        return Err(invalid);
    }
    if duration < sample_time {
        return Ok(0);
    }
    let ratio = duration / sample_time;
    let count = (ratio - ratio * SAMPLE_COUNT_TOLERANCE).ceil();
    if !count.is_finite() || count > MAX_PREVIEW_SAMPLES as f64 {
        return Err(invalid);
    }
    Ok(count as usize)
}

/// Elapsed time of sample `k` out of `num_samples`; the last sample lands
/// exactly on `duration`.
#[must_use]
pub fn sample_elapsed(k: usize, num_samples: usize, duration: f64, sample_time: f64) -> f64 {
    if k + 1 >= num_samples {
        return duration;
    }
    (sample_time * (k + 1) as f64).min(duration)
}

fn check_positive(field: &'static str, value: f64) -> Result<(), PreviewError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(PreviewError::InvalidDynamics { field, value });
    }
    Ok(())
}

/// Physical constants and sampling of the phase simulators.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseDynamics {
    pub sample_time: f64,
    pub slip: SlipModel,
    /// Gravity magnitude (positive).
    pub gravity: f64,
    /// Total mass of the robot.
    pub mass: f64,
}

impl PhaseDynamics {
    /// Preview of a stance phase.
    ///
    /// Returns an empty trajectory when `params.duration` is shorter than the
    /// sample period.
    pub fn stance_preview(
        &self,
        state: &PreviewState,
        params: &PreviewParams,
    ) -> Result<PreviewTrajectory, PreviewError> {
        check_positive("gravity", self.gravity)?;
        check_positive("mass", self.mass)?;
        check_positive("SLIP height", self.slip.height)?;
        check_positive("SLIP stiffness", self.slip.stiffness)?;
        let num_samples = sample_count(params.duration, self.sample_time)?;
        if num_samples == 0 {
            return Ok(PreviewTrajectory::new());
        }
        let duration = params.duration;

        // Horizontal SLIP response coefficients
        let slip_omega = (self.gravity / self.slip.height).sqrt();
        let alpha = 2.0 * slip_omega * duration;
        let hor_proj: Vector2<f64> = (state.com_pos - state.cop).xy();
        let hor_disp: Vector2<f64> = state.com_vel.xy() * duration;
        let beta_1 = hor_proj / 2.0 + (hor_disp - params.cop_shift) / alpha;
        let beta_2 = hor_proj / 2.0 - (hor_disp - params.cop_shift) / alpha;
        let cop_rate = params.cop_shift / duration;

        // Spring-mass response coefficients
        let initial_length = (state.com_pos - state.cop).norm();
        let spring_omega = (self.slip.stiffness / self.mass).sqrt();
        let spring_omega2 = spring_omega * spring_omega;
        let sag = self.gravity / spring_omega2;
        let length_rate = params.length_shift / duration;
        let d_1 = state.com_pos.z - initial_length + sag;
        let d_2 = state.com_vel.z / spring_omega - length_rate / spring_omega;

        let cop_shift_3d = Vector3::new(params.cop_shift.x, params.cop_shift.y, 0.0);

        let mut trajectory = PreviewTrajectory::with_capacity(num_samples);
        for k in 0..num_samples {
            let t = sample_elapsed(k, num_samples, duration, self.sample_time);
            let grow = (slip_omega * t).exp();
            let decay = (-slip_omega * t).exp();
            let (sin_v, cos_v) = (spring_omega * t).sin_cos();

            let com_xy = beta_1 * grow + beta_2 * decay + cop_rate * t + state.cop.xy();
            let vel_xy = (beta_1 * grow - beta_2 * decay) * slip_omega + cop_rate;
            let acc_xy = (beta_1 * grow + beta_2 * decay) * (slip_omega * slip_omega);

            let com_z = d_1 * cos_v + d_2 * sin_v + length_rate * t + initial_length - sag;
            let vel_z = (-d_1 * sin_v + d_2 * cos_v) * spring_omega + length_rate;
            let acc_z = -(d_1 * cos_v + d_2 * sin_v) * spring_omega2;

            trajectory.push(PreviewState {
                time: state.time + t,
                com_pos: Vector3::new(com_xy.x, com_xy.y, com_z),
                com_vel: Vector3::new(vel_xy.x, vel_xy.y, vel_z),
                com_acc: Vector3::new(acc_xy.x, acc_xy.y, acc_z),
                head_pos: state.head_pos + state.head_vel * t + 0.5 * params.head_acc * t * t,
                head_vel: state.head_vel + params.head_acc * t,
                head_acc: params.head_acc,
                cop: state.cop + cop_shift_3d * (t / duration),
                ..PreviewState::default()
            });
        }
        Ok(trajectory)
    }

    /// Preview of a flight phase. Only `params.duration` is used; the heading
    /// rate stays constant.
    pub fn flight_preview(
        &self,
        state: &PreviewState,
        params: &PreviewParams,
    ) -> Result<PreviewTrajectory, PreviewError> {
        check_positive("gravity", self.gravity)?;
        let num_samples = sample_count(params.duration, self.sample_time)?;
        if num_samples == 0 {
            return Ok(PreviewTrajectory::new());
        }
        let gravity_vec = Vector3::new(0.0, 0.0, -self.gravity);

        let mut trajectory = PreviewTrajectory::with_capacity(num_samples);
        for k in 0..num_samples {
            let t = sample_elapsed(k, num_samples, params.duration, self.sample_time);
            trajectory.push(PreviewState {
                time: state.time + t,
                com_pos: state.com_pos + state.com_vel * t + gravity_vec * (0.5 * t * t),
                com_vel: state.com_vel + gravity_vec * t,
                com_acc: gravity_vec,
                head_pos: state.head_pos + state.head_vel * t,
                head_vel: state.head_vel,
                head_acc: 0.0,
                cop: state.cop,
                ..PreviewState::default()
            });
        }
        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dynamics() -> PhaseDynamics {
        PhaseDynamics {
            sample_time: 0.01,
            slip: SlipModel {
                height: 0.6,
                stiffness: 8000.0,
            },
            gravity: 9.81,
            mass: 80.0,
        }
    }

    fn standing() -> PreviewState {
        PreviewState {
            time: 2.0,
            com_pos: Vector3::new(0.05, -0.02, 0.6),
            com_vel: Vector3::new(0.3, 0.1, 0.0),
            cop: Vector3::new(0.0, 0.0, 0.0),
            head_pos: 0.2,
            head_vel: 0.1,
            ..PreviewState::default()
        }
    }

    #[test]
    fn sample_count_rounds_up() {
        assert_eq!(sample_count(0.5, 0.01).unwrap(), 50);
        assert_eq!(sample_count(0.055, 0.01).unwrap(), 6);
        assert_eq!(sample_count(1.1, 0.1).unwrap(), 11);
        assert_eq!(sample_count(0.01, 0.01).unwrap(), 1);
        assert_eq!(sample_count(0.009, 0.01).unwrap(), 0);
        assert_eq!(sample_count(0.0, 0.01).unwrap(), 0);
    }

    #[test]
    fn sample_count_rejects_unbounded_durations() {
        assert!(matches!(
            sample_count(1e300, 0.01),
            Err(PreviewError::SampleCount { .. })
        ));
        assert!(sample_count(f64::INFINITY, 0.01).is_err());
        assert!(sample_count(f64::NAN, 0.01).is_err());
        assert!(sample_count(0.5, 0.0).is_err());
        assert!(sample_count(0.5, f64::NAN).is_err());
        assert_eq!(sample_count(10_000.0, 0.01).unwrap(), MAX_PREVIEW_SAMPLES);
        assert!(sample_count(10_000.02, 0.01).is_err());
    }

    #[test]
    fn last_sample_lands_on_duration() {
        assert_relative_eq!(sample_elapsed(5, 6, 0.055, 0.01), 0.055);
        assert_relative_eq!(sample_elapsed(0, 6, 0.055, 0.01), 0.01);
    }

    #[test]
    fn last_sample_absorbs_tolerance_slack() {
        let duration = 0.5 + 1e-12;
        assert_eq!(sample_count(duration, 0.01).unwrap(), 50);
        assert_eq!(sample_elapsed(49, 50, duration, 0.01), duration);

        let state = PreviewState::default();
        let params = PreviewParams::stance(duration, Vector2::zeros(), 0.0, 0.0);
        let stance = dynamics().stance_preview(&state, &params).unwrap();
        assert_eq!(stance.len(), 50);
        assert_eq!(stance.last().unwrap().time, duration);
        let flight = dynamics()
            .flight_preview(&state, &PreviewParams::flight(duration))
            .unwrap();
        assert_eq!(flight.last().unwrap().time, duration);
    }

    #[test]
    fn oversized_phase_is_an_error() {
        let params = PreviewParams::stance(1e300, Vector2::zeros(), 0.0, 0.0);
        let result = dynamics().stance_preview(&standing(), &params);
        assert!(matches!(result, Err(PreviewError::SampleCount { .. })));
        let result = dynamics().flight_preview(&standing(), &PreviewParams::flight(1e300));
        assert!(matches!(result, Err(PreviewError::SampleCount { .. })));
    }

    #[test]
    fn degenerate_constants_are_rejected() {
        let params = PreviewParams::stance(0.2, Vector2::zeros(), 0.0, 0.0);
        let massless = PhaseDynamics {
            mass: 0.0,
            ..dynamics()
        };
        assert!(matches!(
            massless.stance_preview(&standing(), &params),
            Err(PreviewError::InvalidDynamics { field: "mass", .. })
        ));
        let flat = PhaseDynamics {
            slip: SlipModel {
                height: 0.0,
                stiffness: 8000.0,
            },
            ..dynamics()
        };
        assert!(matches!(
            flat.stance_preview(&standing(), &params),
            Err(PreviewError::InvalidDynamics {
                field: "SLIP height",
                ..
            })
        ));
        let weightless = PhaseDynamics {
            gravity: 0.0,
            ..dynamics()
        };
        assert!(weightless
            .flight_preview(&standing(), &PreviewParams::flight(0.2))
            .is_err());
        // Flight does not depend on the mass
        assert_eq!(
            massless
                .flight_preview(&standing(), &PreviewParams::flight(0.2))
                .unwrap()
                .len(),
            20
        );
    }

    #[test]
    fn stance_sample_times() {
        let params = PreviewParams::stance(0.055, Vector2::zeros(), 0.0, 0.0);
        let traj = dynamics().stance_preview(&standing(), &params).unwrap();
        assert_eq!(traj.len(), 6);
        assert_relative_eq!(traj[0].time, 2.01, epsilon = 1e-12);
        assert_relative_eq!(traj[5].time, 2.055, epsilon = 1e-12);
        for pair in traj.windows(2) {
            assert!(pair[1].time > pair[0].time);
        }
    }

    #[test]
    fn short_phases_are_empty() {
        let params = PreviewParams::stance(0.005, Vector2::zeros(), 0.0, 0.0);
        assert!(dynamics().stance_preview(&standing(), &params).unwrap().is_empty());
        let flight = dynamics()
            .flight_preview(&standing(), &PreviewParams::flight(0.005))
            .unwrap();
        assert!(flight.is_empty());
    }

    #[test]
    fn stance_matches_initial_conditions_near_zero() {
        let mut dyn_fine = dynamics();
        dyn_fine.sample_time = 1e-7;
        let state = standing();
        let params = PreviewParams::stance(1e-7, Vector2::new(0.05, 0.0), 0.02, 0.5);
        let traj = dyn_fine.stance_preview(&state, &params).unwrap();
        assert_eq!(traj.len(), 1);
        assert_relative_eq!(traj[0].com_pos, state.com_pos, epsilon = 1e-6);
        assert_relative_eq!(traj[0].com_vel, state.com_vel, epsilon = 1e-3);
    }

    #[test]
    fn stance_velocity_is_derivative_of_position() {
        let state = standing();
        let params = PreviewParams::stance(0.4, Vector2::new(0.08, -0.02), 0.03, 0.0);
        let dynamics = dynamics();
        let traj = dynamics.stance_preview(&state, &params).unwrap();
        let dt = dynamics.sample_time;
        for k in 1..traj.len() - 1 {
            let fd = (traj[k + 1].com_pos - traj[k - 1].com_pos) / (2.0 * dt);
            assert_relative_eq!(traj[k].com_vel, fd, epsilon = 5e-3);
            let fd_acc = (traj[k + 1].com_vel - traj[k - 1].com_vel) / (2.0 * dt);
            assert_relative_eq!(traj[k].com_acc, fd_acc, epsilon = 0.2);
        }
    }

    #[test]
    fn stance_horizontal_acceleration_is_pendulum() {
        let state = standing();
        let params = PreviewParams::stance(0.3, Vector2::new(0.05, 0.05), 0.0, 0.0);
        let dynamics = dynamics();
        let omega2 = dynamics.gravity / dynamics.slip.height;
        for sample in dynamics.stance_preview(&state, &params).unwrap() {
            let cop_xy = sample.cop.xy();
            let expected = (sample.com_pos.xy() - cop_xy) * omega2;
            assert_relative_eq!(sample.com_acc.xy(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn stance_balanced_over_cop_stays_put() {
        let state = PreviewState {
            com_pos: Vector3::new(0.3, 0.1, 0.6),
            cop: Vector3::new(0.3, 0.1, 0.0),
            ..PreviewState::default()
        };
        let params = PreviewParams::stance(0.5, Vector2::zeros(), 0.0, 0.0);
        for sample in dynamics().stance_preview(&state, &params).unwrap() {
            assert_relative_eq!(sample.com_pos.xy(), Vector2::new(0.3, 0.1), epsilon = 1e-12);
            assert_relative_eq!(sample.com_vel.xy(), Vector2::zeros(), epsilon = 1e-12);
        }
    }

    #[test]
    fn stance_vertical_boundary_matches_oscillator() {
        let state = PreviewState {
            com_pos: Vector3::new(0.02, 0.0, 0.58),
            com_vel: Vector3::new(0.0, 0.0, 0.05),
            ..PreviewState::default()
        };
        let params = PreviewParams::stance(0.35, Vector2::zeros(), 0.0, 0.0);
        let dynamics = dynamics();
        let traj = dynamics.stance_preview(&state, &params).unwrap();

        let length = state.com_pos.norm();
        let omega = (dynamics.slip.stiffness / dynamics.mass).sqrt();
        let rest = length - dynamics.gravity / (omega * omega);
        let t = 0.35;
        let expected = (state.com_pos.z - rest) * (omega * t).cos()
            + state.com_vel.z / omega * (omega * t).sin()
            + rest;
        let last = traj.last().unwrap();
        assert_relative_eq!(last.time, 0.35, epsilon = 1e-12);
        assert_relative_eq!(last.com_pos.z, expected, epsilon = 1e-12);
    }

    #[test]
    fn stance_cop_and_heading_follow_commands() {
        let state = standing();
        let params = PreviewParams::stance(0.2, Vector2::new(0.1, -0.04), 0.0, 2.0);
        let traj = dynamics().stance_preview(&state, &params).unwrap();
        let last = traj.last().unwrap();
        assert_relative_eq!(last.cop, Vector3::new(0.1, -0.04, 0.0), epsilon = 1e-12);
        assert_relative_eq!(last.head_pos, 0.2 + 0.1 * 0.2 + 0.5 * 2.0 * 0.04, epsilon = 1e-12);
        assert_relative_eq!(last.head_vel, 0.1 + 2.0 * 0.2, epsilon = 1e-12);
        assert_relative_eq!(last.head_acc, 2.0);
    }

    #[test]
    fn stance_length_shift_raises_terminal_height() {
        let state = standing();
        let base = PreviewParams::stance(0.3, Vector2::zeros(), 0.0, 0.0);
        let raised = PreviewParams::stance(0.3, Vector2::zeros(), 0.05, 0.0);
        let dynamics = dynamics();
        let z0 = dynamics.stance_preview(&state, &base).unwrap().last().unwrap().com_pos.z;
        let z1 = dynamics.stance_preview(&state, &raised).unwrap().last().unwrap().com_pos.z;
        assert!(z1 > z0);
    }

    #[test]
    fn flight_is_ballistic() {
        let state = standing();
        let params = PreviewParams {
            duration: 0.2,
            head_acc: 5.0,
            ..PreviewParams::default()
        };
        let traj = dynamics().flight_preview(&state, &params).unwrap();
        assert_eq!(traj.len(), 20);
        for sample in &traj {
            assert_eq!(sample.com_acc, Vector3::new(0.0, 0.0, -9.81));
            assert_eq!(sample.head_acc, 0.0);
            assert_relative_eq!(sample.head_vel, state.head_vel);
        }
        let last = traj.last().unwrap();
        let t = 0.2;
        let expected = state.com_pos + state.com_vel * t + Vector3::new(0.0, 0.0, -0.5 * 9.81 * t * t);
        assert_relative_eq!(last.com_pos, expected, epsilon = 1e-12);
        assert_relative_eq!(last.head_pos, 0.2 + 0.1 * t, epsilon = 1e-12);
    }
}

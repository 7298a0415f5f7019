//! Swing foot trajectory generator.
//!
//! A swinging foot travels from its liftoff position to a target landing
//! position with a smooth height profile. Uses 12-point (degree-11) Bezier
//! curves for both the horizontal interpolation and the height profile. The
//! control points are arranged so that velocity and acceleration vanish at
//! liftoff (s=0) and touchdown (s=1).

use nalgebra::Vector3;
use stride_core::traits::FootPatternGenerator;
use stride_core::types::{StepParameters, SwingSample};

// 12-point Bezier for horizontal interpolation (S-curve from 0 to 1).
// First 3 and last 3 control points are equal → zero velocity and acceleration
// at both endpoints.
const BEZIER_S: [f64; 12] = [
    0.0, 0.0, 0.0, // zero vel/accel at start
    0.5, 0.5, // transition
    0.5, 0.5, // midpoint plateau
    0.5, 0.5, // transition
    1.0, 1.0, 1.0, // zero vel/accel at end
];

// 12-point Bezier for height profile (peaks at s=0.5).
// Multiplied by step_height / BEZIER_H_PEAK at evaluation time so the actual
// peak equals step_height.
const BEZIER_H: [f64; 12] = [
    0.0, 0.0, 0.0, // zero at liftoff
    0.9, 0.9, // rise
    1.0, 1.0, // peak
    0.9, 0.9, // descent
    0.0, 0.0, 0.0, // zero at touchdown
];

// bezier_eval(&BEZIER_H, 0.5)
const BEZIER_H_PEAK: f64 = 0.886_230_468_750;

/// De Casteljau evaluation of a Bezier curve with `N` control points.
fn de_casteljau<const N: usize>(mut work: [f64; N], s: f64) -> f64 {
    for k in 1..N {
        for i in 0..(N - k) {
            work[i] = work[i] * (1.0 - s) + work[i + 1] * s;
        }
    }
    work[0]
}

fn bezier_eval(points: &[f64; 12], s: f64) -> f64 {
    de_casteljau(*points, s)
}

/// First derivative via the hodograph: B'(s) = 11 · Bezier(ΔP)(s).
fn bezier_derivative(points: &[f64; 12], s: f64) -> f64 {
    let mut diffs = [0.0; 11];
    for i in 0..11 {
        diffs[i] = points[i + 1] - points[i];
    }
    11.0 * de_casteljau(diffs, s)
}

/// Second derivative: B''(s) = 110 · Bezier(Δ²P)(s).
fn bezier_second_derivative(points: &[f64; 12], s: f64) -> f64 {
    let mut diffs = [0.0; 10];
    for i in 0..10 {
        diffs[i] = points[i + 2] - 2.0 * points[i + 1] + points[i];
    }
    110.0 * de_casteljau(diffs, s)
}

/// Bezier swing generator for a single step.
///
/// Positions are interpolated between the configured start and target; the
/// height profile adds `step_height` at mid-swing on top of the straight
/// line. Sampling outside the step clamps to the liftoff/touchdown values.
#[derive(Clone, Debug)]
pub struct BezierSwing {
    initial_time: f64,
    initial_pos: Vector3<f64>,
    target_pos: Vector3<f64>,
    params: StepParameters,
}

impl Default for BezierSwing {
    fn default() -> Self {
        Self {
            initial_time: 0.0,
            initial_pos: Vector3::zeros(),
            target_pos: Vector3::zeros(),
            params: StepParameters::new(0.0, 0.0),
        }
    }
}

impl BezierSwing {
    /// Generator already configured for one step.
    #[must_use]
    pub fn new(
        initial_time: f64,
        initial_pos: Vector3<f64>,
        target_pos: Vector3<f64>,
        params: StepParameters,
    ) -> Self {
        Self {
            initial_time,
            initial_pos,
            target_pos,
            params,
        }
    }

    /// Normalized swing phase in [0, 1] at absolute `time`.
    fn phase(&self, time: f64) -> f64 {
        if self.params.duration <= 0.0 {
            return 1.0;
        }
        ((time - self.initial_time) / self.params.duration).clamp(0.0, 1.0)
    }
}

impl FootPatternGenerator for BezierSwing {
    fn set_parameters(
        &mut self,
        initial_time: f64,
        initial_pos: &Vector3<f64>,
        target_pos: &Vector3<f64>,
        params: StepParameters,
    ) {
        self.initial_time = initial_time;
        self.initial_pos = *initial_pos;
        self.target_pos = *target_pos;
        self.params = params;
    }

    fn generate(&self, time: f64) -> SwingSample {
        let s = self.phase(time);
        let diff = self.target_pos - self.initial_pos;
        let height_scale = self.params.step_height / BEZIER_H_PEAK;

        let mut position = self.initial_pos + diff * bezier_eval(&BEZIER_S, s);
        position.z += bezier_eval(&BEZIER_H, s) * height_scale;

        if self.params.duration < 1e-10 {
            return SwingSample {
                position,
                ..SwingSample::default()
            };
        }

        // Chain rule: d/dt = (1/T) d/ds
        let inv_dur = 1.0 / self.params.duration;
        let inv_dur2 = inv_dur * inv_dur;

        let mut velocity = diff * (bezier_derivative(&BEZIER_S, s) * inv_dur);
        velocity.z += bezier_derivative(&BEZIER_H, s) * height_scale * inv_dur;

        let mut acceleration = diff * (bezier_second_derivative(&BEZIER_S, s) * inv_dur2);
        acceleration.z += bezier_second_derivative(&BEZIER_H, s) * height_scale * inv_dur2;

        SwingSample {
            position,
            velocity,
            acceleration,
        }
    }
}

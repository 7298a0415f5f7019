//! Mock collaborators for testing.
//!
//! Lightweight stand-ins for the robot model and the swing generator that
//! can be used in any crate's test suite.

use nalgebra::{DVector, Rotation3, Vector3, Vector6};
use stride_core::traits::{FloatingBaseModel, FootPatternGenerator};
use stride_core::types::{AX, AY, AZ, EndEffectorKind, LX, StepParameters, SwingSample};

// ---------------------------------------------------------------------------
// JointShiftModel
// ---------------------------------------------------------------------------

/// A model whose base-frame CoM equals its first three joint positions.
///
/// Missing joints count as zero, so an empty joint vector puts the CoM at
/// the base origin.
pub struct JointShiftModel {
    mass: f64,
    feet: Vec<String>,
}

impl JointShiftModel {
    pub fn new<I, S>(mass: f64, feet: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mass,
            feet: feet.into_iter().map(Into::into).collect(),
        }
    }

    fn leading_joints(joints: &DVector<f64>) -> Vector3<f64> {
        Vector3::from_fn(|i, _| joints.get(i).copied().unwrap_or(0.0))
    }

    fn rotation(base_pos: &Vector6<f64>) -> Rotation3<f64> {
        Rotation3::from_euler_angles(base_pos[AX], base_pos[AY], base_pos[AZ])
    }
}

impl FloatingBaseModel for JointShiftModel {
    fn total_mass(&self) -> f64 {
        self.mass
    }

    fn system_com(&self, base_pos: &Vector6<f64>, joint_pos: &DVector<f64>) -> Vector3<f64> {
        let translation: Vector3<f64> = base_pos.fixed_rows::<3>(LX).into();
        translation + Self::rotation(base_pos) * Self::leading_joints(joint_pos)
    }

    fn system_com_rate(
        &self,
        base_pos: &Vector6<f64>,
        joint_pos: &DVector<f64>,
        base_vel: &Vector6<f64>,
        joint_vel: &DVector<f64>,
    ) -> Vector3<f64> {
        let rotation = Self::rotation(base_pos);
        let linear: Vector3<f64> = base_vel.fixed_rows::<3>(LX).into();
        let angular: Vector3<f64> = base_vel.fixed_rows::<3>(AX).into();
        let lever = rotation * Self::leading_joints(joint_pos);
        linear + angular.cross(&lever) + rotation * Self::leading_joints(joint_vel)
    }

    fn end_effector_names(&self, kind: Option<EndEffectorKind>) -> Vec<String> {
        match kind {
            None | Some(EndEffectorKind::Foot) => self.feet.clone(),
            Some(EndEffectorKind::Hand) => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// LinearSwing
// ---------------------------------------------------------------------------

/// A swing generator moving the foot along a straight line at constant speed.
///
/// Ignores the step height. Sampling outside the step clamps to the end
/// points with zero velocity.
#[derive(Clone, Debug, Default)]
pub struct LinearSwing {
    initial_time: f64,
    initial_pos: Vector3<f64>,
    target_pos: Vector3<f64>,
    duration: f64,
}

impl FootPatternGenerator for LinearSwing {
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
        self.duration = params.duration;
    }

    fn generate(&self, time: f64) -> SwingSample {
        if self.duration <= 0.0 {
            return SwingSample {
                position: self.target_pos,
                ..SwingSample::default()
            };
        }
        let s = (time - self.initial_time) / self.duration;
        let diff = self.target_pos - self.initial_pos;
        let velocity = if (0.0..=1.0).contains(&s) {
            diff / self.duration
        } else {
            Vector3::zeros()
        };
        SwingSample {
            position: self.initial_pos + diff * s.clamp(0.0, 1.0),
            velocity,
            acceleration: Vector3::zeros(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

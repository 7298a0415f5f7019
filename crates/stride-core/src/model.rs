//! Lumped rigid-base implementation of [`FloatingBaseModel`].
//!
//! The whole mass sits at a fixed point of the base frame, so joint motion
//! does not move the center of mass. Useful when no articulated dynamics
//! model is available, and for demos.

use nalgebra::{DVector, Rotation3, Vector3, Vector6};
use serde::{Deserialize, Serialize};

use crate::traits::{FloatingBaseModel, STANDARD_GRAVITY};
use crate::types::{AX, AY, AZ, EndEffectorKind, LX};

/// A named end-effector of a [`RigidBaseModel`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndEffector {
    pub name: String,
    pub kind: EndEffectorKind,
}

/// Floating base with all its mass lumped at `com_offset` (base frame).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidBaseModel {
    pub mass: f64,
    pub gravity: f64,
    pub com_offset: Vector3<f64>,
    pub end_effectors: Vec<EndEffector>,
}

impl RigidBaseModel {
    /// Model with standard gravity, CoM at the base origin and no end-effectors.
    #[must_use]
    pub fn new(mass: f64) -> Self {
        Self {
            mass,
            gravity: STANDARD_GRAVITY,
            com_offset: Vector3::zeros(),
            end_effectors: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_com_offset(mut self, com_offset: Vector3<f64>) -> Self {
        self.com_offset = com_offset;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Append an end-effector; names keep insertion order.
    #[must_use]
    pub fn with_end_effector(mut self, name: impl Into<String>, kind: EndEffectorKind) -> Self {
        self.end_effectors.push(EndEffector {
            name: name.into(),
            kind,
        });
        self
    }

    /// Append several feet.
    #[must_use]
    pub fn with_feet<I, S>(mut self, feet: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in feet {
            self = self.with_end_effector(name, EndEffectorKind::Foot);
        }
        self
    }

    fn base_rotation(base_pos: &Vector6<f64>) -> Rotation3<f64> {
        Rotation3::from_euler_angles(base_pos[AX], base_pos[AY], base_pos[AZ])
    }
}

impl FloatingBaseModel for RigidBaseModel {
    fn total_mass(&self) -> f64 {
        self.mass
    }

    fn gravity_acceleration(&self) -> f64 {
        self.gravity
    }

    fn floating_base_com(&self) -> Vector3<f64> {
        self.com_offset
    }

    fn system_com(&self, base_pos: &Vector6<f64>, _joint_pos: &DVector<f64>) -> Vector3<f64> {
        let translation: Vector3<f64> = base_pos.fixed_rows::<3>(LX).into();
        translation + Self::base_rotation(base_pos) * self.com_offset
    }

    fn system_com_rate(
        &self,
        base_pos: &Vector6<f64>,
        _joint_pos: &DVector<f64>,
        base_vel: &Vector6<f64>,
        _joint_vel: &DVector<f64>,
    ) -> Vector3<f64> {
        let linear: Vector3<f64> = base_vel.fixed_rows::<3>(LX).into();
        let angular: Vector3<f64> = base_vel.fixed_rows::<3>(AX).into();
        let lever = Self::base_rotation(base_pos) * self.com_offset;
        linear + angular.cross(&lever)
    }

    fn end_effector_names(&self, kind: Option<EndEffectorKind>) -> Vec<String> {
        self.end_effectors
            .iter()
            .filter(|ee| kind.is_none_or(|k| ee.kind == k))
            .map(|ee| ee.name.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn model() -> RigidBaseModel {
        RigidBaseModel::new(20.0)
            .with_com_offset(Vector3::new(0.1, 0.0, 0.0))
            .with_feet(["lf", "rf"])
            .with_end_effector("arm", EndEffectorKind::Hand)
    }

    #[test]
    fn com_follows_base_pose() {
        let base = Vector6::new(0.0, 0.0, FRAC_PI_2, 1.0, 2.0, 0.5);
        let com = model().system_com(&base, &DVector::zeros(0));
        assert_relative_eq!(com, Vector3::new(1.0, 2.1, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn com_rate_includes_rotation() {
        let base = Vector6::zeros();
        let vel = Vector6::new(0.0, 0.0, 1.0, 0.2, 0.0, 0.0);
        let rate = model().system_com_rate(&base, &DVector::zeros(0), &vel, &DVector::zeros(0));
        assert_relative_eq!(rate, Vector3::new(0.2, 0.1, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn end_effector_filter_keeps_order() {
        let m = model();
        assert_eq!(m.end_effector_names(Some(EndEffectorKind::Foot)), vec!["lf", "rf"]);
        assert_eq!(m.end_effector_names(None), vec!["lf", "rf", "arm"]);
        assert_eq!(m.number_of_end_effectors(Some(EndEffectorKind::Hand)), 1);
        assert_relative_eq!(m.floating_base_com(), Vector3::new(0.1, 0.0, 0.0));
    }
}

use nalgebra::{DVector, Vector2, Vector3, Vector6};

use crate::types::{BodyVector, BodyWrench, EndEffectorKind, StepParameters, SwingSample};

/// Standard gravity magnitude in m/s^2.
pub const STANDARD_GRAVITY: f64 = 9.81;

// ---------------------------------------------------------------------------
// FloatingBaseModel
// ---------------------------------------------------------------------------

/// Kinematic and inertial queries on a floating-base robot.
///
/// Base vectors are ordered `[AX, AY, AZ, LX, LY, LZ]`; contact positions and
/// wrenches are expressed in the base frame.
pub trait FloatingBaseModel {
    /// Total mass of the robot in kg.
    fn total_mass(&self) -> f64;

    /// Gravity magnitude (positive).
    fn gravity_acceleration(&self) -> f64 {
        STANDARD_GRAVITY
    }

    /// Center of mass of the floating-base body, in the base frame.
    fn floating_base_com(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    /// System center of mass for the given base pose and joint positions.
    fn system_com(&self, base_pos: &Vector6<f64>, joint_pos: &DVector<f64>) -> Vector3<f64>;

    /// System center-of-mass velocity.
    fn system_com_rate(
        &self,
        base_pos: &Vector6<f64>,
        joint_pos: &DVector<f64>,
        base_vel: &Vector6<f64>,
        joint_vel: &DVector<f64>,
    ) -> Vector3<f64>;

    /// End-effector names, optionally restricted to one kind.
    fn end_effector_names(&self, kind: Option<EndEffectorKind>) -> Vec<String>;

    /// Number of end-effectors of a kind (all when `None`).
    fn number_of_end_effectors(&self, kind: Option<EndEffectorKind>) -> usize {
        self.end_effector_names(kind).len()
    }

    /// Center of pressure of the contacts in `names`.
    ///
    /// Contact positions are weighted by their normal (z) force. Returns zero
    /// when no contact pushes on the ground.
    fn center_of_pressure(
        &self,
        contact_eff: &BodyWrench,
        contact_pos: &BodyVector,
        names: &[String],
    ) -> Vector3<f64> {
        let mut weighted = Vector3::zeros();
        let mut total_normal = 0.0;
        for name in names {
            let (Some(wrench), Some(pos)) = (contact_eff.get(name), contact_pos.get(name)) else {
                continue;
            };
            let normal = wrench[5];
            weighted += pos * normal;
            total_normal += normal;
        }
        if total_normal > 0.0 {
            weighted / total_normal
        } else {
            Vector3::zeros()
        }
    }

    /// Names of the contacts whose linear force magnitude (norm of the force
    /// part of the wrench, torque ignored) exceeds `force_threshold`, in
    /// end-effector order.
    fn active_contacts(&self, contact_eff: &BodyWrench, force_threshold: f64) -> Vec<String> {
        self.end_effector_names(None)
            .into_iter()
            .filter(|name| {
                contact_eff
                    .get(name)
                    .is_some_and(|w| w.fixed_rows::<3>(3).norm() > force_threshold)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FootPatternGenerator
// ---------------------------------------------------------------------------

/// Single-step swing foot trajectory generator.
pub trait FootPatternGenerator {
    /// Configure a step from `initial_pos` at `initial_time` to `target_pos`.
    fn set_parameters(
        &mut self,
        initial_time: f64,
        initial_pos: &Vector3<f64>,
        target_pos: &Vector3<f64>,
        params: StepParameters,
    );

    /// Sample the configured step at absolute `time`.
    fn generate(&self, time: f64) -> SwingSample;
}

// ---------------------------------------------------------------------------
// TerrainHeight
// ---------------------------------------------------------------------------

/// Supplies the vertical component of a foothold shift.
pub trait TerrainHeight {
    /// Vertical shift for `foot` landing at the horizontal `foothold`.
    fn vertical_shift(&self, foot: &str, foothold: &Vector2<f64>) -> f64;
}

/// Flat ground: every foothold lands at the current height.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatTerrain;

impl TerrainHeight for FlatTerrain {
    fn vertical_shift(&self, _foot: &str, _foothold: &Vector2<f64>) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct TwoFeet;

    impl FloatingBaseModel for TwoFeet {
        fn total_mass(&self) -> f64 {
            10.0
        }

        fn system_com(&self, base_pos: &Vector6<f64>, _joint_pos: &DVector<f64>) -> Vector3<f64> {
            base_pos.fixed_rows::<3>(3).into()
        }

        fn system_com_rate(
            &self,
            _base_pos: &Vector6<f64>,
            _joint_pos: &DVector<f64>,
            base_vel: &Vector6<f64>,
            _joint_vel: &DVector<f64>,
        ) -> Vector3<f64> {
            base_vel.fixed_rows::<3>(3).into()
        }

        fn end_effector_names(&self, _kind: Option<EndEffectorKind>) -> Vec<String> {
            vec!["left".into(), "right".into()]
        }
    }

    fn wrench(fz: f64) -> Vector6<f64> {
        Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, fz)
    }

    #[test]
    fn cop_is_force_weighted() {
        let mut eff = BodyWrench::new();
        eff.insert("left".into(), wrench(30.0));
        eff.insert("right".into(), wrench(10.0));
        let mut pos = BodyVector::new();
        pos.insert("left".into(), Vector3::new(0.0, 0.2, -0.5));
        pos.insert("right".into(), Vector3::new(0.0, -0.2, -0.5));

        let names = TwoFeet.end_effector_names(None);
        let cop = TwoFeet.center_of_pressure(&eff, &pos, &names);
        assert_relative_eq!(cop, Vector3::new(0.0, 0.1, -0.5), epsilon = 1e-12);
    }

    #[test]
    fn cop_without_load_is_zero() {
        let names = TwoFeet.end_effector_names(None);
        let cop = TwoFeet.center_of_pressure(&BodyWrench::new(), &BodyVector::new(), &names);
        assert_eq!(cop, Vector3::zeros());
    }

    #[test]
    fn active_contacts_apply_threshold() {
        let mut eff = BodyWrench::new();
        eff.insert("left".into(), wrench(30.0));
        eff.insert("right".into(), wrench(2.0));
        assert_eq!(TwoFeet.active_contacts(&eff, 5.0), vec!["left".to_string()]);
        assert_eq!(TwoFeet.active_contacts(&eff, 0.0).len(), 2);
        assert_eq!(TwoFeet.number_of_end_effectors(None), 2);
    }

    #[test]
    fn active_contacts_use_full_linear_force() {
        // Mostly tangential load: small normal force, large friction force
        let mut eff = BodyWrench::new();
        eff.insert("left".into(), Vector6::new(0.0, 0.0, 0.0, 6.0, 0.0, 8.0));
        eff.insert("right".into(), Vector6::new(50.0, 0.0, 0.0, 0.0, 0.0, 8.0));
        assert_eq!(TwoFeet.active_contacts(&eff, 9.0), vec!["left".to_string()]);
    }

    #[test]
    fn flat_terrain_has_no_vertical_shift() {
        assert_eq!(FlatTerrain.vertical_shift("left", &Vector2::new(1.0, 2.0)), 0.0);
        assert_relative_eq!(TwoFeet.gravity_acceleration(), STANDARD_GRAVITY);
    }
}

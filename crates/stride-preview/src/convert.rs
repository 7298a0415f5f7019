//! Conversion between whole-body states and reduced preview states.
//!
//! Reducing a whole-body state caches the system CoM offset (the CoM in the
//! base frame for the current joint configuration) on the engine. Lifting a
//! preview state back uses that cached offset, so lift with the engine that
//! performed the last reduction.

use nalgebra::{Rotation3, Vector3, Vector6};
use stride_core::traits::{FloatingBaseModel, FootPatternGenerator};
use stride_core::types::{AZ, BodyVector, LX, PreviewState, WholeBodyState, WholeBodyTrajectory};

use crate::engine::PreviewLocomotion;

impl<M: FloatingBaseModel, G: FootPatternGenerator> PreviewLocomotion<M, G> {
    /// Reduce a whole-body state to a preview state.
    ///
    /// Updates the cached CoM offset from the joint configuration.
    pub fn from_whole_body_state(&mut self, full_state: &WholeBodyState) -> PreviewState {
        self.actual_system_com = self
            .model
            .system_com(&Vector6::zeros(), &full_state.joint_pos);

        let com_pos = self
            .model
            .system_com(&full_state.base_pos, &full_state.joint_pos);
        let com_vel = self.model.system_com_rate(
            &full_state.base_pos,
            &full_state.joint_pos,
            &full_state.base_vel,
            &full_state.joint_vel,
        );
        let com_acc: Vector3<f64> = full_state.base_acc.fixed_rows::<3>(LX).into();

        // CoP comes out in the base frame
        let names = self.model.end_effector_names(None);
        let cop_base =
            self.model
                .center_of_pressure(&full_state.contact_eff, &full_state.contact_pos, &names);
        let rpy = full_state.base_rpy();
        let rotation = Rotation3::from_euler_angles(rpy.x, rpy.y, rpy.z);
        let cop = full_state.base_translation() + rotation * cop_base;

        let support_region = self
            .model
            .active_contacts(&full_state.contact_eff, self.force_threshold)
            .iter()
            .filter_map(|name| full_state.contact_pos.get(name))
            .map(|pos| pos - self.actual_system_com)
            .collect();

        let foot_pos: BodyVector = full_state
            .contact_pos
            .iter()
            .map(|(name, pos)| (name.clone(), pos - self.actual_system_com))
            .collect();

        PreviewState {
            time: full_state.time,
            com_pos,
            com_vel,
            com_acc,
            head_pos: full_state.base_pos[AZ],
            head_vel: full_state.base_vel[AZ],
            head_acc: full_state.base_acc[AZ],
            cop,
            support_region,
            foot_pos,
            foot_vel: full_state.contact_vel.clone(),
            foot_acc: full_state.contact_acc.clone(),
        }
    }

    /// Lift a preview state to a whole-body state.
    ///
    /// Only the base translation, yaw channel and contact kinematics are
    /// filled; roll, pitch, joints and contact wrenches stay zero.
    #[must_use]
    pub fn to_whole_body_state(&self, preview_state: &PreviewState) -> WholeBodyState {
        let mut full_state = WholeBodyState {
            time: preview_state.time,
            ..WholeBodyState::default()
        };

        let base_pos = preview_state.com_pos - self.actual_system_com;
        full_state.base_pos.fixed_rows_mut::<3>(LX).copy_from(&base_pos);
        full_state.base_pos[AZ] = preview_state.head_pos;
        full_state
            .base_vel
            .fixed_rows_mut::<3>(LX)
            .copy_from(&preview_state.com_vel);
        full_state.base_vel[AZ] = preview_state.head_vel;
        full_state
            .base_acc
            .fixed_rows_mut::<3>(LX)
            .copy_from(&preview_state.com_acc);
        full_state.base_acc[AZ] = preview_state.head_acc;

        full_state.contact_pos = preview_state
            .foot_pos
            .iter()
            .map(|(name, pos)| (name.clone(), pos + self.actual_system_com))
            .collect();
        full_state.contact_vel = preview_state.foot_vel.clone();
        full_state.contact_acc = preview_state.foot_acc.clone();

        full_state
    }

    /// Lift every state of a preview trajectory.
    #[must_use]
    pub fn to_whole_body_trajectory(&self, trajectory: &[PreviewState]) -> WholeBodyTrajectory {
        trajectory
            .iter()
            .map(|state| self.to_whole_body_state(state))
            .collect()
    }
}

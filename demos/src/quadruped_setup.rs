//! Shared quadruped setup: lumped model, standing pose, gait configs.
//!
//! Every demo binary and the integration tests start from the same robot,
//! so the numbers live here once.

use std::sync::Arc;

use nalgebra::{Vector3, Vector6};
use stride_core::config::PreviewConfig;
use stride_core::error::PreviewError;
use stride_core::model::RigidBaseModel;
use stride_core::traits::FloatingBaseModel;
use stride_core::types::{BodyWrench, PreviewPhase, SlipModel, WholeBodyState};
use stride_preview::PreviewLocomotion;

/// Foot names in model order (fixes the foothold block of the decision vector).
pub const QUADRUPED_FEET: [&str; 4] = ["lf_foot", "rf_foot", "lh_foot", "rh_foot"];

const BODY_MASS: f64 = 30.0;
const BASE_HEIGHT: f64 = 0.45;
const HIP_X: f64 = 0.25;
const HIP_Y: f64 = 0.15;
const JOINTS_PER_LEG: usize = 3;

/// Lumped 30 kg quadruped with its CoM 5 cm above the base origin.
#[must_use]
pub fn quadruped_model() -> RigidBaseModel {
    RigidBaseModel::new(BODY_MASS)
        .with_com_offset(Vector3::new(0.0, 0.0, 0.05))
        .with_feet(QUADRUPED_FEET)
}

/// Standing pose at the origin with the weight shared by all four feet.
#[must_use]
pub fn standing_whole_body_state(model: &RigidBaseModel) -> WholeBodyState {
    let mut state = WholeBodyState::with_joints(JOINTS_PER_LEG * QUADRUPED_FEET.len());
    state.base_pos = Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, BASE_HEIGHT);

    let foot_load =
        model.total_mass() * model.gravity_acceleration() / QUADRUPED_FEET.len() as f64;
    let corners = [
        (HIP_X, HIP_Y),
        (HIP_X, -HIP_Y),
        (-HIP_X, HIP_Y),
        (-HIP_X, -HIP_Y),
    ];
    let mut contact_eff = BodyWrench::new();
    for (name, (x, y)) in QUADRUPED_FEET.iter().zip(corners) {
        let name = (*name).to_string();
        state
            .contact_pos
            .insert(name.clone(), Vector3::new(x, y, -BASE_HEIGHT));
        state.contact_vel.insert(name.clone(), Vector3::zeros());
        state.contact_acc.insert(name.clone(), Vector3::zeros());
        contact_eff.insert(name, Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, foot_load));
    }
    state.contact_eff = contact_eff;
    state
}

fn demo_slip() -> SlipModel {
    SlipModel {
        height: BASE_HEIGHT,
        stiffness: 6000.0,
    }
}

/// Four-foot stance for `duration` seconds.
#[must_use]
pub fn stand_config(duration: f64) -> PreviewConfig {
    PreviewConfig {
        sample_time: 0.005,
        step_height: 0.0,
        force_threshold: 5.0,
        slip: demo_slip(),
        schedule: vec![PreviewPhase::stance(QUADRUPED_FEET, duration)],
    }
}

/// `cycles` flying-trot cycles.
#[must_use]
pub fn trot_config(stance_duration: f64, flight_duration: f64, cycles: usize) -> PreviewConfig {
    let cycle = [
        PreviewPhase::stance(["lf_foot", "rh_foot"], stance_duration),
        PreviewPhase::flight(flight_duration),
        PreviewPhase::stance(["rf_foot", "lh_foot"], stance_duration),
        PreviewPhase::flight(flight_duration),
    ];
    PreviewConfig {
        sample_time: 0.005,
        step_height: 0.08,
        force_threshold: 5.0,
        slip: demo_slip(),
        schedule: cycle.iter().cycle().take(cycle.len() * cycles).cloned().collect(),
    }
}

/// Preview engine for the demo quadruped.
pub fn quadruped_engine(
    config: &PreviewConfig,
) -> Result<PreviewLocomotion<RigidBaseModel>, PreviewError> {
    PreviewLocomotion::from_config(Arc::new(quadruped_model()), config)
}

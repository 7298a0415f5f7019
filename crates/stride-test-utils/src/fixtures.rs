//! Quadruped fixtures.
//!
//! A lumped 80 kg quadruped standing 0.55 m above flat ground with its feet
//! at the corners of a 0.6 x 0.4 m rectangle below the base.

use nalgebra::{Vector2, Vector3, Vector6};
use stride_core::model::RigidBaseModel;
use stride_core::traits::FloatingBaseModel;
use stride_core::types::{
    BodyVector, BodyWrench, PreviewControl, PreviewParams, PreviewPhase, PreviewSchedule,
    PreviewState, WholeBodyState,
};

/// Foot names in model order.
pub const QUADRUPED_FEET: [&str; 4] = ["lf_foot", "rf_foot", "lh_foot", "rh_foot"];

pub const QUADRUPED_MASS: f64 = 80.0;

/// Base height above the ground when standing.
pub const STANDING_HEIGHT: f64 = 0.55;

const QUADRUPED_JOINTS: usize = 12;
const HALF_LENGTH: f64 = 0.3;
const HALF_WIDTH: f64 = 0.2;

fn com_offset() -> Vector3<f64> {
    Vector3::new(0.02, 0.0, 0.0)
}

/// Base-frame foot positions of the standing pose, in model order.
fn standing_feet() -> [(&'static str, Vector3<f64>); 4] {
    [
        (QUADRUPED_FEET[0], Vector3::new(HALF_LENGTH, HALF_WIDTH, -STANDING_HEIGHT)),
        (QUADRUPED_FEET[1], Vector3::new(HALF_LENGTH, -HALF_WIDTH, -STANDING_HEIGHT)),
        (QUADRUPED_FEET[2], Vector3::new(-HALF_LENGTH, HALF_WIDTH, -STANDING_HEIGHT)),
        (QUADRUPED_FEET[3], Vector3::new(-HALF_LENGTH, -HALF_WIDTH, -STANDING_HEIGHT)),
    ]
}

/// Lumped quadruped with its CoM 2 cm ahead of the base origin.
#[must_use]
pub fn quadruped_model() -> RigidBaseModel {
    RigidBaseModel::new(QUADRUPED_MASS)
        .with_com_offset(com_offset())
        .with_feet(QUADRUPED_FEET)
}

/// Standing whole-body state at the origin, weight spread evenly on the feet.
#[must_use]
pub fn standing_whole_body_state() -> WholeBodyState {
    let model = quadruped_model();
    let foot_load = model.total_mass() * model.gravity_acceleration() / 4.0;

    let mut state = WholeBodyState::with_joints(QUADRUPED_JOINTS);
    state.base_pos = Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, STANDING_HEIGHT);
    let mut contact_eff = BodyWrench::new();
    for (name, pos) in standing_feet() {
        state.contact_pos.insert(name.into(), pos);
        state.contact_vel.insert(name.into(), Vector3::zeros());
        state.contact_acc.insert(name.into(), Vector3::zeros());
        contact_eff.insert(name.into(), Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, foot_load));
    }
    state.contact_eff = contact_eff;
    state
}

/// Standing preview state: CoM at rest right above the CoP.
#[must_use]
pub fn standing_state() -> PreviewState {
    let offset = com_offset();
    let com_pos = Vector3::new(0.0, 0.0, STANDING_HEIGHT) + offset;

    let mut foot_pos = BodyVector::new();
    let mut zeros = BodyVector::new();
    for (name, pos) in standing_feet() {
        foot_pos.insert(name.into(), pos - offset);
        zeros.insert(name.into(), Vector3::zeros());
    }

    PreviewState {
        com_pos,
        cop: Vector3::new(com_pos.x, com_pos.y, 0.0),
        support_region: foot_pos.values().copied().collect(),
        foot_pos,
        foot_vel: zeros.clone(),
        foot_acc: zeros,
        ..PreviewState::default()
    }
}

/// A single stance phase on all four feet.
#[must_use]
pub fn stance_schedule(duration: f64) -> PreviewSchedule {
    PreviewSchedule::new(vec![PreviewPhase::stance(QUADRUPED_FEET, duration)])
}

/// Flying trot: two diagonal stance phases, each followed by a flight.
#[must_use]
pub fn trot_schedule(stance_duration: f64, flight_duration: f64) -> PreviewSchedule {
    PreviewSchedule::new(vec![
        PreviewPhase::stance(["lf_foot", "rh_foot"], stance_duration),
        PreviewPhase::flight(flight_duration),
        PreviewPhase::stance(["rf_foot", "lh_foot"], stance_duration),
        PreviewPhase::flight(flight_duration),
    ])
}

/// Control with the given phase parameters and zero foothold shifts.
#[must_use]
pub fn zero_control(params: &[PreviewParams]) -> PreviewControl {
    PreviewControl {
        params: params.to_vec(),
        feet_shift: QUADRUPED_FEET
            .iter()
            .map(|name| ((*name).to_string(), Vector2::zeros()))
            .collect(),
    }
}

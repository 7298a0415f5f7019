//! Value types shared by the preview engine and its collaborators.

use std::collections::BTreeMap;

use nalgebra::{DVector, Vector2, Vector3, Vector6};
use serde::{Deserialize, Serialize};

/// Index of the roll channel in a 6D base vector.
pub const AX: usize = 0;
/// Index of the pitch channel in a 6D base vector.
pub const AY: usize = 1;
/// Index of the yaw channel in a 6D base vector.
pub const AZ: usize = 2;
/// Index of the x translation channel in a 6D base vector.
pub const LX: usize = 3;
/// Index of the y translation channel in a 6D base vector.
pub const LY: usize = 4;
/// Index of the z translation channel in a 6D base vector.
pub const LZ: usize = 5;

/// Per-body 3D quantity keyed by body name (ordered by name).
pub type BodyVector = BTreeMap<String, Vector3<f64>>;

/// Per-body 6D wrench `[torque; force]` keyed by body name.
pub type BodyWrench = BTreeMap<String, Vector6<f64>>;

// ---------------------------------------------------------------------------
// Phases and schedule
// ---------------------------------------------------------------------------

/// Kind of a locomotion phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    /// At least one foot supports the body (SLIP dynamics).
    Stance,
    /// No support; ballistic motion of the center of mass.
    Flight,
}

impl PhaseType {
    /// Number of decision variables this phase contributes to a control vector.
    ///
    /// Stance: `[duration, cop_x, cop_y, length_shift, head_acc]`.
    /// Flight: `[duration]`.
    #[must_use]
    pub const fn params_dimension(self) -> usize {
        match self {
            Self::Stance => 5,
            Self::Flight => 1,
        }
    }
}

/// One phase of the preview schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreviewPhase {
    /// Stance or flight.
    #[serde(rename = "type")]
    pub phase_type: PhaseType,
    /// Names of the feet that are active (in support) during the phase.
    #[serde(default)]
    pub feet: Vec<String>,
    /// Nominal duration in seconds.
    #[serde(default)]
    pub duration: f64,
}

impl PreviewPhase {
    /// Stance phase supported by `feet`.
    pub fn stance<I, S>(feet: I, duration: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phase_type: PhaseType::Stance,
            feet: feet.into_iter().map(Into::into).collect(),
            duration,
        }
    }

    /// Flight phase (no feet in support).
    #[must_use]
    pub const fn flight(duration: f64) -> Self {
        Self {
            phase_type: PhaseType::Flight,
            feet: Vec::new(),
            duration,
        }
    }

    /// Number of decision variables of this phase.
    #[must_use]
    pub const fn params_dimension(&self) -> usize {
        self.phase_type.params_dimension()
    }
}

/// Ordered sequence of phases to preview.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewSchedule {
    phases: Vec<PreviewPhase>,
}

impl PreviewSchedule {
    #[must_use]
    pub const fn new(phases: Vec<PreviewPhase>) -> Self {
        Self { phases }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PreviewPhase> {
        self.phases.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PreviewPhase> {
        self.phases.iter()
    }

    #[must_use]
    pub fn phases(&self) -> &[PreviewPhase] {
        &self.phases
    }

    /// Sum of the per-phase decision widths (excludes the foothold block).
    #[must_use]
    pub fn params_dimension(&self) -> usize {
        self.phases.iter().map(PreviewPhase::params_dimension).sum()
    }

    /// Sum of the nominal phase durations.
    #[must_use]
    pub fn nominal_duration(&self) -> f64 {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

impl From<Vec<PreviewPhase>> for PreviewSchedule {
    fn from(phases: Vec<PreviewPhase>) -> Self {
        Self::new(phases)
    }
}

impl<'a> IntoIterator for &'a PreviewSchedule {
    type Item = &'a PreviewPhase;
    type IntoIter = std::slice::Iter<'a, PreviewPhase>;

    fn into_iter(self) -> Self::IntoIter {
        self.phases.iter()
    }
}

// ---------------------------------------------------------------------------
// Reduced model
// ---------------------------------------------------------------------------

/// Physical constants of the spring-loaded inverted pendulum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlipModel {
    /// Natural pendulum height in meters.
    pub height: f64,
    /// Vertical spring stiffness in N/m.
    pub stiffness: f64,
}

impl Default for SlipModel {
    fn default() -> Self {
        Self {
            height: 0.6,
            stiffness: 8000.0,
        }
    }
}

/// Reduced (centroidal) state used by the preview.
///
/// Foot and support-region quantities are expressed relative to the center
/// of mass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewState {
    pub time: f64,
    pub com_pos: Vector3<f64>,
    pub com_vel: Vector3<f64>,
    pub com_acc: Vector3<f64>,
    /// Heading (yaw) angle in radians.
    pub head_pos: f64,
    pub head_vel: f64,
    pub head_acc: f64,
    /// Center of pressure in the world frame.
    pub cop: Vector3<f64>,
    /// Vertices of the support polygon.
    pub support_region: Vec<Vector3<f64>>,
    pub foot_pos: BodyVector,
    pub foot_vel: BodyVector,
    pub foot_acc: BodyVector,
}

/// Time-ordered sequence of reduced states.
pub type PreviewTrajectory = Vec<PreviewState>;

/// Control parameters of a single phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewParams {
    /// Phase duration in seconds.
    pub duration: f64,
    /// Horizontal CoP displacement over the phase (stance only).
    pub cop_shift: Vector2<f64>,
    /// Pendulum length change over the phase (stance only).
    pub length_shift: f64,
    /// Heading acceleration (stance only).
    pub head_acc: f64,
}

impl PreviewParams {
    /// Stance parameters.
    #[must_use]
    pub const fn stance(
        duration: f64,
        cop_shift: Vector2<f64>,
        length_shift: f64,
        head_acc: f64,
    ) -> Self {
        Self {
            duration,
            cop_shift,
            length_shift,
            head_acc,
        }
    }

    /// Flight parameters: only the duration is meaningful.
    #[must_use]
    pub fn flight(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }
}

/// Structured control for a whole schedule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PreviewControl {
    /// One parameter set per scheduled phase.
    pub params: Vec<PreviewParams>,
    /// Horizontal foothold shift per foot, applied once per control.
    pub feet_shift: BTreeMap<String, Vector2<f64>>,
}

/// Parameters of the swing motion added to a phase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SwingParams {
    pub duration: f64,
    /// 3D target shift of every foot that swings; absent feet stay planted.
    pub feet_shift: BodyVector,
}

impl SwingParams {
    #[must_use]
    pub const fn new(duration: f64, feet_shift: BodyVector) -> Self {
        Self {
            duration,
            feet_shift,
        }
    }
}

/// Timing and clearance of a single foot step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepParameters {
    pub duration: f64,
    pub step_height: f64,
}

impl StepParameters {
    #[must_use]
    pub const fn new(duration: f64, step_height: f64) -> Self {
        Self {
            duration,
            step_height,
        }
    }
}

/// Position, velocity and acceleration of a swing foot at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SwingSample {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
}

// ---------------------------------------------------------------------------
// Whole-body model
// ---------------------------------------------------------------------------

/// Kind of an end-effector, used to select the feet of a robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndEffectorKind {
    Foot,
    Hand,
}

/// Full robot state: floating base, joints and contacts.
///
/// Base vectors are ordered `[AX, AY, AZ, LX, LY, LZ]`. Contact positions
/// are expressed in the base frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WholeBodyState {
    pub time: f64,
    pub base_pos: Vector6<f64>,
    pub base_vel: Vector6<f64>,
    pub base_acc: Vector6<f64>,
    pub joint_pos: DVector<f64>,
    pub joint_vel: DVector<f64>,
    pub joint_acc: DVector<f64>,
    pub contact_pos: BodyVector,
    pub contact_vel: BodyVector,
    pub contact_acc: BodyVector,
    pub contact_eff: BodyWrench,
}

impl Default for WholeBodyState {
    fn default() -> Self {
        Self {
            time: 0.0,
            base_pos: Vector6::zeros(),
            base_vel: Vector6::zeros(),
            base_acc: Vector6::zeros(),
            joint_pos: DVector::zeros(0),
            joint_vel: DVector::zeros(0),
            joint_acc: DVector::zeros(0),
            contact_pos: BodyVector::new(),
            contact_vel: BodyVector::new(),
            contact_acc: BodyVector::new(),
            contact_eff: BodyWrench::new(),
        }
    }
}

impl WholeBodyState {
    /// Whole-body state with `dof` zeroed joints.
    #[must_use]
    pub fn with_joints(dof: usize) -> Self {
        Self {
            joint_pos: DVector::zeros(dof),
            joint_vel: DVector::zeros(dof),
            joint_acc: DVector::zeros(dof),
            ..Self::default()
        }
    }

    /// Linear part of the base position.
    #[must_use]
    pub fn base_translation(&self) -> Vector3<f64> {
        self.base_pos.fixed_rows::<3>(LX).into()
    }

    /// Roll, pitch and yaw of the base.
    #[must_use]
    pub fn base_rpy(&self) -> Vector3<f64> {
        self.base_pos.fixed_rows::<3>(AX).into()
    }
}

/// Time-ordered sequence of whole-body states.
pub type WholeBodyTrajectory = Vec<WholeBodyState>;

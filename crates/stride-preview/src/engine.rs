//! Multi-phase preview engine.
//!
//! [`PreviewLocomotion`] owns the schedule, the SLIP constants and one piece
//! of session state: the actual system CoM offset cached by the most recent
//! whole-body reduction. The swing composer and the lifting converters read
//! that offset, so run parallel previews on separate engine instances (the
//! schedule and the robot model are shared through `Arc`).

use std::sync::Arc;

use nalgebra::{DVector, Vector2, Vector3};
use stride_core::config::{
    PreviewConfig, check_force_threshold, check_sample_time, check_slip, check_step_height,
};
use stride_core::error::PreviewError;
use stride_core::traits::{FlatTerrain, FloatingBaseModel, FootPatternGenerator, TerrainHeight};
use stride_core::types::{
    BodyVector, EndEffectorKind, PhaseType, PreviewControl, PreviewParams, PreviewPhase,
    PreviewSchedule, PreviewState, PreviewTrajectory, SlipModel, StepParameters, SwingParams,
};
use tracing::{debug, error, trace};

use crate::control;
use crate::slip::{MAX_PREVIEW_SAMPLES, PhaseDynamics, sample_count, sample_elapsed};
use crate::swing::BezierSwing;

const DEFAULT_SAMPLE_TIME: f64 = 0.001;
const DEFAULT_STEP_HEIGHT: f64 = 0.1;

/// Preview engine for a floating-base robot `M`, using `G` for swing feet.
pub struct PreviewLocomotion<M, G = BezierSwing> {
    pub(crate) model: Arc<M>,
    pub(crate) swing_generator: G,
    pub(crate) terrain: Arc<dyn TerrainHeight + Send + Sync>,
    pub(crate) sample_time: f64,
    pub(crate) slip: SlipModel,
    pub(crate) step_height: f64,
    pub(crate) force_threshold: f64,
    pub(crate) gravity: f64,
    pub(crate) mass: f64,
    pub(crate) schedule: Option<Arc<PreviewSchedule>>,
    /// Foot end-effectors in model order; fixes the foothold block layout.
    pub(crate) feet: Vec<String>,
    pub(crate) actual_system_com: Vector3<f64>,
}

impl<M, G: Clone> Clone for PreviewLocomotion<M, G> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            swing_generator: self.swing_generator.clone(),
            terrain: Arc::clone(&self.terrain),
            sample_time: self.sample_time,
            slip: self.slip,
            step_height: self.step_height,
            force_threshold: self.force_threshold,
            gravity: self.gravity,
            mass: self.mass,
            schedule: self.schedule.clone(),
            feet: self.feet.clone(),
            actual_system_com: self.actual_system_com,
        }
    }
}

impl<M: FloatingBaseModel> PreviewLocomotion<M, BezierSwing> {
    /// Engine with the Bezier swing generator and default settings.
    pub fn new(model: Arc<M>) -> Self {
        Self::with_generator(model, BezierSwing::default())
    }

    /// Engine configured from a validated [`PreviewConfig`].
    pub fn from_config(
        model: Arc<M>,
        config: &PreviewConfig,
    ) -> Result<Self, PreviewError> {
        config.validate()?;
        let mut engine = Self::new(model);
        engine.set_sample_time(config.sample_time)?;
        engine.set_step_height(config.step_height)?;
        engine.set_force_threshold(config.force_threshold)?;
        engine.set_slip_model(config.slip)?;
        if let Some(schedule) = config.preview_schedule() {
            engine.set_schedule(schedule);
        }
        Ok(engine)
    }
}

impl<M: FloatingBaseModel, G: FootPatternGenerator> PreviewLocomotion<M, G> {
    /// Engine with a custom swing generator.
    ///
    /// Gravity, total mass, the foot names and the initial CoM offset are
    /// read from the model.
    pub fn with_generator(model: Arc<M>, swing_generator: G) -> Self {
        Self {
            gravity: model.gravity_acceleration(),
            mass: model.total_mass(),
            feet: model.end_effector_names(Some(EndEffectorKind::Foot)),
            actual_system_com: model.floating_base_com(),
            model,
            swing_generator,
            terrain: Arc::new(FlatTerrain),
            sample_time: DEFAULT_SAMPLE_TIME,
            slip: SlipModel::default(),
            step_height: DEFAULT_STEP_HEIGHT,
            force_threshold: 0.0,
            schedule: None,
        }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    // Setters reject the same values as `PreviewConfig::validate` and leave
    // the engine unchanged on error.

    pub fn set_sample_time(&mut self, sample_time: f64) -> Result<(), PreviewError> {
        check_sample_time(sample_time)?;
        self.sample_time = sample_time;
        Ok(())
    }

    /// Set the SLIP constants.
    pub fn set_slip_model(&mut self, slip: SlipModel) -> Result<(), PreviewError> {
        check_slip(&slip)?;
        self.slip = slip;
        Ok(())
    }

    pub fn set_step_height(&mut self, step_height: f64) -> Result<(), PreviewError> {
        check_step_height(step_height)?;
        self.step_height = step_height;
        Ok(())
    }

    pub fn set_force_threshold(&mut self, force_threshold: f64) -> Result<(), PreviewError> {
        check_force_threshold(force_threshold)?;
        self.force_threshold = force_threshold;
        Ok(())
    }

    /// Set the phase schedule. The number of phases is fixed from here on.
    pub fn set_schedule(&mut self, schedule: impl Into<Arc<PreviewSchedule>>) {
        let schedule = schedule.into();
        debug!(phases = schedule.len(), "preview schedule set");
        self.schedule = Some(schedule);
    }

    /// Replace the terrain used for the vertical foothold shift.
    pub fn set_terrain(&mut self, terrain: Arc<dyn TerrainHeight + Send + Sync>) {
        self.terrain = terrain;
    }

    /// Seed the cached CoM offset without a whole-body reduction.
    pub fn set_actual_system_com(&mut self, com: Vector3<f64>) {
        self.actual_system_com = com;
    }

    #[must_use]
    pub const fn sample_time(&self) -> f64 {
        self.sample_time
    }

    #[must_use]
    pub const fn slip_model(&self) -> SlipModel {
        self.slip
    }

    #[must_use]
    pub const fn step_height(&self) -> f64 {
        self.step_height
    }

    #[must_use]
    pub const fn force_threshold(&self) -> f64 {
        self.force_threshold
    }

    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// CoM offset cached by the last whole-body reduction.
    #[must_use]
    pub const fn actual_system_com(&self) -> Vector3<f64> {
        self.actual_system_com
    }

    #[must_use]
    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// Foot end-effector names, in decision-vector order.
    #[must_use]
    pub fn feet(&self) -> &[String] {
        &self.feet
    }

    #[must_use]
    pub fn schedule(&self) -> Option<&Arc<PreviewSchedule>> {
        self.schedule.as_ref()
    }

    /// Number of scheduled phases (zero before a schedule is set).
    #[must_use]
    pub fn number_of_phases(&self) -> usize {
        self.schedule.as_ref().map_or(0, |s| s.len())
    }

    pub fn phase(&self, index: usize) -> Result<&PreviewPhase, PreviewError> {
        let schedule = self.require_schedule()?;
        schedule.get(index).ok_or(PreviewError::PhaseIndex {
            index,
            phases: schedule.len(),
        })
    }

    fn require_schedule(&self) -> Result<&Arc<PreviewSchedule>, PreviewError> {
        self.schedule.as_ref().ok_or_else(|| {
            error!("there is no preview schedule defined");
            PreviewError::ScheduleNotSet
        })
    }

    /// Constants handed to the phase simulators.
    #[must_use]
    pub const fn phase_dynamics(&self) -> PhaseDynamics {
        PhaseDynamics {
            sample_time: self.sample_time,
            slip: self.slip,
            gravity: self.gravity,
            mass: self.mass,
        }
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------

    /// Preview the whole schedule from `state` under `control`.
    ///
    /// Each phase starts from the last state of the previous one. Phases
    /// shorter than the sample period contribute no samples.
    pub fn multi_phase_preview(
        &mut self,
        state: &PreviewState,
        control: &PreviewControl,
    ) -> Result<PreviewTrajectory, PreviewError> {
        let schedule = Arc::clone(self.require_schedule()?);
        if control.params.len() != schedule.len() {
            error!(
                expected = schedule.len(),
                got = control.params.len(),
                "preview control does not match the schedule"
            );
            return Err(PreviewError::PhaseCount {
                expected: schedule.len(),
                got: control.params.len(),
            });
        }

        let dynamics = self.phase_dynamics();
        let total_samples = self.total_samples(control)?;
        let mut trajectory = PreviewTrajectory::with_capacity(total_samples.max(1));

        for (i, (phase, params)) in schedule.iter().zip(&control.params).enumerate() {
            let actual_state = trajectory.last().unwrap_or(state).clone();

            let mut phase_traj = match phase.phase_type {
                PhaseType::Stance => {
                    let mut phase_traj = dynamics.stance_preview(&actual_state, params)?;
                    let feet_shift =
                        self.stance_feet_shift(phase, control, &actual_state, &phase_traj)?;
                    let swing_params = SwingParams::new(params.duration, feet_shift);
                    self.add_swing_pattern(&mut phase_traj, &actual_state, &swing_params)?;
                    phase_traj
                }
                PhaseType::Flight => {
                    let mut phase_traj = dynamics.flight_preview(&actual_state, params)?;
                    let swing_params = SwingParams::new(params.duration, BodyVector::new());
                    self.add_swing_pattern(&mut phase_traj, &actual_state, &swing_params)?;
                    phase_traj
                }
            };
            trace!(
                phase = i,
                kind = ?phase.phase_type,
                samples = phase_traj.len(),
                "phase previewed"
            );

            trajectory.append(&mut phase_traj);

            // Keep a defined start for the next phase
            if trajectory.is_empty() {
                trajectory.push(state.clone());
            }
        }

        debug!(
            phases = schedule.len(),
            samples = trajectory.len(),
            "multi-phase preview done"
        );
        Ok(trajectory)
    }

    /// Samples of the whole schedule, bounded by [`MAX_PREVIEW_SAMPLES`].
    fn total_samples(&self, control: &PreviewControl) -> Result<usize, PreviewError> {
        let mut total: usize = 0;
        for params in &control.params {
            let count = sample_count(params.duration, self.sample_time).inspect_err(|e| {
                error!(error = %e, "cannot sample preview phase");
            })?;
            total = total
                .checked_add(count)
                .filter(|&n| n <= MAX_PREVIEW_SAMPLES)
                .ok_or_else(|| {
                    let duration = control.params.iter().map(|p| p.duration).sum::<f64>();
                    error!(duration, limit = MAX_PREVIEW_SAMPLES, "preview is too long");
                    PreviewError::SampleCount {
                        duration,
                        sample_time: self.sample_time,
                    }
                })?;
        }
        Ok(total)
    }

    /// Preview of a single stance phase.
    pub fn stance_preview(
        &self,
        state: &PreviewState,
        params: &PreviewParams,
    ) -> Result<PreviewTrajectory, PreviewError> {
        self.phase_dynamics().stance_preview(state, params)
    }

    /// Preview of a single flight phase.
    pub fn flight_preview(
        &self,
        state: &PreviewState,
        params: &PreviewParams,
    ) -> Result<PreviewTrajectory, PreviewError> {
        self.phase_dynamics().flight_preview(state, params)
    }

    /// 3D foothold shifts of the feet moved during a stance phase.
    ///
    /// The vertical component comes from the terrain, evaluated at the
    /// foothold below the terminal base position.
    fn stance_feet_shift(
        &self,
        phase: &PreviewPhase,
        control: &PreviewControl,
        actual_state: &PreviewState,
        phase_traj: &PreviewTrajectory,
    ) -> Result<BodyVector, PreviewError> {
        let terminal_com = phase_traj
            .last()
            .map_or(actual_state.com_pos, |s| s.com_pos);
        let terminal_base = terminal_com - self.actual_system_com;

        let mut feet_shift = BodyVector::new();
        for foot in &phase.feet {
            let shift: &Vector2<f64> = control.feet_shift.get(foot).ok_or_else(|| {
                error!(foot = %foot, "no foothold shift for active foot");
                PreviewError::MissingFootShift(foot.clone())
            })?;
            let foothold = shift + terminal_base.xy();
            let z_shift = self.terrain.vertical_shift(foot, &foothold);
            feet_shift.insert(foot.clone(), Vector3::new(shift.x, shift.y, z_shift));
        }
        Ok(feet_shift)
    }

    /// Overlay foot motion on a phase trajectory that already holds the
    /// centroidal motion.
    ///
    /// Feet listed in `params.feet_shift` swing from their initial position
    /// to that position plus the shift. All other feet stay fixed in the
    /// world: their CoM-relative position moves opposite to the base.
    pub fn add_swing_pattern(
        &mut self,
        trajectory: &mut PreviewTrajectory,
        state: &PreviewState,
        params: &SwingParams,
    ) -> Result<(), PreviewError> {
        let phase_samples = sample_count(params.duration, self.sample_time)?;
        let num_samples = phase_samples.min(trajectory.len());
        if num_samples == 0 {
            return Ok(());
        }

        let actual_base_pos = trajectory[0].com_pos - self.actual_system_com;
        let step_params = StepParameters::new(params.duration, self.step_height);

        for (name, actual_pos) in &state.foot_pos {
            if let Some(foot_shift) = params.feet_shift.get(name) {
                let target_pos = actual_pos + foot_shift;
                self.swing_generator
                    .set_parameters(state.time, actual_pos, &target_pos, step_params);

                for (k, sample) in trajectory.iter_mut().take(num_samples).enumerate() {
                    let time = state.time
                        + sample_elapsed(k, phase_samples, params.duration, self.sample_time);
                    let swing = self.swing_generator.generate(time);
                    sample.foot_pos.insert(name.clone(), swing.position);
                    sample.foot_vel.insert(name.clone(), swing.velocity);
                    sample.foot_acc.insert(name.clone(), swing.acceleration);
                }
            } else {
                for sample in trajectory.iter_mut().take(num_samples) {
                    let base_pos = sample.com_pos - self.actual_system_com;
                    sample
                        .foot_pos
                        .insert(name.clone(), actual_pos - (base_pos - actual_base_pos));
                    sample.foot_vel.insert(name.clone(), Vector3::zeros());
                    sample.foot_acc.insert(name.clone(), Vector3::zeros());
                }
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Decision vector
    // -----------------------------------------------------------------------

    /// Decision width of one scheduled phase.
    pub fn params_dimension(&self, phase: usize) -> Result<usize, PreviewError> {
        Ok(self.phase(phase)?.params_dimension())
    }

    /// Length of the decision vector for the current schedule.
    pub fn control_dimension(&self) -> Result<usize, PreviewError> {
        let schedule = self.require_schedule()?;
        Ok(control::control_dimension(schedule, self.feet.len()))
    }

    /// Structured control from a flat decision vector.
    pub fn to_preview_control(
        &self,
        decision: &DVector<f64>,
    ) -> Result<PreviewControl, PreviewError> {
        let schedule = self.require_schedule()?;
        control::to_preview_control(schedule, &self.feet, decision).inspect_err(|e| {
            error!(error = %e, "cannot convert the decision vector");
        })
    }

    /// Flat decision vector from a structured control.
    pub fn from_preview_control(
        &self,
        preview_control: &PreviewControl,
    ) -> Result<DVector<f64>, PreviewError> {
        let schedule = self.require_schedule()?;
        control::from_preview_control(schedule, &self.feet, preview_control)
    }
}

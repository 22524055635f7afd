//! Closed-Loop Control
//!
//! [`ClosedLoopController`] tracks a trapezoidal reference with state
//! feedback plus a constant feedforward that cancels the plant disturbance,
//! then saturates and current-limits the result. [`ClosedLoop`] wires the
//! controller to the plant simulator through a [`SimState`] bus and records
//! one [`Telemetry`] sample per tick.

use log::{debug, trace};
use mechanics::MotorSystem;
use simcore::{
    AffineSystemSim, ControlModel, MechanicsModel, Model, PositionVelocityState, SimContext,
    SimResult, SimState, Tolerance, VoltageInput,
};

use crate::feedback::StateFeedback;
use crate::setpoint::PeriodicSetpoints;
use crate::telemetry::Telemetry;
use crate::trajectory::TrapezoidProfile;

#[derive(Debug, Clone)]
pub struct ClosedLoopController<S> {
    system: S,
    profile: TrapezoidProfile,
    feedback: StateFeedback,
    /// Voltage that holds the plant still against its disturbance (V)
    feedforward: f64,
    tolerance: Tolerance,
    /// Last goal seen on the bus, used to report goal changes
    active_goal: Option<PositionVelocityState>,
}

impl<S: MotorSystem> ClosedLoopController<S> {
    pub fn new(
        system: S,
        profile: TrapezoidProfile,
        feedback: StateFeedback,
        feedforward: f64,
    ) -> Self {
        Self {
            system,
            profile,
            feedback,
            feedforward,
            tolerance: Tolerance::default(),
            active_goal: None,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Voltage to apply at `state` while tracking `reference`:
    /// `K·(reference − state) + feedforward`, saturated and current-limited.
    pub fn compute(&self, state: &PositionVelocityState, reference: &PositionVelocityState) -> f64 {
        let error = *reference - *state;
        let requested = self.feedback.compute(&error) + self.feedforward;
        self.system.limit_voltage(state.velocity(), requested)
    }

    pub fn at_goal(&self, state: &PositionVelocityState, goal: &PositionVelocityState) -> bool {
        state.within(goal, &self.tolerance)
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn profile(&self) -> &TrapezoidProfile {
        &self.profile
    }

    pub fn feedback(&self) -> &StateFeedback {
        &self.feedback
    }

    pub fn feedforward(&self) -> f64 {
        self.feedforward
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }
}

impl<S: MotorSystem> Model for ClosedLoopController<S> {
    fn reset(&mut self) {
        self.active_goal = None;
    }
}

impl<S: MotorSystem> ControlModel for ClosedLoopController<S> {
    fn step_control(&mut self, ctx: SimContext, state: &mut SimState) {
        if self.active_goal != Some(state.goal) {
            debug!(
                "t={:.3} s: goal {:.4} m @ {:.4} m/s from {:.4} m @ {:.4} m/s ({:.3} s profile)",
                ctx.t,
                state.goal.position(),
                state.goal.velocity(),
                state.reference.position(),
                state.reference.velocity(),
                self.profile.total_time(state.reference, state.goal)
            );
            self.active_goal = Some(state.goal);
        }

        let reference = self.profile.calculate(ctx.dt, state.reference, state.goal);
        let voltage = self.compute(&state.true_state, &reference);

        state.reference = reference;
        state.control_input = VoltageInput::new(voltage);
        state.at_goal = self.at_goal(&state.true_state, &state.goal);

        trace!(
            "t={:.4} s: ref {:.5} m, state {:.5} m, u={:.4} V",
            ctx.t,
            reference.position(),
            state.true_state.position(),
            voltage
        );
    }
}

/// Fixed-step driver: control, then physics, once per tick.
#[derive(Debug, Clone)]
pub struct ClosedLoop<S> {
    plant: AffineSystemSim,
    controller: ClosedLoopController<S>,
    state: SimState,
    ctx: SimContext,
}

impl<S: MotorSystem> ClosedLoop<S> {
    /// Builds the plant simulator for `system` under a constant `disturbance`
    /// acceleration and a controller whose feedforward cancels it.
    pub fn new(
        system: S,
        profile: TrapezoidProfile,
        feedback: StateFeedback,
        disturbance: f64,
        time_step: f64,
    ) -> SimResult<Self> {
        let plant = system.simulator(disturbance, time_step)?;
        let feedforward = plant.opposing_voltage();
        let controller = ClosedLoopController::new(system, profile, feedback, feedforward);
        let state = SimState::new(plant.state());
        let ctx = SimContext::new(plant.time_step());
        Ok(Self {
            plant,
            controller,
            state,
            ctx,
        })
    }

    /// Places the plant at `initial` (clamped to its travel) with the
    /// reference and goal on the same point.
    pub fn with_initial_state(mut self, initial: PositionVelocityState) -> Self {
        self.plant.set_state(initial);
        self.state = SimState::new(self.plant.state());
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.controller = self.controller.with_tolerance(tolerance);
        self
    }

    pub fn set_goal(&mut self, goal: PositionVelocityState) {
        self.state.goal = goal;
    }

    /// Advances one time step and returns the sample for it.
    pub fn tick(&mut self) -> Telemetry {
        let velocity = self.state.true_state.velocity();
        self.controller.step_control(self.ctx, &mut self.state);
        let voltage = self.state.control_input.voltage();
        let current = self.controller.system().current(velocity, voltage);

        self.plant.step_physics(self.ctx, &mut self.state);
        self.ctx = self.ctx.advanced();
        self.state.at_goal = self
            .controller
            .at_goal(&self.state.true_state, &self.state.goal);

        let [position, velocity] = self.state.true_state.to_array();
        let [reference_position, reference_velocity] = self.state.reference.to_array();
        Telemetry {
            time: self.ctx.t,
            position,
            velocity,
            reference_position,
            reference_velocity,
            voltage,
            current,
            at_goal: self.state.at_goal,
        }
    }

    /// Runs for `duration` seconds, taking the goal from `setpoints` at the
    /// start of every tick.
    pub fn run_schedule(&mut self, setpoints: &PeriodicSetpoints, duration: f64) -> Vec<Telemetry> {
        let ticks = (duration / self.ctx.dt).round().max(0.0) as usize;
        let mut samples = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            self.set_goal(setpoints.goal_at(self.ctx.t));
            samples.push(self.tick());
        }
        samples
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn time(&self) -> f64 {
        self.ctx.t
    }

    pub fn time_step(&self) -> f64 {
        self.plant.time_step()
    }

    pub fn plant(&self) -> &AffineSystemSim {
        &self.plant
    }

    pub fn controller(&self) -> &ClosedLoopController<S> {
        &self.controller
    }
}

impl<S: MotorSystem> Model for ClosedLoop<S> {
    fn reset(&mut self) {
        self.plant.reset();
        self.controller.reset();
        self.state = SimState::new(self.plant.state());
        self.ctx = SimContext::new(self.plant.time_step());
    }
}

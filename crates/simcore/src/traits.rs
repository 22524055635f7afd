use crate::state::{PositionVelocityState, VoltageInput};

/// Shared bus that the mechanics and control models read from and write to each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimState {
    pub true_state: PositionVelocityState,
    pub control_input: VoltageInput,
    pub reference: PositionVelocityState,
    pub goal: PositionVelocityState,
    pub at_goal: bool,
}

impl SimState {
    pub fn new(initial: PositionVelocityState) -> Self {
        SimState {
            true_state: initial,
            reference: initial,
            goal: initial,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SimContext {
    pub dt: f64,
    pub t: f64,
}

impl SimContext {
    pub fn new(dt: f64) -> Self {
        SimContext { dt, t: 0.0 }
    }

    /// Context for the following tick.
    pub fn advanced(&self) -> Self {
        SimContext {
            dt: self.dt,
            t: self.t + self.dt,
        }
    }
}

pub trait Model {
    fn reset(&mut self);
}

pub trait MechanicsModel: Model {
    fn step_physics(&mut self, ctx: SimContext, state: &mut SimState);
}

pub trait ControlModel: Model {
    fn step_control(&mut self, ctx: SimContext, state: &mut SimState);
}

//! Affine discrete-time simulator for a two-state, one-input actuator.
//!
//! The plant is `ẋ = A_c·x + B_c·u + c`, where `c` is a constant forcing term
//! such as gravity. All discrete matrices are computed once at construction for
//! a fixed time step and reused every tick.

use log::{debug, trace, warn};
use nalgebra::{Matrix1x2, Matrix2, Vector2};

use crate::error::SimResult;
use crate::linear::{discrete_constant, discretize, pseudo_inverse};
use crate::state::{PositionVelocityState, VoltageInput};
use crate::traits::{MechanicsModel, Model, SimContext, SimState};

const TIME_STEP_MISMATCH: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct AffineSystemSim {
    continuous_input_pseudo_inverse: Matrix1x2<f64>,
    continuous_constant: Vector2<f64>,
    discrete_system: Matrix2<f64>,
    discrete_input: Vector2<f64>,
    discrete_constant: Vector2<f64>,
    time_step: f64,
    min_position: f64,
    max_position: f64,
    state: PositionVelocityState,
    input: VoltageInput,
}

impl AffineSystemSim {
    /// Builds the simulator starting at rest at the origin.
    ///
    /// Fails if `time_step` is not positive or `continuous_input` has no left
    /// pseudoinverse (the input does not couple into the dynamics at all).
    pub fn new(
        continuous_system: Matrix2<f64>,
        continuous_input: Vector2<f64>,
        continuous_constant: Vector2<f64>,
        time_step: f64,
    ) -> SimResult<Self> {
        let (discrete_system, discrete_input) =
            discretize(&continuous_system, &continuous_input, time_step)?;
        let continuous_input_pseudo_inverse = pseudo_inverse(&continuous_input)?;
        let discrete_constant = discrete_constant(
            &discrete_input,
            &continuous_input_pseudo_inverse,
            &continuous_constant,
        );

        debug!(
            "affine sim: dt={time_step} s, A_c={continuous_system:?}, B_c={continuous_input:?}, \
             A_d={discrete_system:?}, B_d={discrete_input:?}, constant_d={discrete_constant:?}"
        );

        Ok(AffineSystemSim {
            continuous_input_pseudo_inverse,
            continuous_constant,
            discrete_system,
            discrete_input,
            discrete_constant,
            time_step,
            min_position: f64::NEG_INFINITY,
            max_position: f64::INFINITY,
            state: PositionVelocityState::default(),
            input: VoltageInput::default(),
        })
    }

    /// Restricts position to `[min, max]` after every update.
    pub fn with_position_limits(mut self, min: f64, max: f64) -> Self {
        self.min_position = min;
        self.max_position = max;
        self.state = self.state.position_clamped(min, max);
        self
    }

    pub fn with_state(mut self, state: PositionVelocityState) -> Self {
        self.set_state(state);
        self
    }

    /// Input that exactly cancels the constant forcing term, `-B_c⁺·c`.
    pub fn stabilizing_input(&self) -> VoltageInput {
        let equivalent = self.continuous_input_pseudo_inverse * self.continuous_constant;
        VoltageInput::from_vector(-equivalent)
    }

    /// Voltage that holds the actuator still against the constant disturbance.
    pub fn opposing_voltage(&self) -> f64 {
        self.stabilizing_input().voltage()
    }

    /// Applies `voltage` for one time step.
    pub fn update(&mut self, voltage: f64) {
        self.input = VoltageInput::new(voltage);
        self.step();
    }

    /// Advances one time step with the currently held input.
    ///
    /// Only position is clamped to the travel limits; velocity keeps whatever
    /// the integration produced, even against a hard stop.
    pub fn step(&mut self) {
        let next = self.discrete_system * self.state.vector
            + self.discrete_input * self.input.vector
            + self.discrete_constant;
        self.state = PositionVelocityState::from_vector(next)
            .position_clamped(self.min_position, self.max_position);
        trace!(
            "affine sim: u={:.4} V -> x={:.6} m, v={:.6} m/s",
            self.input.voltage(),
            self.state.position(),
            self.state.velocity()
        );
    }

    pub fn state(&self) -> PositionVelocityState {
        self.state
    }

    pub fn set_state(&mut self, state: PositionVelocityState) {
        self.state = state.position_clamped(self.min_position, self.max_position);
    }

    pub fn position(&self) -> f64 {
        self.state.position()
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity()
    }

    /// Last applied voltage (V).
    pub fn voltage(&self) -> f64 {
        self.input.voltage()
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn position_limits(&self) -> (f64, f64) {
        (self.min_position, self.max_position)
    }
}

impl Model for AffineSystemSim {
    fn reset(&mut self) {
        self.input = VoltageInput::default();
        self.set_state(PositionVelocityState::default());
    }
}

impl MechanicsModel for AffineSystemSim {
    fn step_physics(&mut self, ctx: SimContext, state: &mut SimState) {
        if (ctx.dt - self.time_step).abs() > TIME_STEP_MISMATCH {
            warn!(
                "affine sim stepped with dt={} s but was discretized for {} s",
                ctx.dt, self.time_step
            );
        }
        self.update(state.control_input.voltage());
        state.true_state = self.state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use approx::assert_relative_eq;

    fn damped_plant(gravity: f64, dt: f64) -> AffineSystemSim {
        AffineSystemSim::new(
            Matrix2::new(0.0, 1.0, 0.0, -20.0),
            Vector2::new(0.0, 8.0),
            Vector2::new(0.0, gravity),
            dt,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let bad_step = AffineSystemSim::new(
            Matrix2::zeros(),
            Vector2::new(0.0, 1.0),
            Vector2::zeros(),
            0.0,
        );
        assert!(matches!(bad_step, Err(SimError::NonPositiveTimeStep { .. })));

        let no_input =
            AffineSystemSim::new(Matrix2::zeros(), Vector2::zeros(), Vector2::zeros(), 0.001);
        assert_eq!(no_input.unwrap_err(), SimError::SingularInputMatrix);
    }

    #[test]
    fn test_stabilizing_input_holds_against_gravity() {
        let mut sim = damped_plant(-9.81, 0.001).with_state(PositionVelocityState::at_rest(1.0));
        let hold = sim.opposing_voltage();
        assert_relative_eq!(hold, 9.81 / 8.0, max_relative = 1e-12);

        for _ in 0..1000 {
            sim.update(hold);
        }
        assert!(sim.velocity().abs() < 1e-9);
        assert!((sim.position() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_falls_without_input() {
        let mut sim = damped_plant(-9.81, 0.001).with_state(PositionVelocityState::at_rest(1.0));
        for _ in 0..100 {
            sim.update(0.0);
        }
        assert!(sim.velocity() < 0.0);
        assert!(sim.position() < 1.0);
    }

    #[test]
    fn test_position_clamped_velocity_kept() {
        let mut sim = damped_plant(0.0, 0.01).with_position_limits(0.0, 0.05);
        for _ in 0..200 {
            sim.update(12.0);
        }
        assert_eq!(sim.position(), 0.05);
        // Velocity is left to the integrator even at the stop
        assert!(sim.velocity() > 4.0);

        let mut falling = damped_plant(-9.81, 0.01).with_position_limits(0.0, 1.0);
        for _ in 0..200 {
            falling.update(0.0);
        }
        assert_eq!(falling.position(), 0.0);
        assert!(falling.velocity() < 0.0);
    }

    #[test]
    fn test_deterministic_sequences() {
        let inputs: Vec<f64> = (0..500).map(|k| ((k as f64) * 0.05).sin() * 6.0).collect();
        let run = || {
            let mut sim = damped_plant(-9.81, 0.002);
            inputs
                .iter()
                .map(|&u| {
                    sim.update(u);
                    sim.state().to_array()
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_step_physics_uses_bus_input() {
        let mut sim = damped_plant(0.0, 0.001);
        let mut bus = SimState::default();
        bus.control_input = VoltageInput::new(6.0);
        sim.step_physics(SimContext::new(0.001), &mut bus);
        assert!(bus.true_state.velocity() > 0.0);
        assert_eq!(sim.voltage(), 6.0);
        assert_eq!(bus.true_state, sim.state());

        sim.reset();
        assert_eq!(sim.state(), PositionVelocityState::default());
        assert_eq!(sim.voltage(), 0.0);
    }
}

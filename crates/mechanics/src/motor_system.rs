//! Capability shared by every motor-driven single-axis mechanism.
//!
//! A mechanism only has to describe how its output velocity maps onto the
//! motor shaft and what its linearised dynamics look like; current draw,
//! current limiting, the free-running velocity and the peak acceleration are
//! derived the same way for linear and rotary mechanisms alike.
//!
//! "Velocity" below is the mechanism's native output rate: m/s for linear
//! stages, rad/s for rotary joints.

use electrical::Motor;
use nalgebra::{Matrix2, Vector2};
use simcore::{AffineSystemSim, SimResult};

pub trait MotorSystem {
    fn motor(&self) -> &Motor;

    /// Current limit (A) enforced by [`MotorSystem::limit_voltage`].
    fn max_current(&self) -> f64;

    /// Motor shaft angular velocity (rad/s) for a mechanism output velocity.
    fn motor_velocity(&self, velocity: f64) -> f64;

    /// Output acceleration for a given output velocity and applied voltage.
    fn acceleration(&self, velocity: f64, voltage: f64) -> f64;

    /// `∂a/∂v`, the back-EMF damping term. Always negative.
    fn velocity_coefficient(&self) -> f64;

    /// `∂a/∂V`, the actuation gain.
    fn voltage_coefficient(&self) -> f64;

    /// Rejects parameters that would make the model divide by zero or lose its meaning.
    fn validate(&self) -> SimResult<()>;

    /// Hard stops on the output position, if the mechanism has any.
    fn travel_limits(&self) -> Option<(f64, f64)> {
        None
    }

    /// Motor current (A) at an output velocity and applied voltage.
    fn current(&self, velocity: f64, voltage: f64) -> f64 {
        self.motor().current(self.motor_velocity(velocity), voltage)
    }

    /// Saturates `voltage` to the nominal supply, then lowers it to the value
    /// that draws exactly `max_current` if the saturated voltage would draw more.
    ///
    /// The limit depends on velocity: back-EMF at speed lets a higher voltage
    /// through for the same current.
    fn limit_voltage(&self, velocity: f64, voltage: f64) -> f64 {
        let motor = self.motor();
        let voltage = voltage.clamp(-motor.nominal_voltage, motor.nominal_voltage);
        if self.current(velocity, voltage) > self.max_current() {
            self.max_current() * motor.resistance()
                + self.motor_velocity(velocity) / motor.velocity_constant()
        } else {
            voltage
        }
    }

    /// Steady free-running velocity at nominal voltage, solving
    /// `0 = velocity_coefficient·v + voltage_coefficient·V`.
    fn maximum_velocity(&self) -> f64 {
        -self.motor().nominal_voltage * self.voltage_coefficient() / self.velocity_coefficient()
    }

    /// Peak acceleration, reached from standstill with the current-limited nominal voltage.
    fn maximum_acceleration(&self) -> f64 {
        let voltage = self.limit_voltage(0.0, self.motor().nominal_voltage);
        self.acceleration(0.0, voltage)
    }

    /// Steady voltage that cancels a constant disturbance acceleration.
    fn opposing_voltage(&self, acceleration: f64) -> f64 {
        -acceleration / self.voltage_coefficient()
    }

    /// Continuous `(A_c, B_c)` for the state `[position, velocity]` and input `[voltage]`.
    fn continuous_system(&self) -> (Matrix2<f64>, Vector2<f64>) {
        let system = Matrix2::new(0.0, 1.0, 0.0, self.velocity_coefficient());
        let input = Vector2::new(0.0, self.voltage_coefficient());
        (system, input)
    }

    /// Discrete simulator of this mechanism under a constant disturbance
    /// acceleration (e.g. gravity), clamped to the travel limits if any.
    ///
    /// Fails on invalid mechanism parameters before anything is discretized.
    fn simulator(&self, disturbance: f64, time_step: f64) -> SimResult<AffineSystemSim> {
        self.validate()?;
        let (system, input) = self.continuous_system();
        let sim = AffineSystemSim::new(system, input, Vector2::new(0.0, disturbance), time_step)?;
        Ok(match self.travel_limits() {
            Some((min, max)) => sim.with_position_limits(min, max),
            None => sim,
        })
    }
}

//! Linear elevator stage: motors drive a drum through a gearbox and the drum
//! winds a cable that lifts the carriage.

use electrical::Motor;
use log::debug;
use serde::{Deserialize, Serialize};
use simcore::error::{require_positive, SimResult};
use simcore::units::{inches, pounds};

use crate::motor_system::MotorSystem;
use crate::stages::StageTravel;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Elevator {
    /// Gear ratio, output over input (e.g. 5.0 for a 5:1 reduction)
    pub gear_ratio: f64,
    /// Cable drum radius (m)
    pub drum_radius: f64,
    /// Carried mass (kg)
    pub mass: f64,
    /// Current limit (A)
    pub max_current: f64,
    /// Carriage travel from the bottom hard stop (m)
    pub max_travel: f64,
    pub motor: Motor,
}

impl Default for Elevator {
    fn default() -> Self {
        // Two Kraken X60 (FOC) on a 5:1 gearbox, 1.273 in drum, 30 lb carriage
        Elevator {
            gear_ratio: 5.0,
            drum_radius: 0.5 * inches(1.273),
            mass: pounds(30.0),
            max_current: 120.0,
            max_travel: StageTravel::three_stage().total_travel(),
            motor: Motor::kraken_x60_foc() * 2,
        }
    }
}

impl Elevator {
    pub fn new(
        gear_ratio: f64,
        drum_radius: f64,
        mass: f64,
        max_current: f64,
        max_travel: f64,
        motor: Motor,
    ) -> Self {
        Elevator {
            gear_ratio,
            drum_radius,
            mass,
            max_current,
            max_travel,
            motor,
        }
    }

    /// Cable force (N) at carriage `velocity` (m/s) with `voltage` (V) applied.
    ///
    /// Sum of the voltage-driven force and the back-EMF force opposing motion,
    /// i.e. the DC motor torque-speed line seen through the gearbox and drum.
    pub fn force(&self, velocity: f64, voltage: f64) -> f64 {
        let torque = self.motor.torque(self.motor_velocity(velocity), voltage);
        torque * self.gear_ratio / self.drum_radius
    }
}

impl MotorSystem for Elevator {
    fn motor(&self) -> &Motor {
        &self.motor
    }

    fn max_current(&self) -> f64 {
        self.max_current
    }

    fn motor_velocity(&self, velocity: f64) -> f64 {
        velocity * self.gear_ratio / self.drum_radius
    }

    fn acceleration(&self, velocity: f64, voltage: f64) -> f64 {
        self.force(velocity, voltage) / self.mass
    }

    fn velocity_coefficient(&self) -> f64 {
        -(self.gear_ratio * self.gear_ratio * self.motor.torque_constant())
            / (self.motor.resistance()
                * self.drum_radius
                * self.drum_radius
                * self.mass
                * self.motor.velocity_constant())
    }

    fn voltage_coefficient(&self) -> f64 {
        self.gear_ratio * self.motor.torque_constant()
            / (self.motor.resistance() * self.mass * self.drum_radius)
    }

    fn validate(&self) -> SimResult<()> {
        self.motor.validate()?;
        require_positive("gear_ratio", self.gear_ratio)?;
        require_positive("drum_radius", self.drum_radius)?;
        require_positive("mass", self.mass)?;
        require_positive("max_current", self.max_current)?;
        require_positive("max_travel", self.max_travel)?;
        debug!(
            "elevator: G={} r={} m m={} kg, v_max={:.4} m/s, a_max={:.4} m/s^2",
            self.gear_ratio,
            self.drum_radius,
            self.mass,
            self.maximum_velocity(),
            self.maximum_acceleration()
        );
        Ok(())
    }

    fn travel_limits(&self) -> Option<(f64, f64)> {
        Some((0.0, self.max_travel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use simcore::error::SimError;
    use simcore::units::STANDARD_GRAVITY;
    use simcore::PositionVelocityState;

    #[test]
    fn test_coefficients_match_force_model() {
        let elevator = Elevator::default();
        let (v, u) = (0.7, 5.0);
        let linear = elevator.velocity_coefficient() * v + elevator.voltage_coefficient() * u;
        assert_relative_eq!(elevator.acceleration(v, u), linear, max_relative = 1e-12);
        assert!(elevator.velocity_coefficient() < 0.0);
        assert!(elevator.voltage_coefficient() > 0.0);
    }

    #[test]
    fn test_motor_velocity_through_drum() {
        let elevator = Elevator::default();
        let omega = elevator.motor_velocity(1.0);
        assert_relative_eq!(omega, 5.0 / elevator.drum_radius, max_relative = 1e-12);
    }

    #[test]
    fn test_stall_current_exceeds_limit_so_limiter_engages() {
        let elevator = Elevator::default();
        // Two motors stalled at 12 V draw their combined stall current
        assert_relative_eq!(elevator.current(0.0, 12.0), 966.0, max_relative = 1e-9);
        assert!(elevator.current(0.0, 12.0) > elevator.max_current);

        let limited = elevator.limit_voltage(0.0, 12.0);
        assert!(limited < 12.0);
        assert_relative_eq!(elevator.current(0.0, limited), 120.0, max_relative = 1e-9);
    }

    #[test]
    fn test_limit_saturates_before_current_check() {
        let elevator = Elevator::default();
        let v = elevator.maximum_velocity();
        // At free speed 12 V draws little current, so only saturation applies
        assert_relative_eq!(elevator.limit_voltage(v, 30.0), 12.0);
        assert_relative_eq!(elevator.limit_voltage(v, -30.0), -12.0);
        assert_relative_eq!(elevator.limit_voltage(v, 3.0), 3.0);
    }

    #[test]
    fn test_maximum_velocity_is_free_running_speed() {
        let elevator = Elevator::default();
        let v_max = elevator.maximum_velocity();
        assert_relative_eq!(elevator.acceleration(v_max, 12.0), 0.0, epsilon = 1e-9);
        // Free speed of the motor seen through gearbox and drum, minus the free-current loss
        let geared = elevator.motor.free_speed * elevator.drum_radius / elevator.gear_ratio;
        assert!(v_max > 0.99 * geared && v_max < 1.01 * geared);
    }

    #[test]
    fn test_maximum_acceleration_is_current_limited() {
        let elevator = Elevator::default();
        let expected = elevator.gear_ratio * elevator.motor.torque_constant() * elevator.max_current
            / (elevator.drum_radius * elevator.mass);
        assert_relative_eq!(elevator.maximum_acceleration(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_opposing_voltage_cancels_gravity() {
        let elevator = Elevator::default();
        let hold = elevator.opposing_voltage(STANDARD_GRAVITY);
        assert!(hold > 0.0);
        assert_relative_eq!(
            elevator.acceleration(0.0, hold) + STANDARD_GRAVITY,
            0.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_simulator_holds_against_gravity() {
        let elevator = Elevator::default();
        let mut sim = elevator
            .simulator(STANDARD_GRAVITY, 0.001)
            .unwrap()
            .with_state(PositionVelocityState::at_rest(1.0));
        assert_relative_eq!(
            sim.opposing_voltage(),
            elevator.opposing_voltage(STANDARD_GRAVITY),
            max_relative = 1e-12
        );

        let hold = sim.opposing_voltage();
        for _ in 0..1000 {
            sim.update(hold);
        }
        assert!(sim.velocity().abs() < 1e-9);
        assert_relative_eq!(sim.position(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_simulator_respects_travel() {
        let elevator = Elevator::default();
        let mut sim = elevator.simulator(STANDARD_GRAVITY, 0.005).unwrap();
        assert_eq!(sim.position_limits(), (0.0, elevator.max_travel));
        for _ in 0..2000 {
            sim.update(elevator.limit_voltage(sim.velocity(), 12.0));
        }
        assert_eq!(sim.position(), elevator.max_travel);
    }

    #[test]
    fn test_validate_rejects_zero_radius() {
        let mut elevator = Elevator::default();
        assert!(elevator.validate().is_ok());
        elevator.drum_radius = 0.0;
        assert!(elevator.validate().is_err());
    }

    #[test]
    fn test_simulator_rejects_invalid_mechanism() {
        let mut elevator = Elevator::default();
        elevator.motor.nominal_voltage = -12.0;
        let result = elevator.simulator(STANDARD_GRAVITY, 0.001);
        assert!(
            matches!(
                result,
                Err(SimError::InvalidParameter {
                    what: "nominal_voltage",
                    ..
                })
            ),
            "{result:?}"
        );

        let elevator = Elevator {
            drum_radius: 0.0,
            ..Elevator::default()
        };
        assert!(matches!(
            elevator.simulator(STANDARD_GRAVITY, 0.001),
            Err(SimError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_config_round_trip_keeps_motor() {
        let elevator = Elevator::default();
        let value = serde_json::to_value(elevator).unwrap();
        let back: Elevator = serde_json::from_value(value).unwrap();
        assert_eq!(back, elevator);
    }

    proptest! {
        #[test]
        fn test_current_limit_never_exceeded(
            velocity_fraction in -1.0_f64..1.0,
            voltage in -24.0_f64..24.0,
        ) {
            let elevator = Elevator::default();
            let velocity = velocity_fraction * elevator.maximum_velocity();
            let limited = elevator.limit_voltage(velocity, voltage);
            prop_assert!(elevator.current(velocity, limited) <= elevator.max_current + 1e-9);
            prop_assert!(limited.abs() <= elevator.motor.nominal_voltage + 1e-12);
        }
    }
}

//! Boundary conversions between customary units and the SI base units used internally.
//!
//! Everything inside the simulation is a plain `f64` in meters, seconds, volts,
//! amperes, kilograms and radians. These helpers exist for configuration and
//! telemetry code that speaks inches, pounds or rpm.

use uom::si::angular_velocity::{radian_per_second, revolution_per_minute};
use uom::si::f64::{AngularVelocity, Length, Mass, Time, Velocity};
use uom::si::length::{centimeter, inch, meter};
use uom::si::mass::{kilogram, pound};
use uom::si::time::{millisecond, second};
use uom::si::velocity::{centimeter_per_second, meter_per_second};

/// Standard gravity (m/s²), pointing down along the elevator axis.
pub const STANDARD_GRAVITY: f64 = -9.81;

pub fn inches(value: f64) -> f64 {
    Length::new::<inch>(value).get::<meter>()
}

pub fn centimeters(value: f64) -> f64 {
    Length::new::<centimeter>(value).get::<meter>()
}

pub fn meters_to_inches(value: f64) -> f64 {
    Length::new::<meter>(value).get::<inch>()
}

pub fn pounds(value: f64) -> f64 {
    Mass::new::<pound>(value).get::<kilogram>()
}

/// Revolutions per minute to rad/s.
pub fn rpm(value: f64) -> f64 {
    AngularVelocity::new::<revolution_per_minute>(value).get::<radian_per_second>()
}

pub fn to_rpm(radians_per_second: f64) -> f64 {
    AngularVelocity::new::<radian_per_second>(radians_per_second).get::<revolution_per_minute>()
}

pub fn milliseconds(value: f64) -> f64 {
    Time::new::<millisecond>(value).get::<second>()
}

pub fn centimeters_per_second(value: f64) -> f64 {
    Velocity::new::<centimeter_per_second>(value).get::<meter_per_second>()
}

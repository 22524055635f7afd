//! Closed-loop control of a single-axis actuator
//!
//! This crate provides:
//! - A trapezoidal motion profile generator
//! - A fixed state-feedback gain row
//! - A closed-loop controller with disturbance feedforward and current limiting
//! - A periodic goal schedule and per-tick telemetry

pub mod closed_loop;
pub mod feedback;
pub mod setpoint;
pub mod telemetry;
pub mod trajectory;

pub use closed_loop::*;
pub use feedback::*;
pub use setpoint::*;
pub use telemetry::*;
pub use trajectory::*;

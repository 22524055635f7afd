//! Core types shared by every part of the actuator simulation:
//! state/input vectors, the model traits, linear-system discretization and
//! the affine discrete-time simulator.

pub mod affine;
pub mod error;
pub mod linear;
pub mod state;
pub mod traits;
pub mod units;

pub use affine::AffineSystemSim;
pub use error::{SimError, SimResult};
pub use linear::{discrete_constant, discretize, pseudo_inverse};
pub use state::{PositionVelocityState, Tolerance, VoltageInput};
pub use traits::*;

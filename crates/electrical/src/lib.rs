//! Electrical models: DC motor datasheet curves and their derived constants.

pub mod motor;

pub use motor::Motor;

pub mod arm;
pub mod elevator;
pub mod motor_system;
pub mod stages;

pub use arm::Arm;
pub use elevator::Elevator;
pub use motor_system::MotorSystem;
pub use stages::{Stage, StageTravel};

pub mod motor_registry;

pub use motor_registry::{ClientSummary, MotorRegistry, MotorSummary};

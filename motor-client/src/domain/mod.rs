pub mod measurement;
pub mod motor;

pub use measurement::{Field, MeasurementRow, MeasurementTable};
pub use motor::{MotorRecord, Ratings};

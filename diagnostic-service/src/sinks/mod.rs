pub mod measurement_table;

pub use measurement_table::MeasurementTableSink;

pub mod measurement_csv;

pub use measurement_csv::MeasurementCsvSource;

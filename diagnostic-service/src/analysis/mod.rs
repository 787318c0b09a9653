//! Diagnostic engine: turns one measurement table and the motor's nameplate
//! ratings into the text sections of a report.
//!
//! Each analyzer is a pure function over a borrowed table. Only the voltage
//! step (with the timestamp requirement) can sink the whole bundle; every
//! other analyzer degrades inside its own section.

pub mod accessories;
pub mod bundle;
pub mod current;
pub mod operation;
pub mod power_factor;
pub mod stats;
pub mod voltage;

use std::time::Instant;

use motor_client::domain::{Field, MeasurementTable, Ratings};

pub use bundle::{DiagnosticBundle, Section, GENERIC_ERROR};

/// A phase is carrying load when its current exceeds this many amperes.
pub const OPERATING_CURRENT_FLOOR: f64 = 1.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("voltage columns (AVRMS, BVRMS, CVRMS) not found in the measurement data")]
    MissingVoltageColumns,
    #[error("no voltage samples in the measurement data")]
    NoVoltageSamples,
    #[error("timestamp column (Time) not found in the measurement data")]
    MissingTimestamp,
}

const CONFORMANT_VERDICT: &str = "General diagnosis: CONFORMANT.\nThe data indicate that the system \
operated stably and within the established power quality parameters.";

fn final_conclusion(alerts: &[String]) -> String {
    if alerts.is_empty() {
        return CONFORMANT_VERDICT.to_string();
    }
    format!(
        "General diagnosis: NON-CONFORMANT.\nThe system showed instabilities. Main non-conformities:\n\n- {}",
        alerts.join("\n- ")
    )
}

/// Runs every analyzer, failing only on the load-bearing voltage step.
pub fn try_analyze(table: &MeasurementTable, ratings: &Ratings) -> Result<DiagnosticBundle, AnalysisError> {
    let nominal_voltage = ratings.valid_voltage();
    let mut alerts: Vec<String> = Vec::new();
    let mut bundle = DiagnosticBundle::new();
    bundle.insert(Section::NominalVoltage, bundle::echo_nominal_voltage(ratings.nominal_voltage));

    let voltage = voltage::analyze_voltage(table, nominal_voltage)?;
    if !table.has_column(Field::Timestamp) {
        return Err(AnalysisError::MissingTimestamp);
    }
    alerts.extend(voltage.alert);
    bundle.insert(Section::Voltage, voltage.text);

    bundle.insert(Section::Current, current::analyze_current(table, ratings.valid_current()));
    bundle.insert(Section::PowerFactor, power_factor::analyze_power_factor(table));
    bundle.insert(Section::Accessories, accessories::analyze_accessories(table));
    bundle.insert(Section::OperatingTime, operation::analyze_operation(table, nominal_voltage));
    bundle.insert(Section::FinalConclusion, final_conclusion(&alerts));

    Ok(bundle)
}

/// Always returns a bundle; a load-bearing failure yields `DiagnosticBundle::degraded`.
pub fn analyze(table: &MeasurementTable, ratings: &Ratings) -> DiagnosticBundle {
    let started = Instant::now();
    metrics::counter!("diagnostic_reports_total").increment(1);

    let bundle = match try_analyze(table, ratings) {
        Ok(bundle) => bundle,
        Err(e) => {
            tracing::error!(error = %e, rows = table.len(), "diagnostic analysis failed, returning degraded bundle");
            metrics::counter!("diagnostic_bundle_degraded_total").increment(1);
            DiagnosticBundle::degraded(ratings.nominal_voltage)
        }
    };

    metrics::histogram!("diagnostic_analysis_seconds").record(started.elapsed().as_secs_f64());
    bundle
}

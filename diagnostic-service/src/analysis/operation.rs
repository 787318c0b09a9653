//! Hour counts for downtime, supply outage and suspected phase loss.
//!
//! Each row stands for one hour of coverage, whatever the actual spacing of
//! the timestamps.

use motor_client::domain::{Field, MeasurementTable};

use super::stats;

const DOWNTIME_PF_BELOW: f64 = 0.3;
/// Absolute floor in volts; not relative to the nominal voltage.
const OUTAGE_VOLTAGE_BELOW: f64 = 30.0;
const PHASE_NORMAL_FRACTION: f64 = 0.80;
const PHASE_LOW_FRACTION: f64 = 0.50;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("nominal voltage not provided or invalid")]
    InvalidNominalVoltage,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatingTime {
    pub downtime_hours: usize,
    pub outage_hours: usize,
    pub phase_loss_hours: usize,
}

pub fn operating_time(
    table: &MeasurementTable,
    nominal_voltage: Option<f64>,
) -> Result<OperatingTime, OperationError> {
    let mut out = OperatingTime::default();

    let pf_phases = table.present(&Field::POWER_FACTORS);
    if !pf_phases.is_empty() {
        out.downtime_hours = table
            .rows()
            .iter()
            .filter(|r| stats::mean(stats::present_values(r, &pf_phases)).is_some_and(|pf| pf < DOWNTIME_PF_BELOW))
            .count();
    }

    if table.has_all(&Field::VOLTAGES) {
        let nominal = nominal_voltage.ok_or(OperationError::InvalidNominalVoltage)?;
        let normal = nominal * PHASE_NORMAL_FRACTION;
        let low = nominal * PHASE_LOW_FRACTION;

        for row in table.rows() {
            let phases: Vec<Option<f64>> = Field::VOLTAGES.iter().map(|f| row.get(*f)).collect();
            if phases.iter().all(|v| v.is_some_and(|v| v < OUTAGE_VOLTAGE_BELOW)) {
                out.outage_hours += 1;
            }

            let powered = stats::count_where(row, &Field::VOLTAGES, |v| v >= OUTAGE_VOLTAGE_BELOW) > 0;
            if powered
                && stats::count_where(row, &Field::VOLTAGES, |v| v > normal) >= 2
                && stats::count_where(row, &Field::VOLTAGES, |v| v < low) >= 1
            {
                out.phase_loss_hours += 1;
            }
        }
    }

    Ok(out)
}

pub fn analyze_operation(table: &MeasurementTable, nominal_voltage: Option<f64>) -> String {
    match operating_time(table, nominal_voltage) {
        Ok(t) => format!(
            "- Total time with the motor off (PF < 0.3): {} hours.\n\n\
             - Total time without power (voltages < 30 V): {} hours.\n\n\
             - Total time with suspected phase loss: {} hours.",
            t.downtime_hours, t.outage_hours, t.phase_loss_hours
        ),
        Err(e) => {
            tracing::warn!(error = %e, "operating time analysis failed");
            format!("An error occurred while processing the operating data: {e}")
        }
    }
}

//! Motor current diagnostics: loading, peaks, imbalance, start cycling and
//! open-phase detection against the nameplate current.

use std::fmt;

use motor_client::domain::{Field, MeasurementRow, MeasurementTable};

use super::{stats, OPERATING_CURRENT_FLOOR};

const PEAK_FACTOR: f64 = 4.0;
const LIGHT_LOAD_FACTOR: f64 = 0.4;
/// Readings below this fraction of nominal are treated as an open phase
/// in the imbalance computation.
const IMBALANCE_ZERO_FRACTION: f64 = 0.5;
const IMBALANCE_LIMIT_PCT: f64 = 10.0;
const MAX_STARTS: usize = 90;
const OPEN_PHASE_NORMAL_FRACTION: f64 = 0.5;

pub const CONFORMANT: &str = "The current analysis indicated CONFORMANT operation, with no significant \
anomalies relative to the nominal current or the monitored fault patterns.";

const FINDINGS_HEADER: &str = "The following points of attention were found in the current analysis:";

/// Reasons the current analysis cannot produce findings.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CurrentUnavailable {
    #[error("Nominal current not provided or invalid. The current analysis could not be performed.")]
    InvalidRating,
    #[error("The current analysis requires all three phase columns (AIRMS, BIRMS, CIRMS).")]
    MissingColumns,
    #[error("No motor operation records (current > 1 A) were found to analyze.")]
    NoOperation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CurrentFinding {
    Overload { mean: f64, nominal: f64 },
    ExtremePeak { peak: f64 },
    LightLoad { mean: f64 },
    Imbalance { max_pct: f64 },
    ExcessiveStarts { starts: usize },
    OpenPhase { hours: usize },
}

impl fmt::Display for CurrentFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentFinding::Overload { mean, nominal } => write!(
                f,
                "- Overload: the mean operating current ({mean:.1} A) exceeded the nominal current \
                 ({nominal:.1} A), indicating possible mechanical overload on the shaft or drive problems."
            ),
            CurrentFinding::ExtremePeak { peak } => write!(
                f,
                "- Extreme current peak: a peak of {peak:.1} A was recorded, a value that may indicate \
                 a locked rotor or a short circuit."
            ),
            CurrentFinding::LightLoad { mean } => write!(
                f,
                "- No-load operation: the mean operating current ({mean:.1} A) is below 40% of nominal, \
                 suggesting the motor may run for long periods without load, which is energy inefficient."
            ),
            CurrentFinding::Imbalance { max_pct } => write!(
                f,
                "- Current imbalance: a maximum imbalance of {max_pct:.1}% between phases was detected."
            ),
            CurrentFinding::ExcessiveStarts { starts } => write!(
                f,
                "- High duty cycle: the motor had {starts} starts during the period, which may indicate \
                 undersizing or control system faults."
            ),
            CurrentFinding::OpenPhase { hours } => write!(
                f,
                "- Suspected open phase: in {hours} hour(s) one phase carried near-zero current while \
                 the others operated normally, a strong indication of a severe electrical fault."
            ),
        }
    }
}

fn is_operating(row: &MeasurementRow) -> bool {
    stats::count_where(row, &Field::CURRENTS, |v| v > OPERATING_CURRENT_FLOOR) > 0
}

/// Largest per-row imbalance, as a percentage of the row mean.
///
/// First pass: readings below half the nominal current become zero and rows
/// left with nothing are dropped. Second pass: the worst deviation from the
/// row mean, over that mean. Rows with a zero mean are undefined and skipped.
pub fn max_imbalance_pct(rows: &[&MeasurementRow], nominal: f64) -> Option<f64> {
    let floor = nominal * IMBALANCE_ZERO_FRACTION;

    let clamped: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            stats::present_values(row, &Field::CURRENTS)
                .map(|v| if v < floor { 0.0 } else { v })
                .collect::<Vec<_>>()
        })
        .filter(|phases| phases.iter().sum::<f64>() > 0.0)
        .collect();

    stats::max(clamped.iter().filter_map(|phases| {
        let mean = stats::mean(phases.iter().copied())?;
        if mean == 0.0 {
            return None;
        }
        let deviation = stats::max(phases.iter().map(|v| (v - mean).abs()))?;
        Some(deviation / mean * 100.0)
    }))
}

/// Rising edges of phase A across consecutive rows of the whole table.
pub fn count_starts(table: &MeasurementTable) -> usize {
    table
        .rows()
        .windows(2)
        .filter(|pair| {
            matches!(
                (pair[0].get(Field::CurrentA), pair[1].get(Field::CurrentA)),
                (Some(prev), Some(cur)) if prev <= OPERATING_CURRENT_FLOOR && cur > OPERATING_CURRENT_FLOOR
            )
        })
        .count()
}

/// Operating rows where one phase is dead while exactly two carry real load.
pub fn count_open_phase_rows(rows: &[&MeasurementRow], nominal: f64) -> usize {
    let normal = nominal * OPEN_PHASE_NORMAL_FRACTION;
    rows.iter()
        .filter(|row| {
            let low = stats::count_where(row, &Field::CURRENTS, |v| v < OPERATING_CURRENT_FLOOR);
            let loaded = stats::count_where(row, &Field::CURRENTS, |v| v > normal);
            low >= 1 && loaded == 2
        })
        .count()
}

/// All current findings, in reporting order.
pub fn current_findings(
    table: &MeasurementTable,
    nominal_current: Option<f64>,
) -> Result<Vec<CurrentFinding>, CurrentUnavailable> {
    let nominal = nominal_current.ok_or(CurrentUnavailable::InvalidRating)?;
    if !table.has_all(&Field::CURRENTS) {
        return Err(CurrentUnavailable::MissingColumns);
    }

    let operating: Vec<&MeasurementRow> = table.rows().iter().filter(|r| is_operating(r)).collect();
    if operating.is_empty() {
        return Err(CurrentUnavailable::NoOperation);
    }

    let mut findings = Vec::new();

    if let Some(mean) = stats::mean_of_phase_means(&operating, &Field::CURRENTS) {
        if mean > nominal {
            findings.push(CurrentFinding::Overload { mean, nominal });
        }
    }

    if let Some(peak) = stats::max_over(&operating, &Field::CURRENTS) {
        if peak > nominal * PEAK_FACTOR {
            findings.push(CurrentFinding::ExtremePeak { peak });
        }
    }

    if let Some(mean) = stats::mean_of_phase_means(&operating, &Field::CURRENTS) {
        if mean < nominal * LIGHT_LOAD_FACTOR {
            findings.push(CurrentFinding::LightLoad { mean });
        }
    }

    if let Some(max_pct) = max_imbalance_pct(&operating, nominal) {
        if max_pct > IMBALANCE_LIMIT_PCT {
            findings.push(CurrentFinding::Imbalance { max_pct });
        }
    }

    let starts = count_starts(table);
    if starts > MAX_STARTS {
        findings.push(CurrentFinding::ExcessiveStarts { starts });
    }

    let hours = count_open_phase_rows(&operating, nominal);
    if hours > 0 {
        findings.push(CurrentFinding::OpenPhase { hours });
    }

    tracing::debug!(
        operating_rows = operating.len(),
        starts,
        findings = findings.len(),
        "current analysis complete"
    );
    Ok(findings)
}

pub fn analyze_current(table: &MeasurementTable, nominal_current: Option<f64>) -> String {
    match current_findings(table, nominal_current) {
        Ok(findings) if findings.is_empty() => CONFORMANT.to_string(),
        Ok(findings) => {
            let body: Vec<String> = findings.iter().map(ToString::to_string).collect();
            format!("{FINDINGS_HEADER}\n\n{}", body.join("\n\n"))
        }
        Err(reason) => reason.to_string(),
    }
}

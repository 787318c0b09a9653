//! Supply voltage conformance against the nominal rating.
//!
//! Two tolerance bands are derived from the nominal voltage. Only the outer
//! (critical) band raises an alert; the adequate band is reported in the
//! limits but does not change the outcome.

use motor_client::domain::{Field, MeasurementTable};

use super::{stats, AnalysisError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageLimits {
    pub adequate_upper: f64,
    pub adequate_lower: f64,
    pub critical_upper: f64,
    pub critical_lower: f64,
}

impl VoltageLimits {
    pub fn for_nominal(nominal: f64) -> Self {
        Self {
            adequate_upper: nominal * 1.05,
            adequate_lower: nominal * 0.92,
            critical_upper: nominal * 1.06,
            critical_lower: nominal * 0.91,
        }
    }

    pub fn is_critical(&self, summary: &VoltageSummary) -> bool {
        summary.max > self.critical_upper || summary.min < self.critical_lower
    }
}

/// Global statistics over all three phases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageSummary {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoltageFinding {
    pub text: String,
    /// Set when the critical band was crossed; feeds the final verdict.
    pub alert: Option<String>,
}

pub fn summarize(table: &MeasurementTable) -> Result<VoltageSummary, AnalysisError> {
    if !table.has_all(&Field::VOLTAGES) {
        return Err(AnalysisError::MissingVoltageColumns);
    }

    let rows: Vec<_> = table.rows().iter().collect();
    let (Some(min), Some(mean), Some(max)) = (
        stats::min_over(&rows, &Field::VOLTAGES),
        stats::mean_of_phase_means(&rows, &Field::VOLTAGES),
        stats::max_over(&rows, &Field::VOLTAGES),
    ) else {
        return Err(AnalysisError::NoVoltageSamples);
    };

    Ok(VoltageSummary { min, mean, max })
}

/// Voltage section text plus the critical alert, if any.
///
/// Missing voltage columns or samples are an error for the whole report; an
/// unusable nominal voltage only degrades this section.
pub fn analyze_voltage(
    table: &MeasurementTable,
    nominal_voltage: Option<f64>,
) -> Result<VoltageFinding, AnalysisError> {
    let summary = summarize(table)?;

    let Some(nominal) = nominal_voltage else {
        return Ok(VoltageFinding {
            text: format!(
                "Nominal voltage not provided or invalid. Conformance could not be assessed. \
                 Recorded values: min {:.1} V, mean {:.1} V, max {:.1} V.",
                summary.min, summary.mean, summary.max
            ),
            alert: None,
        });
    };

    let limits = VoltageLimits::for_nominal(nominal);
    let mut paragraphs = vec![format!(
        "Analysis based on a nominal reference voltage of {nominal:.0} V. \
         Recorded values: min {:.1} V, mean {:.1} V, max {:.1} V.",
        summary.min, summary.mean, summary.max
    )];

    let alert = limits.is_critical(&summary).then(|| {
        format!("CRITICAL voltage levels were reached (peak of {:.1} V)", summary.max)
    });
    if let Some(alert) = &alert {
        tracing::warn!(
            min = summary.min,
            max = summary.max,
            critical_lower = limits.critical_lower,
            critical_upper = limits.critical_upper,
            "voltage outside critical band"
        );
        paragraphs.push(format!(
            "ALERT: {alert}. Violations of this kind may indicate serious problems in the supply network."
        ));
    }

    Ok(VoltageFinding {
        text: paragraphs.join("\n\n"),
        alert,
    })
}

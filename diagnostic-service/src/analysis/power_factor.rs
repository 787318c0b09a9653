use motor_client::domain::{Field, MeasurementRow, MeasurementTable};

use super::{stats, OPERATING_CURRENT_FLOOR};

/// Readings below this are sensor noise while running and are ignored.
const NOISE_FLOOR: f64 = 0.6;
const CRITICAL_BELOW: f64 = 0.91;
const IDEAL_FROM: f64 = 0.95;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PowerFactorUnavailable {
    #[error("Insufficient power factor or current data for a complete analysis.")]
    InsufficientData,
    #[error("No motor operation records (current > 1 A) were found to analyze the power factor.")]
    NoOperation,
    #[error("The mean power factor could not be computed (operating values may all be below 0.6).")]
    AllBelowFloor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerFactorBand {
    Critical,
    Attention,
    Ideal,
}

impl PowerFactorBand {
    pub fn classify(mean: f64) -> Self {
        if mean < CRITICAL_BELOW {
            PowerFactorBand::Critical
        } else if mean < IDEAL_FROM {
            PowerFactorBand::Attention
        } else {
            PowerFactorBand::Ideal
        }
    }

    fn verdict(self) -> &'static str {
        match self {
            PowerFactorBand::Critical => {
                "Diagnosis: CRITICAL.\n\nAnalysis:\nThe mean power factor was below 0.91, indicating \
                 inefficient use of electrical energy.\n\nRecommendation:\nEvaluating the installation \
                 of capacitor banks is recommended."
            }
            PowerFactorBand::Attention => {
                "Diagnosis: ATTENTION.\n\nAnalysis:\nThe mean power factor was close to the minimum \
                 acceptable value (0.92).\n\nRecommendation:\nInspect the periods with the lowest power \
                 factor and consider preventive maintenance."
            }
            PowerFactorBand::Ideal => {
                "Diagnosis: IDEAL.\n\nAnalysis:\nThe mean power factor was above 0.95, showing excellent \
                 energy efficiency.\n\nRecommendation:\nContinued monitoring is suggested; no corrective \
                 action is needed."
            }
        }
    }
}

/// Mean power factor while running (phase-A current above the floor),
/// ignoring readings under the noise floor.
pub fn mean_operating_power_factor(table: &MeasurementTable) -> Result<f64, PowerFactorUnavailable> {
    let phases = table.present(&Field::POWER_FACTORS);
    if phases.is_empty() || !table.has_column(Field::CurrentA) {
        return Err(PowerFactorUnavailable::InsufficientData);
    }

    let operating: Vec<&MeasurementRow> = table
        .rows()
        .iter()
        .filter(|r| r.get(Field::CurrentA).is_some_and(|i| i > OPERATING_CURRENT_FLOOR))
        .collect();
    if operating.is_empty() {
        return Err(PowerFactorUnavailable::NoOperation);
    }

    let phase_means = phases.iter().filter_map(|phase| {
        stats::mean(
            operating
                .iter()
                .filter_map(|r| r.get(*phase))
                .filter(|pf| *pf >= NOISE_FLOOR),
        )
    });
    stats::mean(phase_means).ok_or(PowerFactorUnavailable::AllBelowFloor)
}

pub fn analyze_power_factor(table: &MeasurementTable) -> String {
    match mean_operating_power_factor(table) {
        Ok(mean) => format!(
            "The mean power factor recorded during operation (discarding values < 0.6) was {mean:.3}.\n\n{}",
            PowerFactorBand::classify(mean).verdict()
        ),
        Err(reason) => reason.to_string(),
    }
}

use crate::pipeline::{Envelope, PipelineError, Transform};
use motor_client::domain::MeasurementRow;

/// Pure validation of a `MeasurementRow`: non-finite readings (NaN, inf)
/// become missing readings. Parsed timestamps are kept as-is, however old.
pub fn validate_measurement_row(
    mut env: Envelope<MeasurementRow>,
) -> Result<Envelope<MeasurementRow>, PipelineError> {
    let mut cleared = 0u64;
    for value in env.payload.values.values_mut() {
        if value.is_some_and(|v| !v.is_finite()) {
            *value = None;
            cleared += 1;
        }
    }
    if cleared > 0 {
        metrics::counter!("validation_measurement_cleared_total").increment(cleared);
    }

    Ok(env)
}

#[derive(Clone, Default)]
pub struct MeasurementRowValidation;

#[async_trait::async_trait]
impl Transform<MeasurementRow, MeasurementRow> for MeasurementRowValidation {
    async fn apply(
        &self,
        input: Envelope<MeasurementRow>,
    ) -> Result<Envelope<MeasurementRow>, PipelineError> {
        validate_measurement_row(input)
    }
}

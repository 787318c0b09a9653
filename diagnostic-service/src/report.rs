use std::sync::Arc;

use motor_client::domain::{MeasurementRow, MeasurementTable, Ratings};

use crate::{
    analysis::{self, DiagnosticBundle},
    pipeline::{Pipeline, PipelineError},
    sinks::MeasurementTableSink,
    sources::MeasurementCsvSource,
    transform,
};

/// Reads, validates and sorts one measurement export into a table.
pub async fn load_table(source: MeasurementCsvSource) -> Result<MeasurementTable, PipelineError> {
    let pipeline: Pipeline<_, MeasurementRow, _> = Pipeline {
        source,
        transforms: vec![Arc::new(transform::MeasurementRowValidation)],
        sink: MeasurementTableSink,
    };

    pipeline.run().await
}

/// Full report run: ingestion followed by the diagnostic engine.
///
/// Only an unreadable input is an error; analysis problems end up inside the bundle.
pub async fn diagnose(source: MeasurementCsvSource, ratings: Ratings) -> Result<DiagnosticBundle, PipelineError> {
    let table = load_table(source).await?;
    let bundle = analysis::analyze(&table, &ratings);
    tracing::info!(
        rows = table.len(),
        degraded = bundle.is_degraded(),
        fingerprint = %bundle.fingerprint(),
        "diagnostic bundle ready"
    );
    Ok(bundle)
}

use futures::StreamExt;
use motor_client::domain::{MeasurementRow, MeasurementTable};

use crate::pipeline::{Envelope, PipelineError, Sink};

/// Collects every surviving row into one time-ordered `MeasurementTable`.
///
/// Per-row errors (unparseable timestamps, rejected rows) are logged and
/// skipped. A source error means the input itself is unreadable and ends the run.
#[derive(Debug, Default)]
pub struct MeasurementTableSink;

#[async_trait::async_trait]
impl Sink<MeasurementRow> for MeasurementTableSink {
    type Output = MeasurementTable;

    async fn run<S>(&self, mut input: S) -> Result<MeasurementTable, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<MeasurementRow>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut rows = Vec::new();
        let mut skipped: u64 = 0;

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => rows.push(env.payload),
                Err(e @ PipelineError::Source(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "dropping measurement row");
                    skipped += 1;
                }
            }
        }

        let table = MeasurementTable::from_rows(rows);
        tracing::info!(rows = table.len(), skipped, columns = table.columns().len(), "measurement table assembled");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_client::domain::Field;
    use time::macros::datetime;

    #[tokio::test]
    async fn sink_sorts_rows_and_skips_errors() {
        let items = vec![
            Ok(Envelope::new(
                MeasurementRow::new(Some(datetime!(2024-01-01 01:00:00 UTC))).with(Field::VoltageA, 2.0),
            )),
            Err(PipelineError::Record("invalid timestamp 'x'".to_string())),
            Err(PipelineError::Transform("timestamp out of allowed range".to_string())),
            Ok(Envelope::new(
                MeasurementRow::new(Some(datetime!(2024-01-01 00:00:00 UTC))).with(Field::VoltageA, 1.0),
            )),
        ];

        let table = MeasurementTableSink
            .run(futures::stream::iter(items))
            .await
            .expect("sink succeeds");

        assert_eq!(table.len(), 2);
        assert_eq!(table.series(Field::VoltageA).collect::<Vec<_>>(), vec![Some(1.0), Some(2.0)]);
    }

    #[tokio::test]
    async fn sink_fails_on_source_error() {
        let items: Vec<Result<Envelope<MeasurementRow>, PipelineError>> =
            vec![Err(PipelineError::Source("failed to open".to_string()))];

        let res = MeasurementTableSink.run(futures::stream::iter(items)).await;
        assert!(matches!(res, Err(PipelineError::Source(_))));
    }
}

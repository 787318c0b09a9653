use std::{fs::File, io::Read, path::PathBuf, sync::Arc};

use csv::StringRecord;
use futures::Stream;
use motor_client::domain::{Field, MeasurementRow};
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    OffsetDateTime, PrimitiveDateTime,
};

use crate::pipeline::{Envelope, PipelineError, Source};

const NAIVE_FORMATS: &[&[FormatItem<'static>]] = &[
    format_description!("[day]/[month]/[year] [hour]:[minute]:[second]"),
    format_description!("[day]/[month]/[year] [hour]:[minute]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];

enum Input {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// Delimited measurement export from the field logger.
///
/// Columns are resolved by header name (see `Field::column_name`); headers
/// that are not recognised are ignored. The `Time` column, when present, is
/// parsed day-first and naive values are taken as UTC.
pub struct MeasurementCsvSource {
    input: Input,
    delimiter: u8,
}

impl MeasurementCsvSource {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            input: Input::Path(path.into()),
            delimiter: b';',
        }
    }

    pub fn from_bytes<B: Into<Arc<[u8]>>>(bytes: B) -> Self {
        Self {
            input: Input::Bytes(bytes.into()),
            delimiter: b';',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, PipelineError> {
        match &self.input {
            Input::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    PipelineError::Source(format!("failed to open measurement file {}: {e}", path.display()))
                })?;
                Ok(Box::new(file))
            }
            Input::Bytes(bytes) => Ok(Box::new(std::io::Cursor::new(bytes.clone()))),
        }
    }
}

pub fn parse_timestamp(s: &str) -> Option<OffsetDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| PrimitiveDateTime::parse(s, fmt).ok())
        .map(PrimitiveDateTime::assume_utc)
}

/// Numeric cell; accepts a decimal comma. Empty or unreadable cells are missing.
fn parse_optional_f64(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        trimmed.replace(',', ".").parse().ok()
    }
}

fn resolve_columns(headers: &StringRecord) -> Vec<(usize, Field)> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(idx, h)| Field::from_column_name(h).map(|f| (idx, f)))
        .collect()
}

fn record_to_row(record: &StringRecord, columns: &[(usize, Field)]) -> Result<MeasurementRow, PipelineError> {
    let mut row = MeasurementRow::default();

    for &(idx, field) in columns {
        let cell = record.get(idx).unwrap_or("");
        if field == Field::Timestamp {
            let ts = parse_timestamp(cell)
                .ok_or_else(|| PipelineError::Record(format!("invalid timestamp '{cell}'")))?;
            row.timestamp = Some(ts);
        } else {
            row.values.insert(field, parse_optional_f64(cell));
        }
    }

    Ok(row)
}

#[async_trait::async_trait]
impl Source<MeasurementRow> for MeasurementCsvSource {
    async fn stream(
        &self,
    ) -> std::pin::Pin<Box<dyn Stream<Item = Result<Envelope<MeasurementRow>, PipelineError>> + Send>> {
        // Blocking CSV reader inside a single async task; exports are one report's worth of rows.
        let reader = self.open();
        let delimiter = self.delimiter;
        let s = async_stream::stream! {
            let reader = match reader {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let mut rdr = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_reader(reader);
            let headers = match rdr.headers() {
                Ok(h) => h.clone(),
                Err(e) => {
                    yield Err(PipelineError::Source(format!("failed to read measurement headers: {e}")));
                    return;
                }
            };
            let columns = resolve_columns(&headers);
            tracing::debug!(
                recognised = columns.len(),
                total = headers.len(),
                "measurement columns resolved"
            );

            for result in rdr.records() {
                let record = match result {
                    Ok(r) => r,
                    Err(e) => {
                        yield Err(PipelineError::Source(format!("failed to read measurement record: {e}")));
                        return;
                    }
                };

                // A bad row is reported and skipped; the stream keeps going.
                match record_to_row(&record, &columns) {
                    Ok(row) => {
                        yield Ok(Envelope::new(row));
                    }
                    Err(e) => {
                        metrics::counter!("measurement_csv_parse_errors_total").increment(1);
                        yield Err(e);
                    }
                }
            }
        };

        Box::pin(s)
    }
}

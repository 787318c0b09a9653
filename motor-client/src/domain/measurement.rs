use std::collections::{BTreeMap, BTreeSet};

use time::OffsetDateTime;

/// Semantic keys of a monitoring export, each bound to one external column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Timestamp,
    VoltageA,
    VoltageB,
    VoltageC,
    CurrentA,
    CurrentB,
    CurrentC,
    PowerFactorA,
    PowerFactorB,
    PowerFactorC,
    DailyFlow,
    MonthlyFlow,
    Level,
    SeasonTotalFlow,
    AccumulatedFlow,
    FlowVelocity,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Timestamp,
        Field::VoltageA,
        Field::VoltageB,
        Field::VoltageC,
        Field::CurrentA,
        Field::CurrentB,
        Field::CurrentC,
        Field::PowerFactorA,
        Field::PowerFactorB,
        Field::PowerFactorC,
        Field::DailyFlow,
        Field::MonthlyFlow,
        Field::Level,
        Field::SeasonTotalFlow,
        Field::AccumulatedFlow,
        Field::FlowVelocity,
    ];

    pub const VOLTAGES: [Field; 3] = [Field::VoltageA, Field::VoltageB, Field::VoltageC];
    pub const CURRENTS: [Field; 3] = [Field::CurrentA, Field::CurrentB, Field::CurrentC];
    pub const POWER_FACTORS: [Field; 3] =
        [Field::PowerFactorA, Field::PowerFactorB, Field::PowerFactorC];

    /// Column header used by the field loggers for this key.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Timestamp => "Time",
            Field::VoltageA => "AVRMS",
            Field::VoltageB => "BVRMS",
            Field::VoltageC => "CVRMS",
            Field::CurrentA => "AIRMS",
            Field::CurrentB => "BIRMS",
            Field::CurrentC => "CIRMS",
            Field::PowerFactorA => "AFP",
            Field::PowerFactorB => "BFP",
            Field::PowerFactorC => "CFP",
            Field::DailyFlow => "DIA",
            Field::MonthlyFlow => "MES",
            Field::Level => "NIVEL",
            Field::SeasonTotalFlow => "TOTAL",
            Field::AccumulatedFlow => "VAZAO",
            Field::FlowVelocity => "VELOCIDADE",
        }
    }

    pub fn from_column_name(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

/// One sample of the export.
///
/// A key mapped to `None` means the column exists but the cell was empty or
/// unreadable. Lookups treat both cases as a missing reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementRow {
    pub timestamp: Option<OffsetDateTime>,
    pub values: BTreeMap<Field, Option<f64>>,
}

impl MeasurementRow {
    pub fn new(timestamp: Option<OffsetDateTime>) -> Self {
        Self {
            timestamp,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: Field, value: f64) -> Self {
        self.values.insert(field, Some(value));
        self
    }

    pub fn with_missing(mut self, field: Field) -> Self {
        self.values.insert(field, None);
        self
    }

    pub fn get(&self, field: Field) -> Option<f64> {
        self.values.get(&field).copied().flatten()
    }
}

/// Time-ordered table of samples for a single report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    columns: BTreeSet<Field>,
    rows: Vec<MeasurementRow>,
}

impl MeasurementTable {
    /// Builds a table sorted by timestamp.
    ///
    /// The sort is stable, so duplicated instants keep their file order.
    pub fn from_rows(mut rows: Vec<MeasurementRow>) -> Self {
        rows.sort_by_key(|r| r.timestamp);

        let mut columns: BTreeSet<Field> = rows
            .iter()
            .flat_map(|r| r.values.keys().copied())
            .collect();
        if rows.iter().any(|r| r.timestamp.is_some()) {
            columns.insert(Field::Timestamp);
        }

        Self { columns, rows }
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &BTreeSet<Field> {
        &self.columns
    }

    pub fn has_column(&self, field: Field) -> bool {
        self.columns.contains(&field)
    }

    pub fn has_all(&self, fields: &[Field]) -> bool {
        fields.iter().all(|f| self.has_column(*f))
    }

    /// The subset of `fields` present in the table, in the given order.
    pub fn present(&self, fields: &[Field]) -> Vec<Field> {
        fields.iter().copied().filter(|f| self.has_column(*f)).collect()
    }

    /// Values of one column in row order, missing cells included as `None`.
    pub fn series(&self, field: Field) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |r| r.get(field))
    }

    pub fn first_timestamp(&self) -> Option<OffsetDateTime> {
        self.rows.iter().find_map(|r| r.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<OffsetDateTime> {
        self.rows.iter().rev().find_map(|r| r.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn column_names_resolve_back_to_fields() {
        for field in Field::ALL {
            assert_eq!(Field::from_column_name(field.column_name()), Some(field));
        }
        assert_eq!(Field::from_column_name(" AIRMS "), Some(Field::CurrentA));
        assert_eq!(Field::from_column_name("airms"), None);
        assert_eq!(Field::from_column_name("FREQ"), None);
    }

    #[test]
    fn table_is_sorted_and_collects_columns() {
        let rows = vec![
            MeasurementRow::new(Some(datetime!(2024-03-01 02:00:00 UTC))).with(Field::VoltageA, 381.0),
            MeasurementRow::new(Some(datetime!(2024-03-01 00:00:00 UTC))).with_missing(Field::CurrentA),
            MeasurementRow::new(Some(datetime!(2024-03-01 01:00:00 UTC))).with(Field::VoltageA, 379.0),
        ];

        let table = MeasurementTable::from_rows(rows);

        assert_eq!(table.len(), 3);
        assert_eq!(table.first_timestamp(), Some(datetime!(2024-03-01 00:00:00 UTC)));
        assert_eq!(table.last_timestamp(), Some(datetime!(2024-03-01 02:00:00 UTC)));
        assert!(table.has_column(Field::Timestamp));
        assert!(table.has_column(Field::CurrentA));
        assert!(!table.has_column(Field::CurrentB));
        assert_eq!(
            table.series(Field::VoltageA).collect::<Vec<_>>(),
            vec![None, Some(379.0), Some(381.0)]
        );
    }

    #[test]
    fn table_without_timestamps_has_no_timestamp_column() {
        let table = MeasurementTable::from_rows(vec![MeasurementRow::new(None).with(Field::VoltageA, 1.0)]);
        assert!(!table.has_column(Field::Timestamp));
        assert_eq!(table.present(&Field::VOLTAGES), vec![Field::VoltageA]);
    }
}

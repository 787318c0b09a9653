use motor_client::domain::{Field, MeasurementTable};

/// Totalizer counters reported, in order, with their labels.
const TOTALIZERS: [(Field, &str); 4] = [
    (Field::DailyFlow, "Daily flow (m³)"),
    (Field::MonthlyFlow, "Monthly flow (m³)"),
    (Field::AccumulatedFlow, "Accumulated flow (m³)"),
    (Field::SeasonTotalFlow, "Season total flow (m³)"),
];

/// Last strictly positive reading of a counter column.
///
/// Counters reset to zero between campaigns, so the final value of the last
/// run is the meaningful one, never a sum or a max.
pub fn last_positive(table: &MeasurementTable, field: Field) -> Option<f64> {
    table.series(field).flatten().filter(|v| *v > 0.0).last()
}

/// Latest totalizer readings; empty when no counter has a positive value.
pub fn analyze_accessories(table: &MeasurementTable) -> String {
    let lines: Vec<String> = TOTALIZERS
        .iter()
        .filter(|(field, _)| table.has_column(*field))
        .filter_map(|(field, label)| last_positive(table, *field).map(|v| format!("- {label}: {v:.2}")))
        .collect();

    if lines.is_empty() {
        return String::new();
    }
    format!("Latest flow totalizer readings:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use motor_client::domain::MeasurementRow;

    fn counter_table(field: Field, values: &[f64]) -> MeasurementTable {
        MeasurementTable::from_rows(values.iter().map(|v| MeasurementRow::new(None).with(field, *v)).collect())
    }

    #[test]
    fn reads_last_positive_value_not_sum_or_max() {
        let t = counter_table(Field::DailyFlow, &[0.0, 0.0, 5.0, 5.0, 0.0, 7.0]);
        assert_eq!(last_positive(&t, Field::DailyFlow), Some(7.0));

        let t = counter_table(Field::DailyFlow, &[3.0, 9.0, 0.0, 4.0, 0.0]);
        assert_eq!(last_positive(&t, Field::DailyFlow), Some(4.0));
    }

    #[test]
    fn section_lists_present_counters_in_order() {
        let t = MeasurementTable::from_rows(vec![
            MeasurementRow::new(None)
                .with(Field::SeasonTotalFlow, 1200.0)
                .with(Field::DailyFlow, 35.5)
                .with_missing(Field::MonthlyFlow),
            MeasurementRow::new(None)
                .with(Field::SeasonTotalFlow, 1250.126)
                .with(Field::DailyFlow, 0.0)
                .with_missing(Field::MonthlyFlow),
        ]);

        assert_eq!(
            analyze_accessories(&t),
            "Latest flow totalizer readings:\n- Daily flow (m³): 35.50\n- Season total flow (m³): 1250.13"
        );
    }

    #[test]
    fn no_counters_gives_empty_section() {
        let t = MeasurementTable::from_rows(vec![MeasurementRow::new(None).with(Field::VoltageA, 380.0)]);
        assert_eq!(analyze_accessories(&t), "");

        let zeros = counter_table(Field::MonthlyFlow, &[0.0, 0.0]);
        assert_eq!(analyze_accessories(&zeros), "");
    }
}

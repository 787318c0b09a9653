//! Missing-aware aggregates over measurement rows.
//!
//! A missing reading never takes part in a mean, a max or a comparison.

use motor_client::domain::{Field, MeasurementRow};

pub fn present_values<'a>(row: &'a MeasurementRow, fields: &'a [Field]) -> impl Iterator<Item = f64> + 'a {
    fields.iter().filter_map(move |f| row.get(*f))
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

pub fn max(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m >= v => Some(m),
        _ => Some(v),
    })
}

pub fn min(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    values.into_iter().fold(None, |acc, v| match acc {
        Some(m) if m <= v => Some(m),
        _ => Some(v),
    })
}

pub fn column_mean(rows: &[&MeasurementRow], field: Field) -> Option<f64> {
    mean(rows.iter().filter_map(|r| r.get(field)))
}

/// Mean of each phase over `rows`, then the mean of those phase means.
///
/// Phases with no readings at all are left out of the outer mean.
pub fn mean_of_phase_means(rows: &[&MeasurementRow], fields: &[Field]) -> Option<f64> {
    mean(fields.iter().filter_map(|f| column_mean(rows, *f)))
}

pub fn max_over(rows: &[&MeasurementRow], fields: &[Field]) -> Option<f64> {
    max(rows.iter().flat_map(|r| present_values(r, fields)))
}

pub fn min_over(rows: &[&MeasurementRow], fields: &[Field]) -> Option<f64> {
    min(rows.iter().flat_map(|r| present_values(r, fields)))
}

/// Number of present readings in `row` satisfying `pred`.
pub fn count_where(row: &MeasurementRow, fields: &[Field], pred: impl Fn(f64) -> bool) -> usize {
    present_values(row, fields).filter(|v| pred(*v)).count()
}

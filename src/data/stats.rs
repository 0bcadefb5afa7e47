use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::schema::ColumnType;
use super::value::{cell, Dataset, Row, Value};
use crate::settings::FilterSettings;

// ---------------------------------------------------------------------------
// Column statistics (full scans, not the inference sample)
// ---------------------------------------------------------------------------

/// Sorted distinct string forms of every non-null cell in `column`.
pub fn unique_values(rows: &[Row], column: &str) -> Vec<String> {
    rows.iter()
        .map(|row| cell(row, column))
        .filter(|v| !matches!(v, Value::Null))
        .map(|v| v.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// A range worth offering as a filter: finite and not a single point.
    pub fn is_filterable(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min != self.max
    }
}

/// Min/max over the cells of `column` that convert to numbers.
///
/// With no convertible cell the result is `[+inf, -inf]`, which
/// [`NumericRange::is_filterable`] rejects.
pub fn numeric_range(rows: &[Row], column: &str) -> NumericRange {
    rows.iter()
        .filter_map(|row| cell(row, column).to_number())
        .fold(
            NumericRange::new(f64::INFINITY, f64::NEG_INFINITY),
            |acc, n| NumericRange::new(acc.min.min(n), acc.max.max(n)),
        )
}

/// Earliest and latest date in `column`, ignoring cells that are not dates.
pub fn date_span(rows: &[Row], column: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
    rows.iter()
        .filter_map(|row| cell(row, column).to_datetime())
        .fold(None, |span, dt| match span {
            None => Some((dt, dt)),
            Some((lo, hi)) => Some((lo.min(dt), hi.max(dt))),
        })
}

// ---------------------------------------------------------------------------
// Filter options: what the filter controls may offer for a dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryOptions {
    pub column: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericOptions {
    pub column: String,
    pub range: NumericRange,
}

/// Bounds for the filter controls, derived from the whole dataset.
///
/// Independent of the current filter state, so it is computed once per
/// dataset load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub categories: Vec<CategoryOptions>,
    pub numbers: Vec<NumericOptions>,
    /// Earliest and latest date over all `date` columns; `None` when there
    /// is nothing a date range could apply to.
    pub date_span: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl FilterOptions {
    pub fn build(dataset: &Dataset, settings: &FilterSettings) -> Self {
        let mut options = FilterOptions::default();
        for (column, ty) in dataset.schema.iter() {
            match ty {
                ColumnType::Category => {
                    let values = unique_values(&dataset.rows, column);
                    if values.is_empty() || values.len() > settings.max_category_values {
                        log::debug!(
                            "Skipping category filter for '{column}' ({} values)",
                            values.len()
                        );
                        continue;
                    }
                    options.categories.push(CategoryOptions {
                        column: column.to_string(),
                        values,
                    });
                }
                ColumnType::Number => {
                    let range = numeric_range(&dataset.rows, column);
                    if range.is_filterable() {
                        options.numbers.push(NumericOptions {
                            column: column.to_string(),
                            range,
                        });
                    }
                }
                ColumnType::Date => {
                    if let Some((lo, hi)) = date_span(&dataset.rows, column) {
                        options.date_span = Some(match options.date_span {
                            None => (lo, hi),
                            Some((a, b)) => (a.min(lo), b.max(hi)),
                        });
                    }
                }
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::Schema;

    fn column(name: &str, values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| Row::from([(name.to_string(), v)]))
            .collect()
    }

    #[test]
    fn unique_values_are_sorted_and_skip_nulls() {
        let rows = column(
            "c",
            vec![
                Value::from("b"),
                Value::Null,
                Value::from("a"),
                Value::from("b"),
                Value::Number(3.0),
            ],
        );
        assert_eq!(unique_values(&rows, "c"), vec!["3", "a", "b"]);
    }

    #[test]
    fn numeric_range_ignores_unconvertible_cells() {
        let rows = column(
            "n",
            vec![
                Value::from("12"),
                Value::from("oops"),
                Value::Number(-4.5),
                Value::Null,
                Value::Number(30.0),
            ],
        );
        assert_eq!(numeric_range(&rows, "n"), NumericRange::new(-4.5, 30.0));
    }

    #[test]
    fn numeric_range_without_numbers_is_not_filterable() {
        let rows = column("n", vec![Value::from("x"), Value::Null]);
        assert!(!numeric_range(&rows, "n").is_filterable());
        assert!(!NumericRange::new(2.0, 2.0).is_filterable());
    }

    #[test]
    fn filter_options_apply_cardinality_and_range_rules() {
        let mut rows = Vec::new();
        for i in 0..60 {
            rows.push(Row::from([
                ("id".to_string(), Value::from(format!("id-{i}").as_str())),
                ("team".to_string(), Value::from(if i % 2 == 0 { "red" } else { "blue" })),
                ("score".to_string(), Value::Number(i as f64)),
                ("flat".to_string(), Value::Number(1.0)),
                ("empty".to_string(), Value::Null),
            ]));
        }
        let schema: Schema = [
            ("id", ColumnType::Category),
            ("team", ColumnType::Category),
            ("score", ColumnType::Number),
            ("flat", ColumnType::Number),
            ("empty", ColumnType::Category),
        ]
        .into_iter()
        .collect();
        let columns = schema.iter().map(|(c, _)| c.to_string()).collect();
        let dataset = Dataset::new(rows, columns, schema);

        let options = FilterOptions::build(&dataset, &FilterSettings::default());
        assert_eq!(options.categories.len(), 1);
        assert_eq!(options.categories[0].column, "team");
        assert_eq!(options.categories[0].values, vec!["blue", "red"]);
        assert_eq!(options.numbers.len(), 1);
        assert_eq!(options.numbers[0].range, NumericRange::new(0.0, 59.0));
        assert_eq!(options.date_span, None);
    }

    #[test]
    fn date_span_covers_all_date_columns() {
        let rows = vec![
            Row::from([
                ("a".to_string(), Value::from("2024-03-01")),
                ("b".to_string(), Value::from("2023-12-31")),
            ]),
            Row::from([
                ("a".to_string(), Value::from("2024-05-01")),
                ("b".to_string(), Value::from("junk")),
            ]),
        ];
        let schema: Schema = [("a", ColumnType::Date), ("b", ColumnType::Date)]
            .into_iter()
            .collect();
        let dataset = Dataset::new(rows, vec!["a".into(), "b".into()], schema);
        let options = FilterOptions::build(&dataset, &FilterSettings::default());
        let (lo, hi) = options.date_span.unwrap();
        assert_eq!(lo.to_string(), "2023-12-31 00:00:00");
        assert_eq!(hi.to_string(), "2024-05-01 00:00:00");
    }
}

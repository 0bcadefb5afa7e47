//! Chart selection and the bounded series each chart draws.
//!
//! Configurations are a pure function of the schema; series are a pure
//! function of a configuration and the currently filtered rows.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::schema::{ColumnType, Schema};
use super::value::{cell, Row};
use crate::settings::ChartSettings;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
    Area,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
            ChartKind::Area => "area",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub column: String,
    pub kind: ChartKind,
    pub title: String,
    pub data_type: ColumnType,
}

impl ChartConfig {
    fn new(column: &str, kind: ChartKind, title: String, data_type: ColumnType) -> Self {
        Self {
            column: column.to_string(),
            kind,
            title,
            data_type,
        }
    }

    /// Short caption shown under the title.
    pub fn subtitle(&self) -> &'static str {
        match self.data_type {
            ColumnType::Category => "Distribution",
            ColumnType::Number => "Values",
            ColumnType::Date => "Timeline",
        }
    }
}

/// One config per column in schema order, plus a pie chart for the first
/// category column, truncated to `max_charts`.
pub fn chart_configs(schema: &Schema, settings: &ChartSettings) -> Vec<ChartConfig> {
    let mut configs = Vec::new();
    let mut has_pie = false;
    for (column, ty) in schema.iter() {
        match ty {
            ColumnType::Category => {
                configs.push(ChartConfig::new(
                    column,
                    ChartKind::Bar,
                    format!("{column} Distribution"),
                    ty,
                ));
                if !has_pie {
                    configs.push(ChartConfig::new(
                        column,
                        ChartKind::Pie,
                        format!("{column} Breakdown"),
                        ty,
                    ));
                    has_pie = true;
                }
            }
            ColumnType::Number => configs.push(ChartConfig::new(
                column,
                ChartKind::Line,
                format!("{column} Trend"),
                ty,
            )),
            ColumnType::Date => configs.push(ChartConfig::new(
                column,
                ChartKind::Area,
                format!("{column} Timeline"),
                ty,
            )),
        }
    }
    configs.truncate(settings.max_charts);
    configs
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericPoint {
    /// 1-based position in the filtered rows.
    pub index: usize,
    pub value: f64,
}

/// A presence marker on the timeline; `value` is always 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatePoint {
    pub label: String,
    pub date: Option<NaiveDateTime>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "points", rename_all = "lowercase")]
pub enum ChartSeries {
    Categories(Vec<CategoryCount>),
    Values(Vec<NumericPoint>),
    Timeline(Vec<DatePoint>),
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Categories(points) => points.len(),
            ChartSeries::Values(points) => points.len(),
            ChartSeries::Timeline(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the series for `config` from the filtered rows.
pub fn aggregate(config: &ChartConfig, rows: &[&Row], settings: &ChartSettings) -> ChartSeries {
    match config.data_type {
        ColumnType::Category => {
            ChartSeries::Categories(category_counts(rows, &config.column, settings.top_categories))
        }
        ColumnType::Number => ChartSeries::Values(numeric_series(
            rows,
            &config.column,
            settings.max_numeric_points,
        )),
        ColumnType::Date => {
            ChartSeries::Timeline(date_series(rows, &config.column, settings.max_date_points))
        }
    }
}

/// Occurrences per distinct string value, most frequent first, top `limit`.
/// Ties keep first-seen order.
pub fn category_counts(rows: &[&Row], column: &str, limit: usize) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for row in rows {
        let name = cell(row, column).to_string();
        match index.get(&name) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(name.clone(), counts.len());
                counts.push(CategoryCount { name, count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// The first `limit` rows as (1-based index, value); unconvertible cells
/// plot as 0.
pub fn numeric_series(rows: &[&Row], column: &str, limit: usize) -> Vec<NumericPoint> {
    rows.iter()
        .take(limit)
        .enumerate()
        .map(|(i, row)| NumericPoint {
            index: i + 1,
            value: cell(row, column).to_number().unwrap_or(0.0),
        })
        .collect()
}

/// Rows sorted by date ascending (undated rows last), first `limit` kept.
pub fn date_series(rows: &[&Row], column: &str, limit: usize) -> Vec<DatePoint> {
    let mut dates: Vec<Option<NaiveDateTime>> =
        rows.iter().map(|row| cell(row, column).to_datetime()).collect();
    dates.sort_by_key(|d| (d.is_none(), *d));
    dates
        .into_iter()
        .take(limit)
        .map(|date| DatePoint {
            label: date
                .map(|d| d.format("%b %-d").to_string())
                .unwrap_or_else(|| "Invalid Date".to_string()),
            date,
            value: 1.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::Value;

    fn rows_of(column: &str, values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .map(|v| Row::from([(column.to_string(), v)]))
            .collect()
    }

    #[test]
    fn configs_follow_schema_order_with_one_pie() {
        let schema: Schema = [
            ("region", ColumnType::Category),
            ("revenue", ColumnType::Number),
            ("product", ColumnType::Category),
            ("day", ColumnType::Date),
        ]
        .into_iter()
        .collect();
        let configs = chart_configs(&schema, &ChartSettings::default());
        let kinds: Vec<_> = configs.iter().map(|c| (c.column.as_str(), c.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("region", ChartKind::Bar),
                ("region", ChartKind::Pie),
                ("revenue", ChartKind::Line),
                ("product", ChartKind::Bar),
                ("day", ChartKind::Area),
            ]
        );
        assert_eq!(configs[1].title, "region Breakdown");
        assert_eq!(configs[4].title, "day Timeline");
    }

    #[test]
    fn configs_are_capped() {
        let schema: Schema = (0..12)
            .map(|i| (format!("n{i}"), ColumnType::Number))
            .collect();
        assert_eq!(chart_configs(&schema, &ChartSettings::default()).len(), 8);
    }

    #[test]
    fn category_counts_example() {
        let rows = rows_of(
            "city",
            vec![Value::from("NYC"), Value::from("LA"), Value::from("NYC")],
        );
        let refs: Vec<&Row> = rows.iter().collect();
        assert_eq!(
            category_counts(&refs, "city", 10),
            vec![
                CategoryCount {
                    name: "NYC".into(),
                    count: 2
                },
                CategoryCount {
                    name: "LA".into(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn category_counts_keep_top_n_descending() {
        let values = (0..20)
            .flat_map(|i| std::iter::repeat(Value::from(format!("v{i}").as_str())).take(i + 1))
            .collect();
        let rows = rows_of("c", values);
        let refs: Vec<&Row> = rows.iter().collect();
        let counts = category_counts(&refs, "c", 10);
        assert_eq!(counts.len(), 10);
        assert_eq!(counts[0].name, "v19");
        assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn numeric_series_defaults_bad_cells_to_zero() {
        let mut values: Vec<Value> = (0..60).map(|i| Value::Number(i as f64)).collect();
        values[1] = Value::from("n/a");
        let rows = rows_of("n", values);
        let refs: Vec<&Row> = rows.iter().collect();
        let series = numeric_series(&refs, "n", 50);
        assert_eq!(series.len(), 50);
        assert_eq!(series[0], NumericPoint { index: 1, value: 0.0 });
        assert_eq!(series[1].value, 0.0);
        assert_eq!(series[49], NumericPoint { index: 50, value: 49.0 });
    }

    #[test]
    fn date_series_sorted_ascending_and_capped() {
        let mut values: Vec<Value> = (1..=28)
            .rev()
            .map(|d| Value::from(format!("2024-02-{d:02}").as_str()))
            .collect();
        values.extend((1..=10).map(|d| Value::from(format!("2024-01-{d:02}").as_str())));
        values.insert(3, Value::from("garbage"));
        let rows = rows_of("d", values);
        let refs: Vec<&Row> = rows.iter().collect();

        let series = date_series(&refs, "d", 30);
        assert_eq!(series.len(), 30);
        assert_eq!(series[0].label, "Jan 1");
        assert_eq!(series[10].label, "Feb 1");
        assert!(series.iter().all(|p| p.value == 1.0 && p.date.is_some()));
        assert!(series.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn undated_rows_sort_last() {
        let rows = rows_of("d", vec![Value::from("??"), Value::from("2024-05-05")]);
        let refs: Vec<&Row> = rows.iter().collect();
        let series = date_series(&refs, "d", 30);
        assert_eq!(series[0].label, "May 5");
        assert_eq!(series[1].label, "Invalid Date");
    }

    #[test]
    fn aggregate_dispatches_on_data_type() {
        let rows = rows_of("n", vec![Value::Number(4.0)]);
        let refs: Vec<&Row> = rows.iter().collect();
        let config = ChartConfig::new("n", ChartKind::Line, "n Trend".into(), ColumnType::Number);
        let series = aggregate(&config, &refs, &ChartSettings::default());
        assert_eq!(
            series,
            ChartSeries::Values(vec![NumericPoint { index: 1, value: 4.0 }])
        );
        assert_eq!(config.subtitle(), "Values");
    }
}

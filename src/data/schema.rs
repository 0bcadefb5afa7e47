use std::fmt;

use serde::{Deserialize, Serialize};

use super::classify::{is_date_like, is_number_like};
use super::value::{cell, Row, Value};
use crate::settings::InferenceSettings;

// ---------------------------------------------------------------------------
// ColumnType / Schema
// ---------------------------------------------------------------------------

/// Semantic kind of a column, assigned once per dataset load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Category,
    Date,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Number => "number",
            ColumnType::Category => "category",
            ColumnType::Date => "date",
        };
        f.write_str(name)
    }
}

/// Column name → type, iterated in column order.
///
/// Holds exactly one entry per column; inserting an existing name replaces
/// its type in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entries: Vec<(String, ColumnType)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, ty: ColumnType) {
        let column = column.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = ty,
            None => self.entries.push((column, ty)),
        }
    }

    pub fn get(&self, column: &str) -> Option<ColumnType> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Names of all columns of the given type, in schema order.
    pub fn columns_of(&self, ty: ColumnType) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(move |(_, t)| *t == ty)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, ColumnType)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, ty) in iter {
            schema.insert(name, ty);
        }
        schema
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// Type every column from a bounded sample of its leading rows.
///
/// Only the first `sample_size` rows are examined, so the cost is
/// independent of the dataset size. The sample is assumed representative.
pub fn infer_schema(rows: &[Row], columns: &[String], settings: &InferenceSettings) -> Schema {
    let sample = &rows[..rows.len().min(settings.sample_size)];
    columns
        .iter()
        .map(|column| {
            let ty = infer_column_type(sample.iter().map(|row| cell(row, column)), settings);
            log::debug!("Column '{column}' inferred as {ty}");
            (column.clone(), ty)
        })
        .collect()
}

/// Majority vote over the non-missing values: dates win over numbers, and
/// anything below the threshold is a category.
pub fn infer_column_type<'a>(
    values: impl IntoIterator<Item = &'a Value>,
    settings: &InferenceSettings,
) -> ColumnType {
    let mut total = 0usize;
    let mut dates = 0usize;
    let mut numbers = 0usize;
    for value in values.into_iter().filter(|v| !v.is_missing()) {
        total += 1;
        if is_date_like(value) {
            dates += 1;
        }
        if is_number_like(value) {
            numbers += 1;
        }
    }

    if total == 0 {
        return ColumnType::Category;
    }
    let total = total as f64;
    if dates as f64 / total > settings.threshold {
        ColumnType::Date
    } else if numbers as f64 / total > settings.threshold {
        ColumnType::Number
    } else {
        ColumnType::Category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(column: &str, values: &[Value]) -> Vec<Row> {
        values
            .iter()
            .map(|v| Row::from([(column.to_string(), v.clone())]))
            .collect()
    }

    fn infer_one(values: &[Value]) -> ColumnType {
        let rows = rows("c", values);
        infer_schema(&rows, &["c".to_string()], &InferenceSettings::default())
            .get("c")
            .unwrap()
    }

    #[test]
    fn spec_example_city_and_population() {
        let data: Vec<Row> = [("NYC", "100"), ("LA", "200"), ("NYC", "150")]
            .iter()
            .map(|(city, pop)| {
                Row::from([
                    ("city".to_string(), Value::from(*city)),
                    ("pop".to_string(), Value::from(*pop)),
                ])
            })
            .collect();
        let schema = infer_schema(
            &data,
            &["city".to_string(), "pop".to_string()],
            &InferenceSettings::default(),
        );
        assert_eq!(schema.get("city"), Some(ColumnType::Category));
        assert_eq!(schema.get("pop"), Some(ColumnType::Number));
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn iso_dates_infer_date() {
        let values: Vec<Value> = (1..=20)
            .map(|d| Value::from(format!("2024-01-{d:02}").as_str()))
            .collect();
        assert_eq!(infer_one(&values), ColumnType::Date);
    }

    #[test]
    fn all_missing_defaults_to_category() {
        assert_eq!(
            infer_one(&[Value::Null, Value::from(""), Value::Null]),
            ColumnType::Category
        );
        assert_eq!(infer_one(&[]), ColumnType::Category);
    }

    #[test]
    fn threshold_is_strict() {
        // 7 of 10 numeric is exactly 0.7, not above it
        let mut values: Vec<Value> = (0..7).map(|i| Value::Number(i as f64)).collect();
        values.extend((0..3).map(|_| Value::from("n/a")));
        assert_eq!(infer_one(&values), ColumnType::Category);

        values.push(Value::Number(8.0));
        assert_eq!(infer_one(&values), ColumnType::Number);
    }

    #[test]
    fn missing_values_do_not_count_against_the_vote() {
        let values = [
            Value::Number(1.0),
            Value::Null,
            Value::from(""),
            Value::Number(2.0),
            Value::Null,
        ];
        assert_eq!(infer_one(&values), ColumnType::Number);
    }

    #[test]
    fn only_the_sample_is_considered() {
        let mut values: Vec<Value> = (0..5).map(|i| Value::Number(i as f64)).collect();
        values.extend((0..50).map(|_| Value::from("text")));
        let rows = rows("c", &values);
        let settings = InferenceSettings {
            sample_size: 5,
            ..Default::default()
        };
        let schema = infer_schema(&rows, &["c".to_string()], &settings);
        assert_eq!(schema.get("c"), Some(ColumnType::Number));
    }

    #[test]
    fn absent_columns_have_no_entry() {
        let schema: Schema = [("a", ColumnType::Number)].into_iter().collect();
        assert_eq!(schema.get("b"), None);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut schema = Schema::new();
        schema.insert("a", ColumnType::Number);
        schema.insert("b", ColumnType::Date);
        schema.insert("a", ColumnType::Category);
        let entries: Vec<_> = schema.iter().collect();
        assert_eq!(
            entries,
            vec![("a", ColumnType::Category), ("b", ColumnType::Date)]
        );
    }
}

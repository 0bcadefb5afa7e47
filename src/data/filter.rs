use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::schema::{ColumnType, Schema};
use super::stats::NumericRange;
use super::value::{cell, Row};

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Global date bounds, applied to every `date` column. Both ends inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn admits(&self, value: NaiveDateTime) -> bool {
        self.start.is_none_or(|start| value >= start) && self.end.is_none_or(|end| value <= end)
    }
}

/// The user's current restrictions. `Default` is the neutral state.
///
/// * A column absent from `categories`, or mapped to an empty set, is
///   unrestricted.
/// * A column absent from `numeric_ranges` is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub categories: BTreeMap<String, BTreeSet<String>>,
    pub numeric_ranges: BTreeMap<String, NumericRange>,
    pub date_range: DateRange,
}

impl FilterState {
    /// No predicate is active.
    pub fn is_neutral(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of active predicates: each non-empty category selection, each
    /// numeric range, and the date range counted once.
    pub fn active_count(&self) -> usize {
        let categories = self.categories.values().filter(|s| !s.is_empty()).count();
        categories + self.numeric_ranges.len() + usize::from(self.date_range.is_active())
    }

    /// Whether `row` passes every active predicate.
    ///
    /// Cells that do not convert to a number are not checked against a
    /// numeric range, and cells that do not convert to a date are not checked
    /// against the date range.
    pub fn matches(&self, row: &Row, schema: &Schema) -> bool {
        for (column, allowed) in &self.categories {
            if !allowed.is_empty() && !allowed.contains(&cell(row, column).to_string()) {
                return false;
            }
        }

        for (column, range) in &self.numeric_ranges {
            if let Some(n) = cell(row, column).to_number() {
                if !range.contains(n) {
                    return false;
                }
            }
        }

        if self.date_range.is_active() {
            for column in schema.columns_of(ColumnType::Date) {
                if let Some(dt) = cell(row, column).to_datetime() {
                    if !self.date_range.admits(dt) {
                        return false;
                    }
                }
            }
        }

        true
    }
}

// ---------------------------------------------------------------------------
// Row filter engine
// ---------------------------------------------------------------------------

/// The rows passing `filters`, in their original order.
pub fn filter_rows<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    filters: &FilterState,
    schema: &Schema,
) -> Vec<&'a Row> {
    rows.into_iter()
        .filter(|row| filters.matches(row, schema))
        .collect()
}

/// Indices of the rows passing `filters`, ascending.
pub fn filtered_indices(rows: &[Row], filters: &FilterState, schema: &Schema) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| filters.matches(row, schema))
        .map(|(i, _)| i)
        .collect()
}

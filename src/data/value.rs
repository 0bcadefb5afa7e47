use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};

use super::classify::parse_datetime;
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Value – a single cell, typed once at ingestion
// ---------------------------------------------------------------------------

/// A loosely-typed cell as delivered by the file decoders.
///
/// The variant is decided per cell when the file is read; a column may hold
/// a mix of variants across rows. Conversions never coerce implicitly, they
/// go through [`Value::to_number`] and [`Value::to_datetime`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

static NULL: Value = Value::Null;

impl Value {
    /// Type a raw text cell the way a dynamically-typing CSV reader would:
    /// empty → `Null`, numeric text → `Number`, anything else stays `Text`.
    pub fn from_text(s: &str) -> Self {
        if s.is_empty() {
            return Value::Null;
        }
        match parse_number(s) {
            Some(n) => Value::Number(n),
            None => Value::Text(s.to_string()),
        }
    }

    /// Null or empty text. These cells never take part in type inference.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric interpretation, or `None` when the cell is not a number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Date interpretation, or `None` when the cell does not hold a valid date.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => parse_datetime(s),
            _ => None,
        }
    }
}

/// Decimal or exponent notation, plus the spelled-out `Infinity`.
///
/// `f64::from_str` also takes `inf`, `infinity` and `nan` in any case; those
/// stay text.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    match s {
        "" => None,
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ if s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') => None,
        _ => s.parse::<f64>().ok(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Number(n) if n.is_infinite() => {
                f.write_str(if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::DateTime(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

// ---------------------------------------------------------------------------
// Row / Dataset
// ---------------------------------------------------------------------------

/// One record: column name → cell. A missing key reads as `Null`.
pub type Row = BTreeMap<String, Value>;

/// Look up a cell, treating absent columns as `Null`.
pub fn cell<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&NULL)
}

/// A loaded table together with its inferred (or preset) schema.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Rows in source order.
    pub rows: Vec<Row>,
    /// Column names in order of first appearance.
    pub columns: Vec<String>,
    pub schema: Schema,
}

impl Dataset {
    pub fn new(rows: Vec<Row>, columns: Vec<String>, schema: Schema) -> Self {
        Self {
            rows,
            columns,
            schema,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn from_text_types_cells() {
        assert_eq!(Value::from_text(""), Value::Null);
        assert_eq!(Value::from_text("42"), Value::Number(42.0));
        assert_eq!(Value::from_text(" -1.5 "), Value::Number(-1.5));
        assert_eq!(Value::from_text("NaN"), Value::Text("NaN".into()));
        assert_eq!(
            Value::from_text("2024-01-05"),
            Value::Text("2024-01-05".into())
        );
    }

    #[test]
    fn to_number_reports_failure_instead_of_coercing() {
        assert_eq!(Value::from("150").to_number(), Some(150.0));
        assert_eq!(Value::from("  ").to_number(), None);
        assert_eq!(Value::from("abc").to_number(), None);
        assert_eq!(Value::Null.to_number(), None);
        assert_eq!(Value::Number(f64::NAN).to_number(), None);
    }

    #[test]
    fn display_matches_js_style_stringification() {
        assert_eq!(Value::Number(100.0).to_string(), "100");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Null.to_string(), "null");
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            Value::DateTime(d.and_time(NaiveTime::MIN)).to_string(),
            "2024-03-09"
        );
        let dt = d.and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-09 14:30:00");
    }

    #[test]
    fn only_spelled_out_infinity_is_numeric() {
        assert_eq!(Value::from_text("Infinity"), Value::Number(f64::INFINITY));
        assert_eq!(Value::from_text("-Infinity"), Value::Number(f64::NEG_INFINITY));
        assert_eq!(Value::from_text("1e3"), Value::Number(1000.0));
        for text in ["inf", "-inf", "infinity", "INF", "nan"] {
            assert_eq!(Value::from_text(text), Value::Text(text.into()));
            assert_eq!(Value::from(text).to_number(), None);
        }
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn absent_column_reads_as_null() {
        let row = Row::new();
        assert_eq!(cell(&row, "missing"), &Value::Null);
    }
}

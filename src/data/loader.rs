use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, TimeUnit, TimestampMillisecondType};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::schema::infer_schema;
use super::value::{Dataset, Row, Value};
use crate::error::LoadError;
use crate::settings::InferenceSettings;

pub const CSV_EXTENSIONS: &[&str] = &["csv"];
pub const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods"];
pub const JSON_EXTENSIONS: &[&str] = &["json"];
pub const PARQUET_EXTENSIONS: &[&str] = &["parquet", "pq"];

/// Every extension [`load_file`] accepts.
pub fn supported_extensions() -> Vec<&'static str> {
    [
        CSV_EXTENSIONS,
        EXCEL_EXTENSIONS,
        JSON_EXTENSIONS,
        PARQUET_EXTENSIONS,
    ]
    .concat()
}

/// Decoded rows plus the column names in source order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RawTable {
    /// Attach an inferred schema.
    pub fn into_dataset(self, settings: &InferenceSettings) -> Dataset {
        let schema = infer_schema(&self.rows, &self.columns, settings);
        Dataset::new(self.rows, self.columns, schema)
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Unknown extensions fail before the file is opened. Decoder errors come
/// back as [`LoadError::Parse`] carrying the decoder's message.
pub fn load_file(path: &Path, settings: &InferenceSettings) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = if CSV_EXTENSIONS.contains(&ext.as_str()) {
        let bytes = std::fs::read(path)?;
        parse_csv(bytes.as_slice())?
    } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
        let table = load_excel(path)?;
        if table.rows.is_empty() {
            return Err(LoadError::Empty);
        }
        table
    } else if JSON_EXTENSIONS.contains(&ext.as_str()) {
        let text = std::fs::read_to_string(path)?;
        parse_json(&text)?
    } else if PARQUET_EXTENSIONS.contains(&ext.as_str()) {
        load_parquet(path)?
    } else {
        return Err(LoadError::UnsupportedFormat(ext));
    };

    Ok(table.into_dataset(settings))
}

/// Make header names usable as keys: blanks get a positional name and
/// repeats get the lowest numeric suffix no other header already uses.
fn normalize_headers(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let name = if name.trim().is_empty() {
                format!("column_{}", i + 1)
            } else {
                name
            };
            let mut candidate = name.clone();
            let mut n = 0;
            while used.contains(&candidate) {
                n += 1;
                candidate = format!("{name}_{n}");
            }
            used.insert(candidate.clone());
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Every record must have as many fields as the header. Cells are typed
/// with [`Value::from_text`].
pub fn parse_csv(input: impl Read) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(input);
    let columns = normalize_headers(
        reader
            .headers()
            .context("reading CSV headers")?
            .iter()
            .map(|h| h.to_string()),
    );

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row: Row = columns
            .iter()
            .zip(record.iter())
            .map(|(col, field)| (col.clone(), Value::from_text(field)))
            .collect();
        rows.push(row);
    }

    log::debug!("Parsed CSV: {} rows, {} columns", rows.len(), columns.len());
    Ok(RawTable { columns, rows })
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

/// First worksheet only; its first row names the columns.
fn load_excel(path: &Path) -> Result<RawTable> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| anyhow!("Failed to parse Excel file: {e}"))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("Excel file has no worksheets")?
        .map_err(|e| anyhow!("Failed to parse Excel file: {e}"))?;

    let mut sheet_rows = range.rows();
    let Some(header) = sheet_rows.next() else {
        return Ok(RawTable::default());
    };
    let columns = normalize_headers(header.iter().map(|c| c.to_string()));

    let rows = sheet_rows
        .filter(|cells| cells.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|cells| {
            columns
                .iter()
                .zip(cells.iter())
                .map(|(col, c)| (col.clone(), excel_cell(c)))
                .filter(|(_, v)| !matches!(v, Value::Null))
                .collect::<Row>()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn excel_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => c
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::Text(c.to_string())),
        Data::DurationIso(s) => Value::Text(s.clone()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON: `[{ "col": value, ... }, ...]`.
///
/// Columns appear in the key order of the first record, then any new keys
/// in order of first appearance.
pub fn parse_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let mut row = Row::new();
        for (key, val) in obj {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            row.insert(key.clone(), json_to_value(val));
        }
        rows.push(row);
    }

    Ok(RawTable { columns, rows })
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::Null => Value::Null,
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        JsonValue::String(s) if s.is_empty() => Value::Null,
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Bool(b) => Value::Text(b.to_string()),
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns = normalize_headers(builder.schema().fields().iter().map(|f| f.name().clone()));
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let mut batch_rows = vec![Row::new(); batch.num_rows()];
        for (col_name, array) in columns.iter().zip(batch.columns()) {
            let values = arrow_values(array)
                .with_context(|| format!("converting column '{col_name}'"))?;
            for (row, value) in batch_rows.iter_mut().zip(values) {
                row.insert(col_name.clone(), value);
            }
        }
        rows.extend(batch_rows);
    }

    Ok(RawTable { columns, rows })
}

/// Convert a whole Arrow column to cells.
fn arrow_values(array: &ArrayRef) -> Result<Vec<Value>> {
    let len = array.len();
    let data_type = array.data_type();

    if matches!(data_type, DataType::Boolean) {
        let arr = array.as_boolean();
        return Ok((0..len)
            .map(|i| {
                if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Text(arr.value(i).to_string())
                }
            })
            .collect());
    }

    if data_type.is_numeric() {
        let floats = cast(array, &DataType::Float64)?;
        let arr = floats.as_primitive::<Float64Type>();
        return Ok((0..len)
            .map(|i| {
                if arr.is_null(i) {
                    Value::Null
                } else {
                    Value::Number(arr.value(i))
                }
            })
            .collect());
    }

    if matches!(
        data_type,
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _)
    ) {
        let stamps = cast(array, &DataType::Timestamp(TimeUnit::Millisecond, None))?;
        let arr = stamps.as_primitive::<TimestampMillisecondType>();
        return Ok((0..len)
            .map(|i| {
                if arr.is_null(i) {
                    Value::Null
                } else {
                    arr.value_as_datetime(i)
                        .map(Value::DateTime)
                        .unwrap_or(Value::Null)
                }
            })
            .collect());
    }

    if matches!(data_type, DataType::Utf8 | DataType::LargeUtf8) {
        let strings = cast(array, &DataType::Utf8)?;
        let arr = strings.as_string::<i32>();
        return Ok((0..len)
            .map(|i| {
                if arr.is_null(i) || arr.value(i).is_empty() {
                    Value::Null
                } else {
                    Value::Text(arr.value(i).to_string())
                }
            })
            .collect());
    }

    let options = FormatOptions::default();
    let formatter = ArrayFormatter::try_new(array.as_ref(), &options)?;
    Ok((0..len)
        .map(|i| {
            if array.is_null(i) {
                Value::Null
            } else {
                Value::Text(formatter.value(i).to_string())
            }
        })
        .collect())
}

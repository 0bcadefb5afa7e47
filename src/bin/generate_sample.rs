//! Write one of the built-in demo datasets to a CSV file.
//!
//! Usage: `generate_sample [template-id] [output.csv]`

use anyhow::{bail, Context, Result};
use autodash::data::demo::{self, TEMPLATES};
use autodash::data::value::{cell, Value};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let id = args.next().unwrap_or_else(|| "sales".to_string());
    let Some(template) = demo::find(&id) else {
        let known: Vec<&str> = TEMPLATES.iter().map(|t| t.id).collect();
        bail!("Unknown template '{id}'. Available: {}", known.join(", "));
    };
    let output_path = args
        .next()
        .unwrap_or_else(|| format!("{}_sample.csv", template.id));

    let dataset = template.dataset();
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("Failed to create {output_path}"))?;
    writer.write_record(&dataset.columns)?;
    for row in &dataset.rows {
        writer.write_record(dataset.columns.iter().map(|c| match cell(row, c) {
            Value::Null => String::new(),
            v => v.to_string(),
        }))?;
    }
    writer.flush()?;

    println!(
        "Wrote {} rows ({} columns) of '{}' to {output_path}",
        dataset.len(),
        dataset.columns.len(),
        template.name
    );
    Ok(())
}

use thiserror::Error;

/// Failures at the file-decoding boundary. Nothing past it can fail.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "Unsupported file format '.{0}'. Please upload a CSV, Excel (.xlsx, .xls, .xlsm, .xlsb, .ods), JSON or Parquet file."
    )]
    UnsupportedFormat(String),

    #[error("{0}")]
    Parse(String),

    #[error("The file appears to be empty.")]
    Empty,

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("A file is already being processed.")]
    Busy,
}

impl From<anyhow::Error> for LoadError {
    fn from(e: anyhow::Error) -> Self {
        LoadError::Parse(format!("{e:#}"))
    }
}

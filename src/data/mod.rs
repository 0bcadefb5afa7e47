/// Data layer: cell values, schema inference, statistics, filtering and
/// chart aggregation.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode file → rows        (demo: generated rows)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐   ┌──────────┐
///   │  schema   │←──│ classify │   sample rows → column types
///   └──────────┘   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  unique values / numeric ranges → filter bounds
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  filter state + schema + rows → surviving rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  chart    │  chart configs + filtered rows → bounded series
///   └──────────┘
/// ```

pub mod chart;
pub mod classify;
pub mod demo;
pub mod filter;
pub mod loader;
pub mod schema;
pub mod stats;
pub mod value;

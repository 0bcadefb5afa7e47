//! Typed dashboards from untyped tables.
//!
//! A file (or demo template) is decoded into rows of loosely-typed cells,
//! every column gets a type from a sample of its values, and the
//! [`session::Session`] keeps the filter state and the chart series derived
//! from it. Rendering lives in the `autodash` binary.

pub mod data;
pub mod error;
pub mod session;
pub mod settings;

pub use error::LoadError;
pub use session::Session;
pub use settings::Settings;

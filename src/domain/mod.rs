//! Domain types used throughout the exporter.
//!
//! This module defines:
//!
//! - job selectors (`Round`, `Category`, `Job`)
//! - column metadata and cell values (`ColumnDescriptor`, `Scalar`)
//! - the resolved run configuration (`ExportConfig`)

pub mod types;

pub use types::*;

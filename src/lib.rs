//! `sandik` library crate.
//!
//! The binary (`sandik`) is a thin wrapper around this library so that:
//!
//! - schema reconciliation and CSV rendering are testable without network access
//! - the data source sits behind a trait and can be stubbed per endpoint

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod schema;

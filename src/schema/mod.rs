//! Schema reconciliation: the column registry, its ordering, and row mapping.
//!
//! - `registry`: display-name keyed descriptors + per-scope raw-key lookups
//! - `order`: deterministic report column order
//! - `mapper`: raw record -> canonical row

pub mod mapper;
pub mod order;
pub mod registry;

pub use mapper::*;
pub use order::*;
pub use registry::*;

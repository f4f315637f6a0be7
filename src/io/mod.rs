//! Input/output helpers.
//!
//! - schema cache read/write (`cache`)
//! - CSV report writer (`table`)
//! - report file naming + fixed-offset clock (`output`)

pub mod cache;
pub mod output;
pub mod table;

pub use cache::*;
pub use output::*;
pub use table::*;

//! Input/output helpers.
//!
//! - JSON catalog loading (`ingest`)
//! - output artifact write/read (`artifact`)
//! - flat CSV export of output records (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input records (`ConjunctionRecord`, `CatalogEntry`, `ElementSet`)
//! - intermediate geometry (`StateVector`, `GeodeticPosition`)
//! - the output row (`OutputRecord`)
//! - run configuration (`RunConfig`, `PresenceRule`, `SelectionPolicy`)

pub mod types;

pub use types::*;

//! `cdm-geo` library crate.
//!
//! Estimates where predicted satellite conjunctions happen: each conjunction
//! record is matched to its participants' element sets, both objects are
//! propagated to the time of closest approach, and one representative position
//! is converted to longitude/latitude/altitude for map display.
//!
//! The binary (`cdmgeo`) is a thin wrapper around this library so that the
//! pipeline is testable without spawning processes.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod domain;
pub mod error;
pub mod geo;
pub mod io;
pub mod propagation;
pub mod report;
pub mod resolve;

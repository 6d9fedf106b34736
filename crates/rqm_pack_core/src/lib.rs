//! rqm-pack core - packaging logic for the Render Queue Manager extension
//!
//! This crate contains everything needed to turn a checkout of the add-on
//! into a distributable archive, with zero CLI dependencies:
//! metadata parsing, configuration, logging, and the build pipeline.

pub mod config;
pub mod logging;
pub mod metadata;
pub mod orchestrator;
pub mod package;

pub use package::{inspect, package, BuildReport, BuildRequest, PackageMode};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Packaging pipeline for embeddable widgets.
//!
//! A widget source tree (manifest, entrypoint script, static assets) is staged
//! into a scratch working tree, transformed in a fixed order, and zipped into a
//! single deterministic archive.
pub mod archive;
pub mod cli;
pub mod config;
pub mod discover;
pub mod js;
pub mod pipeline;
pub mod stages;
pub mod staging;
pub mod util;
pub mod workflow;

pub use config::{BundleMode, LoggingStrictness, PackConfig};
pub use pipeline::{PackReport, Pipeline};

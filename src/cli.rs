//! CLI argument parsing for the widget packer.
//!
//! The CLI only translates flags into a [`ConfigLayer`]; defaults and
//! validation live in the config module so library callers get the same
//! behavior.
use crate::config::{BundleMode, ConfigLayer, LoggingStrictness};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "wpack",
    version,
    about = "Package a widget source tree into a deployable zip archive",
    after_help = "Examples:\n  wpack pack --mode production --widget-version 2.3.0\n  wpack pack --config wpack.json --secondary-dir dist\n  wpack strip-logging build --check",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Enable debug-level logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Pack(PackArgs),
    StripLogging(StripLoggingArgs),
}

/// Pack command inputs; every flag overrides the config file.
#[derive(Parser, Debug)]
#[command(about = "Run the packaging pipeline and write widget.zip")]
pub struct PackArgs {
    /// JSON config file (camelCase keys, e.g. widgetSourceDir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Widget source tree
    #[arg(long, value_name = "DIR")]
    pub widget_dir: Option<PathBuf>,

    /// Overlay tree merged on top of the widget source, e.g. compiled output
    #[arg(long, value_name = "DIR")]
    pub secondary_dir: Option<PathBuf>,

    /// Scratch tree rebuilt on every run
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Directory receiving widget.zip
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Entrypoint resolution mode
    #[arg(long, value_enum)]
    pub mode: Option<BundleMode>,

    /// Version stamped into the manifest and production entrypoint
    #[arg(long, value_name = "VERSION")]
    pub widget_version: Option<String>,

    /// Main build artifact name
    #[arg(long, value_name = "NAME")]
    pub build_artifact: Option<String>,

    /// Fallback URL for dev entrypoints
    #[arg(long, value_name = "URL")]
    pub dev_url: Option<String>,

    /// How aggressively leftover console references are replaced
    #[arg(long, value_enum)]
    pub logging_strictness: Option<LoggingStrictness>,
}

impl PackArgs {
    /// Flags as a config layer; unset flags leave lower layers alone.
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            widget_source_dir: self.widget_dir.clone(),
            secondary_source_dir: self.secondary_dir.clone(),
            working_dir: self.working_dir.clone(),
            output_dir: self.output_dir.clone(),
            bundle_mode: self.mode,
            version: self.widget_version.clone(),
            main_build_artifact_name: self.build_artifact.clone(),
            dev_entrypoint_url: self.dev_url.clone(),
            logging_strictness: self.logging_strictness,
            ..ConfigLayer::default()
        }
    }
}

/// Standalone logging removal over any directory.
#[derive(Parser, Debug)]
#[command(about = "Neutralize console logging calls in JavaScript files")]
pub struct StripLoggingArgs {
    /// Directory to process
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Report call sites without modifying files; exits non-zero if any remain
    #[arg(long)]
    pub check: bool,

    /// Glob selecting files (repeatable; prefix with ! to exclude)
    #[arg(long = "glob", value_name = "PATTERN")]
    pub globs: Vec<String>,

    /// How aggressively leftover console references are replaced
    #[arg(long, value_enum, default_value_t = LoggingStrictness::Namespace)]
    pub logging_strictness: LoggingStrictness,
}

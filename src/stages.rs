//! Concrete pipeline stages, in the order `pack()` runs them.
mod clean;
mod comments;
mod copy;
mod logging;
mod manifest;
mod script;

pub use clean::Clean;
pub use comments::CommentStrip;
pub use copy::{CopySource, SourceRole};
pub use logging::{scan_logging, strip_logging, FileLoggingReport, LoggingStrip, LoggingSummary};
pub use manifest::{stamp_manifest_version, ManifestTransform};
pub use script::{entrypoint_expression, inject_entrypoint, ScriptTransform, ENTRYPOINT_PLACEHOLDER};

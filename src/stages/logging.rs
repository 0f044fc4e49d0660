use crate::config::{LoggingStrictness, PackConfig};
use crate::discover::list_files;
use crate::js::logging::{LoggingRewrite, LoggingRewriter, LoggingStats};
use crate::pipeline::{Stage, StageOutcome};
use crate::staging::WorkingTree;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Per-file result of a logging scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLoggingReport {
    pub path: PathBuf,
    pub stats: LoggingStats,
}

/// Totals for a logging rewrite over a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSummary {
    pub scanned: usize,
    pub rewritten: usize,
    pub failed: Vec<PathBuf>,
    pub totals: LoggingStats,
}

fn rewrite_all(
    root: &Path,
    patterns: &[String],
    strictness: LoggingStrictness,
) -> Result<Vec<(PathBuf, Result<LoggingRewrite>)>> {
    let rewriter = LoggingRewriter::new(strictness)?;
    let files = list_files(root, patterns)?;
    let results = files
        .into_par_iter()
        .map(|path| {
            let rewrite = fs::read_to_string(&path)
                .with_context(|| format!("read {}", path.display()))
                .map(|source| rewriter.rewrite(&source));
            (path, rewrite)
        })
        .collect();
    Ok(results)
}

fn accumulate(totals: &mut LoggingStats, stats: &LoggingStats) {
    totals.calls_removed += stats.calls_removed;
    totals.calls_exempt += stats.calls_exempt;
    totals.references_replaced += stats.references_replaced;
    totals.namespaces_replaced += stats.namespaces_replaced;
}

/// Report logging call sites under `root` without modifying anything.
///
/// Only files the rewrite would change, or that carry exempt calls, are
/// listed. Unreadable files are logged and left out.
pub fn scan_logging(
    root: &Path,
    patterns: &[String],
    strictness: LoggingStrictness,
) -> Result<Vec<FileLoggingReport>> {
    let mut reports = Vec::new();
    for (path, rewrite) in rewrite_all(root, patterns, strictness)? {
        match rewrite {
            Ok(rewrite) if rewrite.stats.changed() || rewrite.stats.calls_exempt > 0 => {
                reports.push(FileLoggingReport {
                    path,
                    stats: rewrite.stats,
                });
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(path = %path.display(), "skipping file: {err:#}"),
        }
    }
    Ok(reports)
}

/// Neutralize logging calls in every matching file under `root`.
///
/// Reads and rewrites fan out in parallel; write-back happens after all reads
/// finish. A file that cannot be read or written is logged and counted in
/// `failed` without stopping the others.
pub fn strip_logging(
    root: &Path,
    patterns: &[String],
    strictness: LoggingStrictness,
) -> Result<LoggingSummary> {
    let mut summary = LoggingSummary::default();
    for (path, rewrite) in rewrite_all(root, patterns, strictness)? {
        summary.scanned += 1;
        let rewrite = match rewrite {
            Ok(rewrite) => rewrite,
            Err(err) => {
                tracing::warn!(path = %path.display(), "logging strip failed: {err:#}");
                summary.failed.push(path);
                continue;
            }
        };
        accumulate(&mut summary.totals, &rewrite.stats);
        if !rewrite.stats.changed() {
            continue;
        }
        match fs::write(&path, rewrite.text.as_bytes()) {
            Ok(()) => {
                tracing::debug!(
                    path = %path.display(),
                    calls = rewrite.stats.calls_removed,
                    exempt = rewrite.stats.calls_exempt,
                    "rewrote logging calls"
                );
                summary.rewritten += 1;
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "logging strip write failed: {err}");
                summary.failed.push(path);
            }
        }
    }
    Ok(summary)
}

/// Neutralize logging calls across the working tree.
pub struct LoggingStrip;

impl Stage for LoggingStrip {
    fn name(&self) -> &'static str {
        "strip-logging"
    }

    fn apply(&self, tree: &WorkingTree, config: &PackConfig) -> Result<StageOutcome> {
        let summary = strip_logging(
            tree.root(),
            &config.logging_globs,
            config.logging_strictness,
        )?;
        Ok(StageOutcome::applied(format!(
            "scanned {} files: {} rewritten, {} failed; {} calls removed, {} exempt",
            summary.scanned,
            summary.rewritten,
            summary.failed.len(),
            summary.totals.calls_removed,
            summary.totals.calls_exempt
        )))
    }
}

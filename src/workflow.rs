use crate::cli::{PackArgs, StripLoggingArgs};
use crate::config::{load_config_file, resolve_config, DEFAULT_LOGGING_GLOBS};
use crate::pipeline::Pipeline;
use crate::stages::{scan_logging, strip_logging};
use crate::util::{display_path, format_kib};
use anyhow::{anyhow, Result};
use std::env;

pub fn run_pack(args: PackArgs) -> Result<()> {
    let mut layers = Vec::new();
    if let Some(path) = args.config.as_deref() {
        layers.push(load_config_file(path)?);
    }
    layers.push(args.overrides());
    let config = resolve_config(layers)?;

    let pipeline = Pipeline::new(config)?;
    let report = pipeline.pack()?;

    let cwd = env::current_dir().ok();
    println!(
        "archive: {}",
        display_path(&report.archive.path, cwd.as_deref())
    );
    println!(
        "size: {} ({} files)",
        format_kib(report.archive.size_bytes),
        report.archive.entries
    );
    Ok(())
}

pub fn run_strip_logging(args: StripLoggingArgs) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(anyhow!("{} is not a directory", args.dir.display()));
    }
    let globs: Vec<String> = if args.globs.is_empty() {
        DEFAULT_LOGGING_GLOBS.iter().map(|s| s.to_string()).collect()
    } else {
        args.globs.clone()
    };

    if args.check {
        let reports = scan_logging(&args.dir, &globs, args.logging_strictness)?;
        let mut pending = 0;
        for report in &reports {
            let stats = &report.stats;
            println!(
                "{}: {} calls, {} exempt, {} references, {} namespace tokens",
                display_path(&report.path, Some(args.dir.as_path())),
                stats.calls_removed,
                stats.calls_exempt,
                stats.references_replaced,
                stats.namespaces_replaced
            );
            if stats.changed() {
                pending += 1;
            }
        }
        if pending > 0 {
            return Err(anyhow!("{pending} files contain removable logging calls"));
        }
        return Ok(());
    }

    let summary = strip_logging(&args.dir, &globs, args.logging_strictness)?;
    println!(
        "scanned {} files, rewrote {}, {} calls removed, {} exempt",
        summary.scanned,
        summary.rewritten,
        summary.totals.calls_removed,
        summary.totals.calls_exempt
    );
    if !summary.failed.is_empty() {
        return Err(anyhow!(
            "{} files could not be processed",
            summary.failed.len()
        ));
    }
    Ok(())
}

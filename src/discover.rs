//! Glob-based file discovery under a root directory.
//!
//! Patterns follow the usual include/exclude convention: plain patterns select
//! files, patterns prefixed with `!` remove files from the selection. Matching
//! is done against the `/`-separated path relative to the root.
use crate::staging::rel_slash_path;
use anyhow::{anyhow, Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiled include/exclude pattern set.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: GlobSet,
    exclude: GlobSet,
}

impl FileMatcher {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let (builder, raw) = match pattern.strip_prefix('!') {
                Some(rest) => (&mut exclude, rest),
                None => (&mut include, pattern),
            };
            if raw.is_empty() {
                return Err(anyhow!("empty glob pattern {pattern:?}"));
            }
            let glob = GlobBuilder::new(raw)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid glob pattern {pattern:?}"))?;
            builder.add(glob);
        }
        Ok(Self {
            include: include.build().context("build include glob set")?,
            exclude: exclude.build().context("build exclude glob set")?,
        })
    }

    pub fn is_match(&self, rel_path: &str) -> bool {
        self.include.is_match(rel_path) && !self.exclude.is_match(rel_path)
    }
}

/// List files under `root` selected by `patterns`, sorted by relative path.
///
/// A missing root yields an empty list.
pub fn list_files<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Vec<PathBuf>> {
    let matcher = FileMatcher::new(patterns)?;
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = rel_slash_path(root, entry.path())?;
        if matcher.is_match(&rel) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

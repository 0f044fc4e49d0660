//! Archive assembly.
//!
//! The archive is built in memory from the working tree and written to
//! `<output_dir>/widget.zip` through a temp file in the same directory, so a
//! failed run never leaves a truncated archive behind. Entries are sorted and
//! carry a fixed timestamp, which makes repeated packs of the same tree
//! byte-identical.
use crate::discover::list_files;
use crate::staging::rel_slash_path;
use crate::util::format_kib;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const ARCHIVE_FILE_NAME: &str = "widget.zip";

/// Everything except zip files, at any depth.
const ARCHIVE_PATTERNS: [&str; 2] = ["**", "!**/*.zip"];

const DEFLATE_MAX_LEVEL: i64 = 9;

/// One file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// `/`-separated path relative to the working tree.
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ArchiveReport {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub entries: usize,
}

/// Final archive location; depends on nothing but `output_dir`.
pub fn resolve_archive_path(output_dir: &Path) -> PathBuf {
    output_dir.join(ARCHIVE_FILE_NAME)
}

/// Read every archivable file under `root`, sorted by entry name.
pub fn collect_entries(root: &Path) -> Result<Vec<ArchiveEntry>> {
    let files = list_files(root, &ARCHIVE_PATTERNS)?;
    let mut entries = files
        .par_iter()
        .map(|path| -> Result<ArchiveEntry> {
            let name = rel_slash_path(root, path)?;
            let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
            Ok(ArchiveEntry { name, bytes })
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Encode entries as a zip archive, DEFLATE at maximum compression.
pub fn encode_archive(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(DEFLATE_MAX_LEVEL))
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);
    for entry in entries {
        zip.start_file(entry.name.as_str(), options)
            .with_context(|| format!("add {} to archive", entry.name))?;
        zip.write_all(&entry.bytes)
            .with_context(|| format!("write {} to archive", entry.name))?;
    }
    let cursor = zip.finish().context("finalize archive")?;
    Ok(cursor.into_inner())
}

/// Archive the working tree at `root` into `<output_dir>/widget.zip`.
pub fn write_archive(root: &Path, output_dir: &Path) -> Result<ArchiveReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir {}", output_dir.display()))?;
    let path = resolve_archive_path(output_dir);

    let entries = collect_entries(root)?;
    let bytes = encode_archive(&entries)?;

    let mut tmp = tempfile::NamedTempFile::new_in(output_dir)
        .with_context(|| format!("create temp archive in {}", output_dir.display()))?;
    tmp.write_all(&bytes).context("write temp archive")?;
    tmp.persist(&path)
        .map_err(|err| err.error)
        .with_context(|| format!("write {}", path.display()))?;

    let size_bytes = fs::metadata(&path)
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    tracing::info!(
        path = %path.display(),
        entries = entries.len(),
        size = %format_kib(size_bytes),
        "archive ready"
    );
    Ok(ArchiveReport {
        path,
        size_bytes,
        entries: entries.len(),
    })
}

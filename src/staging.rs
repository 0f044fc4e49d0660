//! Working-tree filesystem primitives.
//!
//! Every stage touches disk through these helpers so paths are always joined
//! against an explicit root and every failure names the path involved.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scratch directory owned by a single pipeline run.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
}

impl WorkingTree {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute-or-cwd-relative path of `rel_path` inside the tree.
    pub fn path(&self, rel_path: &str) -> PathBuf {
        self.root.join(rel_path)
    }

    pub fn is_file(&self, rel_path: &str) -> bool {
        self.path(rel_path).is_file()
    }

    pub fn read_text(&self, rel_path: &str) -> Result<String> {
        let path = self.path(rel_path);
        fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))
    }

    pub fn write_text(&self, rel_path: &str, text: &str) -> Result<()> {
        write_staged_text(&self.root, rel_path, text)
    }
}

pub fn write_staged_bytes(staging_root: &Path, rel_path: &str, bytes: &[u8]) -> Result<()> {
    let staging_path = staging_root.join(rel_path);
    if let Some(parent) = staging_path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&staging_path, bytes).with_context(|| format!("write {}", staging_path.display()))?;
    Ok(())
}

pub fn write_staged_text(staging_root: &Path, rel_path: &str, text: &str) -> Result<()> {
    write_staged_bytes(staging_root, rel_path, text.as_bytes())?;
    Ok(())
}

/// Remove `root` recursively. Returns whether anything was removed.
pub fn remove_tree(root: &Path) -> Result<bool> {
    if !root.exists() {
        return Ok(false);
    }
    if root.is_dir() {
        fs::remove_dir_all(root).with_context(|| format!("remove {}", root.display()))?;
    } else {
        fs::remove_file(root).with_context(|| format!("remove {}", root.display()))?;
    }
    Ok(true)
}

/// Copy every file under `source` into `dest`, preserving relative paths and
/// overwriting files that already exist. Returns the number of files copied.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walk {}", source.display()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .context("strip source prefix")?;
        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_context(|| format!("create {}", target.display()))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            fs::copy(entry.path(), &target).with_context(|| {
                format!("copy {} to {}", entry.path().display(), target.display())
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Relative path of `path` under `root`, always using `/` separators.
pub fn rel_slash_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is not under {}", path.display(), root.display()))?;
    let parts: Vec<String> = rel
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

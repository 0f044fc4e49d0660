use std::path::Path;

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

/// Size rounded to the nearest KB, e.g. `12 KB`.
pub fn format_kib(bytes: u64) -> String {
    format!("{} KB", (bytes + 512) / 1024)
}

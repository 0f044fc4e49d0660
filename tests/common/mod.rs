//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use widget_pack::PackConfig;

/// Throwaway project layout: `widget/`, `dist/`, `build/`, `output/`.
pub struct WidgetFixture {
    pub temp: TempDir,
}

impl WidgetFixture {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("create temp dir");
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn widget_dir(&self) -> PathBuf {
        self.root().join("widget")
    }

    pub fn secondary_dir(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn working_dir(&self) -> PathBuf {
        self.root().join("build")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("output")
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(&path, contents.as_bytes()).expect("write file");
    }

    /// Minimal widget with a manifest and an entrypoint script.
    pub fn with_minimal_widget(self) -> Self {
        self.write(
            "widget/manifest.json",
            r#"{"widget":{"version":"0.0.1","name":"x"}}"#,
        );
        self.write("widget/script.js", "\"@entrypoint@\"");
        self
    }

    pub fn config(&self) -> PackConfig {
        PackConfig {
            widget_source_dir: self.widget_dir(),
            secondary_source_dir: Some(self.secondary_dir()),
            working_dir: self.working_dir(),
            output_dir: self.output_dir(),
            debug_override_key: "rsDebugUrl_fixture".to_string(),
            ..PackConfig::default()
        }
    }
}

/// Entry name to UTF-8 content for every file in a zip archive.
pub fn read_archive(path: &Path) -> BTreeMap<String, String> {
    let bytes = fs::read(path).expect("read archive");
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index).expect("archive entry");
        let mut text = String::new();
        file.read_to_string(&mut text).expect("read entry");
        entries.insert(file.name().to_string(), text);
    }
    entries
}

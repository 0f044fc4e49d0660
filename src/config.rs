//! Pack configuration.
//!
//! The config is resolved once from built-in defaults, an optional JSON file,
//! and CLI overrides (in that order), validated, and then frozen for the
//! lifetime of a pipeline.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_WIDGET_SOURCE_DIR: &str = "./widget";
pub const DEFAULT_WORKING_DIR: &str = "./build";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_ENTRYPOINT_SCRIPT: &str = "script.js";
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";
pub const DEFAULT_BUILD_ARTIFACT: &str = "build.js";
pub const DEFAULT_DEV_ENTRYPOINT_URL: &str = "https://localhost:3000/";
pub const DEFAULT_LOGGING_GLOBS: [&str; 3] = ["**/*.js", "**/*.mjs", "**/*.cjs"];

const DEBUG_KEY_PREFIX: &str = "rsDebugUrl_";

/// Entrypoint resolution behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BundleMode {
    /// Entrypoint honors a runtime override stored in `localStorage`.
    #[default]
    Dev,
    /// Entrypoint is pinned to the versioned build artifact.
    Production,
}

impl BundleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BundleMode::Dev => "dev",
            BundleMode::Production => "production",
        }
    }
}

/// How far logging removal goes past rewriting whole call expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoggingStrictness {
    /// Rewrite complete call expressions only.
    Calls,
    /// Also replace leftover `console.<method>` references with `true`.
    References,
    /// Also replace any leftover bare `console` token with `true`.
    #[default]
    Namespace,
}

/// Immutable configuration consumed by every stage.
#[derive(Debug, Clone)]
pub struct PackConfig {
    pub widget_source_dir: PathBuf,
    pub secondary_source_dir: Option<PathBuf>,
    pub working_dir: PathBuf,
    pub output_dir: PathBuf,
    pub bundle_mode: BundleMode,
    pub version: String,
    pub entrypoint_script_name: String,
    pub manifest_file_name: String,
    pub main_build_artifact_name: String,
    pub dev_entrypoint_url: String,
    /// Storage key consulted by dev entrypoints; unique per pipeline.
    pub debug_override_key: String,
    pub logging_strictness: LoggingStrictness,
    pub logging_globs: Vec<String>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            widget_source_dir: PathBuf::from(DEFAULT_WIDGET_SOURCE_DIR),
            secondary_source_dir: None,
            working_dir: PathBuf::from(DEFAULT_WORKING_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            bundle_mode: BundleMode::default(),
            version: DEFAULT_VERSION.to_string(),
            entrypoint_script_name: DEFAULT_ENTRYPOINT_SCRIPT.to_string(),
            manifest_file_name: DEFAULT_MANIFEST_FILE.to_string(),
            main_build_artifact_name: DEFAULT_BUILD_ARTIFACT.to_string(),
            dev_entrypoint_url: DEFAULT_DEV_ENTRYPOINT_URL.to_string(),
            debug_override_key: generate_debug_key(),
            logging_strictness: LoggingStrictness::default(),
            logging_globs: DEFAULT_LOGGING_GLOBS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Generate a fresh `rsDebugUrl_<id>` storage key.
pub fn generate_debug_key() -> String {
    format!("{DEBUG_KEY_PREFIX}{}", uuid::Uuid::new_v4().simple())
}

/// One layer of optional settings; used for both the JSON file and CLI flags.
///
/// `widgetDir` and `bundleType` are accepted as legacy key aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default, alias = "widgetDir")]
    pub widget_source_dir: Option<PathBuf>,
    #[serde(default)]
    pub secondary_source_dir: Option<PathBuf>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default, alias = "bundleType")]
    pub bundle_mode: Option<BundleMode>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub entrypoint_script_name: Option<String>,
    #[serde(default)]
    pub manifest_file_name: Option<String>,
    #[serde(default)]
    pub main_build_artifact_name: Option<String>,
    #[serde(default)]
    pub dev_entrypoint_url: Option<String>,
    #[serde(default)]
    pub debug_override_key: Option<String>,
    #[serde(default)]
    pub logging_strictness: Option<LoggingStrictness>,
    #[serde(default)]
    pub logging_globs: Option<Vec<String>>,
}

impl ConfigLayer {
    /// Rebase relative directory settings onto `base`.
    fn rebased(mut self, base: &Path) -> Self {
        let rebase = |path: &mut Option<PathBuf>| {
            if let Some(value) = path.as_mut() {
                if value.is_relative() {
                    *value = base.join(&*value);
                }
            }
        };
        rebase(&mut self.widget_source_dir);
        rebase(&mut self.secondary_source_dir);
        rebase(&mut self.working_dir);
        rebase(&mut self.output_dir);
        self
    }

    fn apply_to(self, config: &mut PackConfig) {
        if let Some(value) = self.widget_source_dir {
            config.widget_source_dir = value;
        }
        if let Some(value) = self.secondary_source_dir {
            config.secondary_source_dir = Some(value);
        }
        if let Some(value) = self.working_dir {
            config.working_dir = value;
        }
        if let Some(value) = self.output_dir {
            config.output_dir = value;
        }
        if let Some(value) = self.bundle_mode {
            config.bundle_mode = value;
        }
        if let Some(value) = self.version {
            config.version = value;
        }
        if let Some(value) = self.entrypoint_script_name {
            config.entrypoint_script_name = value;
        }
        if let Some(value) = self.manifest_file_name {
            config.manifest_file_name = value;
        }
        if let Some(value) = self.main_build_artifact_name {
            config.main_build_artifact_name = value;
        }
        if let Some(value) = self.dev_entrypoint_url {
            config.dev_entrypoint_url = value;
        }
        if let Some(value) = self.debug_override_key {
            config.debug_override_key = value;
        }
        if let Some(value) = self.logging_strictness {
            config.logging_strictness = value;
        }
        if let Some(value) = self.logging_globs {
            config.logging_globs = value;
        }
    }
}

/// Load a config layer from a JSON file.
///
/// Relative directories in the file resolve against the file's own directory.
pub fn load_config_file(path: &Path) -> Result<ConfigLayer> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let layer: ConfigLayer = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(layer.rebased(base))
}

/// Resolve the final config from layers applied over the defaults.
pub fn resolve_config(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<PackConfig> {
    let mut config = PackConfig::default();
    for layer in layers {
        layer.apply_to(&mut config);
    }
    validate_config(&config)?;
    Ok(config)
}

/// Reject configs whose values would produce a broken package.
pub fn validate_config(config: &PackConfig) -> Result<()> {
    if config.version.trim().is_empty() {
        return Err(anyhow!("version must not be empty"));
    }
    if config.version.chars().any(char::is_whitespace) {
        return Err(anyhow!(
            "version {:?} must not contain whitespace",
            config.version
        ));
    }
    for (label, name) in [
        ("entrypointScriptName", &config.entrypoint_script_name),
        ("manifestFileName", &config.manifest_file_name),
        ("mainBuildArtifactName", &config.main_build_artifact_name),
    ] {
        validate_relative_name(label, name)?;
    }
    if config.dev_entrypoint_url.trim().is_empty() {
        return Err(anyhow!("devEntrypointUrl must not be empty"));
    }
    for (label, value) in [
        ("debugOverrideKey", &config.debug_override_key),
        ("devEntrypointUrl", &config.dev_entrypoint_url),
    ] {
        // Both are spliced into a single-quoted JS string inside a template literal.
        if value.contains(&['\'', '\\', '`', '\n', '\r'][..]) {
            return Err(anyhow!(
                "{label} {value:?} contains characters not allowed in a JS string literal"
            ));
        }
    }
    if config.debug_override_key.is_empty() {
        return Err(anyhow!("debugOverrideKey must not be empty"));
    }
    if config.logging_globs.is_empty() {
        return Err(anyhow!("loggingGlobs must name at least one pattern"));
    }
    validate_working_dir(config)?;
    Ok(())
}

/// The working tree is wiped on every run, so it must not overlap a source tree.
fn validate_working_dir(config: &PackConfig) -> Result<()> {
    let working = normalize_path(&config.working_dir);
    let sources = [
        Some(("widgetSourceDir", &config.widget_source_dir)),
        config
            .secondary_source_dir
            .as_ref()
            .map(|dir| ("secondarySourceDir", dir)),
    ];
    for (label, dir) in sources.into_iter().flatten() {
        let source = normalize_path(dir);
        if source.starts_with(&working) {
            return Err(anyhow!(
                "workingDir {} must not contain {label} {}",
                config.working_dir.display(),
                dir.display()
            ));
        }
        if working.starts_with(&source) {
            return Err(anyhow!(
                "workingDir {} must not be inside {label} {}",
                config.working_dir.display(),
                dir.display()
            ));
        }
    }
    Ok(())
}

/// Absolute form of `path` with `.`/`..` folded and symlinks resolved on the
/// part of the path that exists.
fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut lexical = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                lexical.pop();
            }
            other => lexical.push(other),
        }
    }

    let mut existing = lexical.as_path();
    let mut missing: Vec<OsString> = Vec::new();
    loop {
        if let Ok(real) = fs::canonicalize(existing) {
            let mut resolved = real;
            resolved.extend(missing.iter().rev());
            return resolved;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return lexical,
        }
    }
}

fn validate_relative_name(label: &str, name: &str) -> Result<()> {
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|component| !matches!(component, Component::Normal(_)));
    if name.is_empty() || escapes {
        return Err(anyhow!(
            "{label} {name:?} must be a relative path inside the widget tree"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(path, contents.as_bytes()).expect("write file");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = PackConfig::default();
        assert_eq!(config.working_dir, PathBuf::from("./build"));
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.bundle_mode, BundleMode::Dev);
        assert_eq!(config.version, "latest");
        assert_eq!(config.main_build_artifact_name, "build.js");
        assert_eq!(config.logging_strictness, LoggingStrictness::Namespace);
        assert!(config.debug_override_key.starts_with("rsDebugUrl_"));
    }

    #[test]
    fn debug_key_differs_between_configs() {
        let first = PackConfig::default();
        let second = PackConfig::default();
        assert_ne!(first.debug_override_key, second.debug_override_key);
    }

    #[test]
    fn later_layers_override_earlier_ones() {
        let file = ConfigLayer {
            version: Some("1.0.0".to_string()),
            bundle_mode: Some(BundleMode::Production),
            ..ConfigLayer::default()
        };
        let cli = ConfigLayer {
            version: Some("2.0.0".to_string()),
            ..ConfigLayer::default()
        };
        let config = resolve_config([file, cli]).expect("resolve config");
        assert_eq!(config.version, "2.0.0");
        assert_eq!(config.bundle_mode, BundleMode::Production);
    }

    #[test]
    fn config_file_paths_resolve_against_file_dir() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("conf").join("wpack.json");
        write_file(
            &path,
            r#"{"widgetSourceDir": "src", "outputDir": "/abs/out", "bundleMode": "production"}"#,
        );
        let layer = load_config_file(&path).expect("load config");
        assert_eq!(
            layer.widget_source_dir,
            Some(temp.path().join("conf").join("src"))
        );
        assert_eq!(layer.output_dir, Some(PathBuf::from("/abs/out")));
        assert_eq!(layer.bundle_mode, Some(BundleMode::Production));
    }

    #[test]
    fn config_file_accepts_legacy_option_names() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("wpack.json");
        write_file(&path, r#"{"widgetDir": "./widget", "bundleType": "production"}"#);
        let layer = load_config_file(&path).expect("load config");
        assert_eq!(layer.bundle_mode, Some(BundleMode::Production));
        assert!(layer.widget_source_dir.is_some());
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("wpack.json");
        write_file(&path, r#"{"zipLevel": 3}"#);
        let err = load_config_file(&path).expect_err("unknown key should fail");
        assert!(err.to_string().contains("parse config JSON"));
    }

    #[test]
    fn rejects_empty_version_and_escaping_names() {
        let config = PackConfig {
            version: " ".to_string(),
            ..PackConfig::default()
        };
        assert!(validate_config(&config).is_err());

        let config = PackConfig {
            manifest_file_name: "../manifest.json".to_string(),
            ..PackConfig::default()
        };
        let err = validate_config(&config).expect_err("escaping name should fail");
        assert!(err.to_string().contains("manifestFileName"));
    }

    #[test]
    fn rejects_debug_key_that_breaks_string_literal() {
        let config = PackConfig {
            debug_override_key: "it's".to_string(),
            ..PackConfig::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_dev_url_that_closes_the_template() {
        let config = PackConfig {
            dev_entrypoint_url: "https://localhost:3000/`+x+`".to_string(),
            ..PackConfig::default()
        };
        let err = validate_config(&config).expect_err("backtick should fail");
        assert!(err.to_string().contains("devEntrypointUrl"));
    }

    fn config_with_dirs(root: &Path, widget: &str, working: &str) -> PackConfig {
        PackConfig {
            widget_source_dir: root.join(widget),
            secondary_source_dir: Some(root.join("dist")),
            working_dir: root.join(working),
            ..PackConfig::default()
        }
    }

    #[test]
    fn rejects_working_dir_overlapping_sources() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let root = temp.path();
        fs::create_dir_all(root.join("widget")).expect("create widget dir");
        fs::create_dir_all(root.join("dist")).expect("create dist dir");

        for working in ["widget", ".", "widget/build", "dist", "build/../widget"] {
            let config = config_with_dirs(root, "widget", working);
            let err = validate_config(&config).expect_err(working);
            assert!(err.to_string().contains("workingDir"), "{working}: {err}");
        }

        let config = config_with_dirs(root, "widget", "build");
        validate_config(&config).expect("sibling working dir is fine");
    }

    #[test]
    fn normalize_folds_dot_segments_of_missing_paths() {
        assert_eq!(
            normalize_path(Path::new("/wpack-missing/a/./b/../c")),
            PathBuf::from("/wpack-missing/a/c")
        );
    }
}

use crate::config::{BundleMode, PackConfig};
use crate::pipeline::{Stage, StageOutcome};
use crate::staging::WorkingTree;
use anyhow::{Context, Result};
use std::fs;

/// Literal token in the entrypoint script replaced at pack time.
pub const ENTRYPOINT_PLACEHOLDER: &str = "@entrypoint@";

/// The text substituted for [`ENTRYPOINT_PLACEHOLDER`].
///
/// Dev entrypoints are interpolated into a template literal and prefer the
/// URL stored under the debug key, so a developer can point a deployed widget
/// at a local server. Production entrypoints pin the versioned build artifact.
pub fn entrypoint_expression(config: &PackConfig) -> String {
    match config.bundle_mode {
        BundleMode::Dev => format!(
            "${{localStorage['{}'] || '{}'}}",
            config.debug_override_key, config.dev_entrypoint_url
        ),
        BundleMode::Production => format!(
            "./{}?version={}",
            config.main_build_artifact_name, config.version
        ),
    }
}

/// Replace the first placeholder. `None` when the script has no placeholder.
pub fn inject_entrypoint(script: &str, config: &PackConfig) -> Option<String> {
    if !script.contains(ENTRYPOINT_PLACEHOLDER) {
        return None;
    }
    Some(script.replacen(ENTRYPOINT_PLACEHOLDER, &entrypoint_expression(config), 1))
}

/// Rewrite the entrypoint script from the source tree into the working tree.
pub struct ScriptTransform;

impl Stage for ScriptTransform {
    fn name(&self) -> &'static str {
        "script"
    }

    fn apply(&self, tree: &WorkingTree, config: &PackConfig) -> Result<StageOutcome> {
        let source_path = config
            .widget_source_dir
            .join(&config.entrypoint_script_name);
        let script = fs::read_to_string(&source_path)
            .with_context(|| format!("read entrypoint script {}", source_path.display()))?;

        let (text, summary) = match inject_entrypoint(&script, config) {
            Some(text) => (
                text,
                format!(
                    "injected {} entrypoint into {}",
                    config.bundle_mode.as_str(),
                    config.entrypoint_script_name
                ),
            ),
            None => (
                script,
                format!(
                    "{ENTRYPOINT_PLACEHOLDER} not found in {}; copied unchanged",
                    config.entrypoint_script_name
                ),
            ),
        };
        tree.write_text(&config.entrypoint_script_name, &text)?;
        Ok(StageOutcome::applied(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::write_staged_text;

    fn config(mode: BundleMode) -> PackConfig {
        PackConfig {
            bundle_mode: mode,
            version: "2.3.0".to_string(),
            debug_override_key: "rsDebugUrl_test".to_string(),
            ..PackConfig::default()
        }
    }

    #[test]
    fn dev_entrypoint_prefers_override_then_dev_url() {
        let script = "load(`@entrypoint@`);";
        let text = inject_entrypoint(script, &config(BundleMode::Dev)).expect("placeholder");
        assert_eq!(
            text,
            "load(`${localStorage['rsDebugUrl_test'] || 'https://localhost:3000/'}`);"
        );
    }

    #[test]
    fn production_entrypoint_pins_version() {
        let text = inject_entrypoint("\"@entrypoint@\"", &config(BundleMode::Production))
            .expect("placeholder");
        assert_eq!(text, "\"./build.js?version=2.3.0\"");
    }

    #[test]
    fn only_first_placeholder_is_replaced() {
        let text = inject_entrypoint("@entrypoint@ @entrypoint@", &config(BundleMode::Production))
            .expect("placeholder");
        assert_eq!(text, "./build.js?version=2.3.0 @entrypoint@");
    }

    #[test]
    fn reads_source_tree_not_staged_copy() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = PackConfig {
            widget_source_dir: temp.path().join("widget"),
            ..config(BundleMode::Production)
        };
        write_staged_text(&config.widget_source_dir, "script.js", "go('@entrypoint@')")
            .expect("write source");
        let tree = WorkingTree::new(temp.path().join("build"));
        tree.write_text("script.js", "stale staged copy").expect("write stale");

        ScriptTransform.apply(&tree, &config).expect("transform");

        assert_eq!(
            tree.read_text("script.js").expect("read"),
            "go('./build.js?version=2.3.0')"
        );
    }

    #[test]
    fn missing_placeholder_passes_text_through() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = PackConfig {
            widget_source_dir: temp.path().join("widget"),
            ..config(BundleMode::Dev)
        };
        write_staged_text(&config.widget_source_dir, "script.js", "define([], f);")
            .expect("write source");
        let tree = WorkingTree::new(temp.path().join("build"));

        let outcome = ScriptTransform.apply(&tree, &config).expect("transform");

        assert_eq!(tree.read_text("script.js").expect("read"), "define([], f);");
        assert!(outcome.summary.contains("copied unchanged"));
    }

    #[test]
    fn missing_entrypoint_is_fatal() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = PackConfig {
            widget_source_dir: temp.path().join("widget"),
            ..config(BundleMode::Dev)
        };
        let tree = WorkingTree::new(temp.path().join("build"));

        let err = ScriptTransform
            .apply(&tree, &config)
            .expect_err("missing script");

        assert!(err.to_string().contains("read entrypoint script"));
    }
}

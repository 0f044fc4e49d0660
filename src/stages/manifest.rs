use crate::config::PackConfig;
use crate::pipeline::{Stage, StageOutcome};
use crate::staging::WorkingTree;
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;

/// Set `widget.version` and re-serialize with 2-space indentation.
///
/// Every other field, including key order, passes through unchanged.
pub fn stamp_manifest_version(text: &str, version: &str) -> Result<String> {
    let mut manifest: Value = serde_json::from_str(text).context("parse manifest JSON")?;
    let widget = manifest
        .get_mut("widget")
        .ok_or_else(|| anyhow!("manifest has no \"widget\" key"))?
        .as_object_mut()
        .ok_or_else(|| anyhow!("manifest \"widget\" is not an object"))?;
    widget.insert("version".to_string(), Value::String(version.to_string()));
    let mut out = serde_json::to_string_pretty(&manifest).context("serialize manifest")?;
    out.push('\n');
    Ok(out)
}

/// Stamp the configured version into the manifest from the source tree.
pub struct ManifestTransform;

impl Stage for ManifestTransform {
    fn name(&self) -> &'static str {
        "manifest"
    }

    fn apply(&self, tree: &WorkingTree, config: &PackConfig) -> Result<StageOutcome> {
        let source_path = config.widget_source_dir.join(&config.manifest_file_name);
        let text = fs::read_to_string(&source_path)
            .with_context(|| format!("read manifest {}", source_path.display()))?;
        let stamped = stamp_manifest_version(&text, &config.version)
            .with_context(|| format!("stamp manifest {}", source_path.display()))?;
        tree.write_text(&config.manifest_file_name, &stamped)?;
        Ok(StageOutcome::applied(format!(
            "set widget.version = {} in {}",
            config.version, config.manifest_file_name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::write_staged_text;

    #[test]
    fn stamps_version_and_keeps_other_fields_in_order() {
        let input = r#"{"widget":{"name":"x","version":"0.0.1","code":"abc"},"locale":["ru","en"],"interface_version":2}"#;
        let stamped = stamp_manifest_version(input, "2.3.0").expect("stamp");
        assert_eq!(
            stamped,
            concat!(
                "{\n",
                "  \"widget\": {\n",
                "    \"name\": \"x\",\n",
                "    \"version\": \"2.3.0\",\n",
                "    \"code\": \"abc\"\n",
                "  },\n",
                "  \"locale\": [\n",
                "    \"ru\",\n",
                "    \"en\"\n",
                "  ],\n",
                "  \"interface_version\": 2\n",
                "}\n",
            )
        );
    }

    #[test]
    fn adds_version_when_widget_lacks_one() {
        let stamped = stamp_manifest_version(r#"{"widget":{}}"#, "1.0.0").expect("stamp");
        let value: Value = serde_json::from_str(&stamped).expect("parse");
        assert_eq!(value["widget"]["version"], "1.0.0");
    }

    #[test]
    fn missing_widget_key_is_fatal() {
        let err = stamp_manifest_version(r#"{"name":"x"}"#, "1.0.0").expect_err("no widget");
        assert!(err.to_string().contains("no \"widget\" key"));
        assert!(stamp_manifest_version(r#"{"widget":"x"}"#, "1.0.0").is_err());
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = stamp_manifest_version("{\"widget\":", "1.0.0").expect_err("bad json");
        assert!(err.to_string().contains("parse manifest JSON"));
    }

    #[test]
    fn overwrites_staged_manifest_from_source() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let config = PackConfig {
            widget_source_dir: temp.path().join("widget"),
            version: "9.9.9".to_string(),
            ..PackConfig::default()
        };
        write_staged_text(
            &config.widget_source_dir,
            "manifest.json",
            r#"{"widget":{"version":"0.0.1"}}"#,
        )
        .expect("write source");
        let tree = WorkingTree::new(temp.path().join("build"));
        tree.write_text("manifest.json", "not json").expect("write stale");

        ManifestTransform.apply(&tree, &config).expect("transform");

        let value: Value =
            serde_json::from_str(&tree.read_text("manifest.json").expect("read")).expect("parse");
        assert_eq!(value["widget"]["version"], "9.9.9");
    }
}

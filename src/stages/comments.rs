use crate::config::PackConfig;
use crate::js::comments::strip_comments;
use crate::pipeline::{Stage, StageOutcome};
use crate::staging::WorkingTree;
use anyhow::Result;

/// Strip comments from the main build artifact when one was staged.
pub struct CommentStrip;

impl Stage for CommentStrip {
    fn name(&self) -> &'static str {
        "strip-comments"
    }

    fn apply(&self, tree: &WorkingTree, config: &PackConfig) -> Result<StageOutcome> {
        let artifact = &config.main_build_artifact_name;
        if !tree.is_file(artifact) {
            return Ok(StageOutcome::skipped(format!("{artifact} not present")));
        }
        let source = tree.read_text(artifact)?;
        let stripped = strip_comments(&source);
        tree.write_text(artifact, &stripped.text)?;
        Ok(StageOutcome::applied(format!(
            "removed {} comments from {artifact} ({} -> {} bytes)",
            stripped.removed,
            source.len(),
            stripped.text.len()
        )))
    }
}

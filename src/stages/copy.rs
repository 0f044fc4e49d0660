use crate::config::PackConfig;
use crate::pipeline::{Stage, StageOutcome};
use crate::staging::{copy_tree, WorkingTree};
use anyhow::Result;
use std::path::Path;

/// Which configured source tree a [`CopySource`] stage stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    Primary,
    /// Overlay merged after the primary tree; wins on path collisions.
    Secondary,
}

/// Copy a source tree into the working tree. A missing source is a no-op.
pub struct CopySource {
    role: SourceRole,
}

impl CopySource {
    pub fn new(role: SourceRole) -> Self {
        Self { role }
    }

    fn source<'a>(&self, config: &'a PackConfig) -> Option<&'a Path> {
        match self.role {
            SourceRole::Primary => Some(config.widget_source_dir.as_path()),
            SourceRole::Secondary => config.secondary_source_dir.as_deref(),
        }
    }
}

impl Stage for CopySource {
    fn name(&self) -> &'static str {
        match self.role {
            SourceRole::Primary => "stage-primary",
            SourceRole::Secondary => "stage-secondary",
        }
    }

    fn apply(&self, tree: &WorkingTree, config: &PackConfig) -> Result<StageOutcome> {
        let Some(source) = self.source(config) else {
            return Ok(StageOutcome::skipped("no source tree configured"));
        };
        if !source.is_dir() {
            tracing::debug!(source = %source.display(), "source tree missing");
            return Ok(StageOutcome::skipped(format!(
                "source tree {} not found",
                source.display()
            )));
        }
        let copied = copy_tree(source, tree.root())?;
        Ok(StageOutcome::applied(format!(
            "copied {copied} files from {}",
            source.display()
        )))
    }
}

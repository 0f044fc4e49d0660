use crate::config::PackConfig;
use crate::pipeline::{Stage, StageOutcome};
use crate::staging::{remove_tree, WorkingTree};
use anyhow::{Context, Result};
use std::fs;

/// Drop the working tree and recreate it empty.
pub struct Clean;

impl Stage for Clean {
    fn name(&self) -> &'static str {
        "clean"
    }

    fn apply(&self, tree: &WorkingTree, _config: &PackConfig) -> Result<StageOutcome> {
        let removed = remove_tree(tree.root())?;
        fs::create_dir_all(tree.root())
            .with_context(|| format!("create {}", tree.root().display()))?;
        let verb = if removed { "recreated" } else { "created" };
        Ok(StageOutcome::applied(format!(
            "{verb} working tree {}",
            tree.root().display()
        )))
    }
}

//! Stage runner.
//!
//! A pipeline owns one frozen [`PackConfig`] and an ordered list of stages.
//! `pack()` runs every stage against the working tree in order and then
//! archives whatever the last stage left behind. The first failing stage
//! aborts the run; the working tree is left as that stage produced it.
use crate::archive::{self, ArchiveReport};
use crate::config::{validate_config, PackConfig};
use crate::stages::{
    Clean, CommentStrip, CopySource, LoggingStrip, ManifestTransform, ScriptTransform, SourceRole,
};
use crate::staging::WorkingTree;
use anyhow::{Context, Result};

/// Whether a stage did any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Applied,
    Skipped,
}

impl StageStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StageStatus::Applied => "applied",
            StageStatus::Skipped => "skipped",
        }
    }
}

/// Operator-facing result of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    pub status: StageStatus,
    pub summary: String,
}

impl StageOutcome {
    pub fn applied(summary: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Applied,
            summary: summary.into(),
        }
    }

    pub fn skipped(summary: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Skipped,
            summary: summary.into(),
        }
    }
}

/// One step of the packaging sequence.
pub trait Stage {
    fn name(&self) -> &'static str;

    fn apply(&self, tree: &WorkingTree, config: &PackConfig) -> Result<StageOutcome>;
}

#[derive(Debug, Clone)]
pub struct StageRecord {
    pub name: &'static str,
    pub outcome: StageOutcome,
}

/// Everything a successful `pack()` produced.
#[derive(Debug, Clone)]
pub struct PackReport {
    pub stages: Vec<StageRecord>,
    pub archive: ArchiveReport,
}

/// The fixed stage order used by `pack()`.
pub fn standard_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(Clean),
        Box::new(CopySource::new(SourceRole::Primary)),
        Box::new(CopySource::new(SourceRole::Secondary)),
        Box::new(ScriptTransform),
        Box::new(ManifestTransform),
        Box::new(CommentStrip),
        Box::new(LoggingStrip),
    ]
}

pub struct Pipeline {
    config: PackConfig,
    tree: WorkingTree,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(config: PackConfig) -> Result<Self> {
        Self::with_stages(config, standard_stages())
    }

    pub fn with_stages(config: PackConfig, stages: Vec<Box<dyn Stage>>) -> Result<Self> {
        validate_config(&config)?;
        let tree = WorkingTree::new(config.working_dir.clone());
        Ok(Self {
            config,
            tree,
            stages,
        })
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage, then archive the working tree.
    pub fn pack(&self) -> Result<PackReport> {
        tracing::info!(
            mode = self.config.bundle_mode.as_str(),
            version = %self.config.version,
            working_dir = %self.tree.root().display(),
            "pack started"
        );
        let mut records = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let outcome = stage
                .apply(&self.tree, &self.config)
                .with_context(|| format!("{} stage failed", stage.name()))?;
            tracing::info!(
                stage = stage.name(),
                status = outcome.status.as_str(),
                "{}",
                outcome.summary
            );
            records.push(StageRecord {
                name: stage.name(),
                outcome,
            });
        }

        let archive = archive::write_archive(self.tree.root(), &self.config.output_dir)
            .context("archive stage failed")?;
        Ok(PackReport {
            stages: records,
            archive,
        })
    }
}

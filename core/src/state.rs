use std::collections::VecDeque;
use std::fmt;

use api_migrate_catalog::Migration;
use semver::Version;

use crate::config::BumpPolicy;
use crate::error::MigrateError;
use crate::error::Phase;

/// Where a pipeline run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    ResolvingVersion,
    NoMigrationsNeeded,
    ManifestBumped,
    DependenciesInstalled,
    /// 1-based position of the step being applied.
    ApplyingMigration { step: usize, version: Version },
    AllMigrationsApplied,
    Linted,
    Failed(Phase),
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoMigrationsNeeded | Self::Linted | Self::Failed(_))
    }

    fn can_advance_to(&self, next: &Self, policy: BumpPolicy) -> bool {
        use PipelineStage::AllMigrationsApplied;
        use PipelineStage::ApplyingMigration;
        use PipelineStage::DependenciesInstalled;
        use PipelineStage::Failed;
        use PipelineStage::Idle;
        use PipelineStage::Linted;
        use PipelineStage::ManifestBumped;
        use PipelineStage::NoMigrationsNeeded;
        use PipelineStage::ResolvingVersion;

        if self.is_terminal() {
            return false;
        }
        if matches!(next, Failed(_)) {
            return true;
        }
        match (self, next, policy) {
            (Idle, ResolvingVersion, _) => true,
            (ResolvingVersion, NoMigrationsNeeded, _) => true,
            (ResolvingVersion, ManifestBumped, BumpPolicy::BeforeMigrations) => true,
            (ManifestBumped, DependenciesInstalled, _) => true,
            (DependenciesInstalled, ApplyingMigration { step: 1, .. }, BumpPolicy::BeforeMigrations) => {
                true
            }
            (ResolvingVersion, ApplyingMigration { step: 1, .. }, BumpPolicy::AfterMigrations) => {
                true
            }
            (ApplyingMigration { step, .. }, ApplyingMigration { step: following, .. }, _) => {
                *following == step + 1
            }
            (ApplyingMigration { .. }, AllMigrationsApplied, _) => true,
            (AllMigrationsApplied, ManifestBumped, BumpPolicy::AfterMigrations) => true,
            (AllMigrationsApplied, Linted, BumpPolicy::BeforeMigrations) => true,
            (DependenciesInstalled, Linted, BumpPolicy::AfterMigrations) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::ResolvingVersion => f.write_str("resolving version"),
            Self::NoMigrationsNeeded => f.write_str("no migrations needed"),
            Self::ManifestBumped => f.write_str("manifest bumped"),
            Self::DependenciesInstalled => f.write_str("dependencies installed"),
            Self::ApplyingMigration { step, version } => {
                write!(f, "applying migration {step} ({version})")
            }
            Self::AllMigrationsApplied => f.write_str("all migrations applied"),
            Self::Linted => f.write_str("linted"),
            Self::Failed(phase) => write!(f, "failed during {phase}"),
        }
    }
}

/// Progress record of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    policy: BumpPolicy,
    stage: PipelineStage,
    current: Option<Version>,
    target: Option<Version>,
    remaining: VecDeque<Migration>,
    applied: Vec<Version>,
}

impl PipelineState {
    pub fn new(policy: BumpPolicy) -> Self {
        Self {
            policy,
            stage: PipelineStage::Idle,
            current: None,
            target: None,
            remaining: VecDeque::new(),
            applied: Vec::new(),
        }
    }

    pub fn stage(&self) -> &PipelineStage {
        &self.stage
    }

    pub fn current_version(&self) -> Option<&Version> {
        self.current.as_ref()
    }

    pub fn target_version(&self) -> Option<&Version> {
        self.target.as_ref()
    }

    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub fn applied(&self) -> &[Version] {
        &self.applied
    }

    pub fn advance(&mut self, next: PipelineStage) {
        debug_assert!(
            self.stage.can_advance_to(&next, self.policy),
            "illegal pipeline transition {} -> {next}",
            self.stage
        );
        tracing::debug!("pipeline: {} -> {next}", self.stage);
        self.stage = next;
    }

    /// Record the resolved version and the ordered migrations to apply.
    pub fn plan(&mut self, current: Version, applicable: &[Migration]) {
        self.target = applicable.last().map(|migration| migration.version.clone());
        self.current = Some(current);
        self.remaining = applicable.iter().cloned().collect();
    }

    /// Pop the next migration and enter its step.
    pub fn begin_next(&mut self) -> Option<Migration> {
        let migration = self.remaining.pop_front()?;
        let step = self.applied.len() + 1;
        self.advance(PipelineStage::ApplyingMigration {
            step,
            version: migration.version.clone(),
        });
        Some(migration)
    }

    pub fn complete_step(&mut self, version: Version) {
        self.applied.push(version);
    }

    /// Enter `Failed` for `err`'s phase and hand the error back.
    pub fn fail(&mut self, err: MigrateError) -> MigrateError {
        self.advance(PipelineStage::Failed(err.phase()));
        err
    }
}

use std::fmt;
use std::path::PathBuf;

use api_migrate_catalog::ArtifactKind;
use api_migrate_catalog::CatalogError;
use api_migrate_exec::ExecError;
use api_migrate_project::ProjectError;
use semver::Version;
use thiserror::Error;

use crate::config::ConfigError;

/// Core result type alias
pub type Result<T> = std::result::Result<T, MigrateError>;

/// Migration pipeline error taxonomy
///
/// Every variant aborts the run; nothing is retried.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The project could not be resolved; nothing has been touched yet.
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("cannot update {path}: {source}")]
    ManifestUpdate { path: PathBuf, source: ProjectError },

    #[error("{source}")]
    Install { source: ExecError },

    #[error("cannot collect files for migration {version}: {source}")]
    FileScan {
        version: Version,
        source: ProjectError,
    },

    #[error("{kind} of migration {version}: {source}")]
    Transform {
        version: Version,
        kind: ArtifactKind,
        source: ExecError,
    },

    #[error("migration {version}: {source}")]
    Script { version: Version, source: ExecError },

    #[error("{source}")]
    Lint { source: ExecError },
}

impl MigrateError {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Config(_) | Self::Project(_) => Phase::Configuration,
            Self::Catalog(_) => Phase::Catalog,
            Self::ManifestUpdate { .. } => Phase::ManifestUpdate,
            Self::Install { .. } => Phase::Install,
            Self::FileScan { .. } | Self::Transform { .. } => Phase::Transform,
            Self::Script { .. } => Phase::Script,
            Self::Lint { .. } => Phase::Lint,
        }
    }
}

/// Pipeline phase an error is attributed to in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Configuration,
    Catalog,
    ManifestUpdate,
    Install,
    Transform,
    Script,
    Lint,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Catalog => "catalog discovery",
            Self::ManifestUpdate => "manifest update",
            Self::Install => "dependency install",
            Self::Transform => "transform",
            Self::Script => "script",
            Self::Lint => "lint",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

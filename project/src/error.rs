use std::path::PathBuf;
use thiserror::Error;

/// Project result type alias
pub type Result<T> = std::result::Result<T, ProjectError>;

/// Errors raised while reading or updating the target project.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("project directory {path} is not accessible: {source}")]
    ProjectRoot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("manifest not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("lockfile not found at {0}; install dependencies first")]
    LockfileMissing(PathBuf),

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} is not a JSON object")]
    NotAnObject { path: PathBuf },

    #[error("{manifest} does not declare a dependency on {package}")]
    DependencyNotDeclared { package: String, manifest: PathBuf },

    #[error("{lockfile} has no resolved version for {package}")]
    DependencyNotResolved { package: String, lockfile: PathBuf },

    #[error("installed version {version:?} of {package} is not valid semver: {source}")]
    InvalidVersion {
        package: String,
        version: String,
        source: semver::Error,
    },

    #[error("failed to scan {root}: {source}")]
    FileScan {
        root: PathBuf,
        source: ignore::Error,
    },
}

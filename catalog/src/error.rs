use std::path::PathBuf;
use thiserror::Error;

/// Catalog result type alias
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while discovering a catalog on disk.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("migration catalog not found at {0}")]
    RootMissing(PathBuf),

    #[error("migration catalog root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("failed to read catalog directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("migration artifact {path} is not a regular file")]
    ArtifactNotFile { path: PathBuf },
}

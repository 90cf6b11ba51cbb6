use std::path::Path;
use std::path::PathBuf;

use semver::Version;

use crate::DEFAULT_LOCKFILE;
use crate::DEFAULT_MANIFEST;
use crate::error::ProjectError;
use crate::error::Result;
use crate::lockfile::Lockfile;
use crate::manifest::Manifest;

/// A project whose installed host API version has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionProject {
    pub root: PathBuf,
    pub manifest_path: PathBuf,
    pub lockfile_path: PathBuf,
    pub host_package: String,
    pub current_version: Version,
}

/// Reads manifest and lockfile to find the installed host API version.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    host_package: String,
    manifest_name: String,
    lockfile_name: String,
}

impl VersionResolver {
    pub fn new(host_package: impl Into<String>) -> Self {
        Self {
            host_package: host_package.into(),
            manifest_name: DEFAULT_MANIFEST.to_string(),
            lockfile_name: DEFAULT_LOCKFILE.to_string(),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_lockfile_name(mut self, name: impl Into<String>) -> Self {
        self.lockfile_name = name.into();
        self
    }

    pub fn host_package(&self) -> &str {
        &self.host_package
    }

    /// Resolve `project_root` into an [`ExtensionProject`]. Pure read.
    pub fn resolve(&self, project_root: &Path) -> Result<ExtensionProject> {
        let root =
            dunce::canonicalize(project_root).map_err(|source| ProjectError::ProjectRoot {
                path: project_root.to_path_buf(),
                source,
            })?;

        let manifest_path = root.join(&self.manifest_name);
        if !manifest_path.is_file() {
            return Err(ProjectError::ManifestMissing(manifest_path));
        }
        let lockfile_path = root.join(&self.lockfile_name);
        if !lockfile_path.is_file() {
            return Err(ProjectError::LockfileMissing(lockfile_path));
        }

        let manifest = Manifest::load(&manifest_path)?;
        if manifest.declared_range(&self.host_package).is_none() {
            return Err(ProjectError::DependencyNotDeclared {
                package: self.host_package.clone(),
                manifest: manifest_path,
            });
        }

        let lockfile = Lockfile::load(&lockfile_path)?;
        let installed = lockfile
            .resolved_version(&self.host_package)
            .ok_or_else(|| ProjectError::DependencyNotResolved {
                package: self.host_package.clone(),
                lockfile: lockfile_path.clone(),
            })?;
        let current_version =
            Version::parse(installed).map_err(|source| ProjectError::InvalidVersion {
                package: self.host_package.clone(),
                version: installed.to_string(),
                source,
            })?;

        tracing::debug!(
            "resolved {} {current_version} in {}",
            self.host_package,
            root.display()
        );

        Ok(ExtensionProject {
            root,
            manifest_path,
            lockfile_path,
            host_package: self.host_package.clone(),
            current_version,
        })
    }
}

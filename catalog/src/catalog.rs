use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use semver::Version;

use crate::error::CatalogError;
use crate::error::Result;
use crate::layout::CatalogLayout;
use crate::migration::ArtifactKind;
use crate::migration::Artifacts;
use crate::migration::Migration;
use crate::migration::PlatformScript;

/// Migrations found under a catalog root, sorted ascending by version.
#[derive(Debug, Clone)]
pub struct MigrationCatalog {
    root: PathBuf,
    migrations: Vec<Migration>,
}

impl MigrationCatalog {
    /// Scan `root` for version-named directories and collect their artifacts.
    ///
    /// Children whose name is not a plain `MAJOR.MINOR.PATCH` version, and
    /// plain files, are skipped.
    pub fn discover(root: &Path, layout: &CatalogLayout) -> Result<Self> {
        let metadata = fs::metadata(root).map_err(|source| match source.kind() {
            ErrorKind::NotFound => CatalogError::RootMissing(root.to_path_buf()),
            _ => CatalogError::DirectoryRead {
                path: root.to_path_buf(),
                source,
            },
        })?;
        if !metadata.is_dir() {
            return Err(CatalogError::RootNotDirectory(root.to_path_buf()));
        }

        let entries = fs::read_dir(root).map_err(|source| CatalogError::DirectoryRead {
            path: root.to_path_buf(),
            source,
        })?;

        let mut migrations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CatalogError::DirectoryRead {
                path: root.to_path_buf(),
                source,
            })?;
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let Some(version) = entry.file_name().to_str().and_then(parse_catalog_version)
            else {
                tracing::debug!("skipping non-version catalog entry {}", dir.display());
                continue;
            };

            let artifacts = discover_artifacts(&dir, layout)?;
            tracing::debug!("catalog entry {version}: {}", describe_kinds(&artifacts));
            migrations.push(Migration {
                version,
                dir,
                artifacts,
            });
        }

        migrations.sort_by(|a, b| a.version.cmp(&b.version));

        Ok(Self {
            root: root.to_path_buf(),
            migrations,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every entry, ascending.
    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Entries strictly newer than `current`, ascending.
    pub fn list_applicable(&self, current: &Version) -> &[Migration] {
        let start = self
            .migrations
            .partition_point(|migration| migration.version <= *current);
        &self.migrations[start..]
    }

    pub fn latest(&self) -> Option<&Migration> {
        self.migrations.last()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

/// Entries of `list` that carry at least one artifact.
pub fn real_migrations_of(list: &[Migration]) -> Vec<&Migration> {
    list.iter().filter(|migration| migration.is_real()).collect()
}

/// Parse a catalog directory name. Only bare release versions qualify:
/// pre-release tags, build metadata and `v` prefixes are rejected.
pub fn parse_catalog_version(name: &str) -> Option<Version> {
    let version = Version::parse(name).ok()?;
    if !version.pre.is_empty() || !version.build.is_empty() {
        return None;
    }
    Some(version)
}

fn discover_artifacts(dir: &Path, layout: &CatalogLayout) -> Result<Artifacts> {
    let code_transform = find_artifact(dir, &layout.code_transform)?;
    let config_transform = find_artifact(dir, &layout.config_transform)?;
    let posix = find_artifact(dir, std::slice::from_ref(&layout.posix_script))?;
    let windows = find_artifact(dir, std::slice::from_ref(&layout.windows_script))?;

    Ok(Artifacts {
        code_transform,
        config_transform,
        script: PlatformScript::from_parts(posix, windows),
    })
}

fn find_artifact(dir: &Path, candidates: &[String]) -> Result<Option<PathBuf>> {
    for name in candidates {
        let path = dir.join(name);
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => return Ok(Some(path)),
            Ok(_) => return Err(CatalogError::ArtifactNotFile { path }),
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(CatalogError::DirectoryRead {
                    path: dir.to_path_buf(),
                    source,
                });
            }
        }
    }
    Ok(None)
}

fn describe_kinds(artifacts: &Artifacts) -> String {
    let kinds = artifacts.kinds();
    if kinds.is_empty() {
        return "version marker".to_string();
    }
    kinds
        .iter()
        .map(ArtifactKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

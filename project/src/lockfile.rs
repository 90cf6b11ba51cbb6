use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::Result;
use crate::manifest::read_json;

/// Resolved dependency record written by the package manager.
#[derive(Debug, Clone)]
pub struct Lockfile {
    path: PathBuf,
    document: Value,
}

impl Lockfile {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            document: read_json(path)?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Installed version of `package`.
    ///
    /// lockfileVersion 2 and 3 key installs by their `node_modules/` path;
    /// version 1 only has the nested `dependencies` map.
    pub fn resolved_version(&self, package: &str) -> Option<&str> {
        let install_path = format!("node_modules/{package}");
        self.document
            .get("packages")
            .and_then(|packages| packages.get(&install_path))
            .and_then(|entry| entry.get("version"))
            .and_then(Value::as_str)
            .or_else(|| {
                self.document
                    .get("dependencies")
                    .and_then(|deps| deps.get(package))
                    .and_then(|entry| entry.get("version"))
                    .and_then(Value::as_str)
            })
    }
}

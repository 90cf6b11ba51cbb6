use std::fs;
use std::path::Path;
use std::path::PathBuf;

use semver::Version;
use serde_json::Value;

use crate::error::ProjectError;
use crate::error::Result;

/// Sections consulted for the host API declaration, in lookup order.
const DEPENDENCY_SECTIONS: [&str; 2] = ["dependencies", "devDependencies"];

/// Caret range pinning the host API to `version`'s compatibility line.
pub fn caret_range(version: &Version) -> String {
    format!("^{version}")
}

/// The project's dependency-declaration file.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    document: Value,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let document = read_json(path)?;
        if !document.is_object() {
            return Err(ProjectError::NotAnObject {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Range string declared for `package`, if any section declares it.
    pub fn declared_range(&self, package: &str) -> Option<&str> {
        DEPENDENCY_SECTIONS.iter().find_map(|section| {
            self.document
                .get(section)
                .and_then(|deps| deps.get(package))
                .and_then(Value::as_str)
        })
    }

    /// Replace the range declared for `package` in whichever section holds it.
    pub fn set_dependency_range(&mut self, package: &str, range: &str) -> Result<()> {
        for section in DEPENDENCY_SECTIONS {
            if let Some(deps) = self
                .document
                .get_mut(section)
                .and_then(Value::as_object_mut)
                && deps.contains_key(package)
            {
                deps.insert(package.to_string(), Value::String(range.to_string()));
                return Ok(());
            }
        }
        Err(ProjectError::DependencyNotDeclared {
            package: package.to_string(),
            manifest: self.path.clone(),
        })
    }

    /// Persist with two-space indentation and a trailing newline.
    pub fn save(&self) -> Result<()> {
        let rendered =
            serde_json::to_string_pretty(&self.document).map_err(|source| ProjectError::Parse {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, format!("{rendered}\n")).map_err(|source| {
            ProjectError::FileWrite {
                path: self.path.clone(),
                source,
            }
        })
    }
}

pub(crate) fn read_json(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path).map_err(|source| ProjectError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ProjectError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

use std::path::Path;
use std::path::PathBuf;

use crate::error::ExecError;
use crate::error::Result;

/// Locates external tools, preferring the project's own installed copy.
#[derive(Debug, Clone)]
pub struct ToolResolver {
    local_bin_dir: PathBuf,
}

impl ToolResolver {
    /// `local_bin_dir` is relative to the project root, e.g. `node_modules/.bin`.
    pub fn new(local_bin_dir: impl Into<PathBuf>) -> Self {
        Self {
            local_bin_dir: local_bin_dir.into(),
        }
    }

    pub fn local_bin_dir(&self) -> &Path {
        &self.local_bin_dir
    }

    /// Resolve `program` for a run rooted at `project_root`.
    ///
    /// A program containing a path separator is taken as a path (relative
    /// ones are anchored at the project root). A bare name is looked up in
    /// the project-local bin directory first, then on `PATH`.
    pub fn resolve(&self, program: &str, project_root: &Path) -> Result<PathBuf> {
        if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
            let path = Path::new(program);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                project_root.join(path)
            };
            return if path.is_file() {
                Ok(path)
            } else {
                Err(ExecError::ToolNotFound {
                    program: program.to_string(),
                })
            };
        }

        let local_dir = project_root.join(&self.local_bin_dir);
        for candidate in local_candidates(program) {
            let path = local_dir.join(&candidate);
            if path.is_file() {
                tracing::debug!("using project-local `{program}` at {}", path.display());
                return Ok(path);
            }
        }

        which::which(program).map_err(|err| {
            tracing::debug!("`{program}` not on PATH: {err}");
            ExecError::ToolNotFound {
                program: program.to_string(),
            }
        })
    }
}

fn local_candidates(program: &str) -> Vec<String> {
    if cfg!(windows) {
        vec![
            format!("{program}.cmd"),
            format!("{program}.exe"),
            program.to_string(),
        ]
    } else {
        vec![program.to_string()]
    }
}

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::invocation::Invocation;
use crate::runner::CommandRunner;
use crate::tool::ToolResolver;

/// Argument replaced by the transform path in the engine's argument list.
pub const TRANSFORM_PLACEHOLDER: &str = "{transform}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodemodOutcome {
    /// The file set was empty; the engine was not started.
    Skipped,
    Applied { files: usize },
}

/// Drives the structural rewrite engine over a set of files.
pub struct CodemodRunner {
    runner: Arc<dyn CommandRunner>,
    tools: ToolResolver,
    program: String,
    args: Vec<String>,
}

impl CodemodRunner {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        tools: ToolResolver,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            runner,
            tools,
            program: program.into(),
            args,
        }
    }

    /// Build the engine command line for `transform` over `files`.
    pub fn invocation(
        &self,
        transform: &Path,
        files: &[PathBuf],
        project_root: &Path,
    ) -> Result<Invocation> {
        let program = self.tools.resolve(&self.program, project_root)?;
        let mut invocation = Invocation::new(program, project_root);
        let mut substituted = false;
        for arg in &self.args {
            if arg == TRANSFORM_PLACEHOLDER {
                invocation = invocation.arg(transform.as_os_str());
                substituted = true;
            } else {
                invocation = invocation.arg(arg);
            }
        }
        if !substituted {
            invocation = invocation.arg(transform.as_os_str());
        }
        Ok(invocation.args(files))
    }

    /// Apply `transform` to every file in `files`.
    ///
    /// An empty file list is a successful no-op; the engine is never started
    /// without target files.
    pub async fn apply(
        &self,
        transform: &Path,
        files: &[PathBuf],
        project_root: &Path,
    ) -> Result<CodemodOutcome> {
        if files.is_empty() {
            tracing::debug!("no files for {}; skipping", transform.display());
            return Ok(CodemodOutcome::Skipped);
        }

        let invocation = self.invocation(transform, files, project_root)?;
        tracing::info!(
            "applying {} to {} file(s)",
            transform.display(),
            files.len()
        );
        self.runner.run(&invocation).await?;
        Ok(CodemodOutcome::Applied { files: files.len() })
    }
}

use std::path::Path;
use std::sync::Arc;

use api_migrate_exec::CommandRunner;
use api_migrate_exec::Invocation;
use api_migrate_exec::ToolResolver;

use crate::config::ToolConfig;
use crate::error::MigrateError;
use crate::error::Result;

/// Runs the project's own lint/autofix tool after the last migration.
pub struct PostMigrationValidator {
    runner: Arc<dyn CommandRunner>,
    tools: ToolResolver,
    lint: ToolConfig,
}

impl PostMigrationValidator {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: ToolResolver, lint: ToolConfig) -> Self {
        Self {
            runner,
            tools,
            lint,
        }
    }

    pub async fn lint_fix(&self, project_root: &Path) -> Result<()> {
        let program = self
            .tools
            .resolve(&self.lint.program, project_root)
            .map_err(|source| MigrateError::Lint { source })?;
        let invocation = Invocation::new(program, project_root).args(&self.lint.args);

        tracing::info!("running {}", invocation.command_line());
        self.runner
            .run(&invocation)
            .await
            .map_err(|source| MigrateError::Lint { source })
    }
}

use std::sync::Arc;

use api_migrate_exec::CommandRunner;
use api_migrate_exec::Invocation;
use api_migrate_exec::ToolResolver;
use api_migrate_project::ExtensionProject;
use api_migrate_project::Manifest;
use api_migrate_project::caret_range;
use semver::Version;

use crate::config::ToolConfig;
use crate::error::MigrateError;
use crate::error::Result;

/// Moves the project's declared host API version forward and installs it.
pub struct DependencyUpdater {
    runner: Arc<dyn CommandRunner>,
    tools: ToolResolver,
    install: ToolConfig,
}

impl DependencyUpdater {
    pub fn new(runner: Arc<dyn CommandRunner>, tools: ToolResolver, install: ToolConfig) -> Self {
        Self {
            runner,
            tools,
            install,
        }
    }

    /// Declare `^target` for the host package and persist the manifest.
    pub fn rewrite_manifest(&self, project: &ExtensionProject, target: &Version) -> Result<()> {
        let path = &project.manifest_path;
        let manifest_error = |source| MigrateError::ManifestUpdate {
            path: path.clone(),
            source,
        };

        let mut manifest = Manifest::load(path).map_err(manifest_error)?;
        let range = caret_range(target);
        manifest
            .set_dependency_range(&project.host_package, &range)
            .map_err(manifest_error)?;
        manifest.save().map_err(manifest_error)?;

        tracing::info!("declared {} {range} in {}", project.host_package, path.display());
        Ok(())
    }

    /// Run the package-manager install in the project root.
    pub async fn install(&self, project: &ExtensionProject) -> Result<()> {
        let program = self
            .tools
            .resolve(&self.install.program, &project.root)
            .map_err(|source| MigrateError::Install { source })?;
        let invocation = Invocation::new(program, &project.root).args(&self.install.args);

        tracing::info!("installing dependencies: {}", invocation.command_line());
        self.runner
            .run(&invocation)
            .await
            .map_err(|source| MigrateError::Install { source })
    }

    pub async fn bump(&self, project: &ExtensionProject, target: &Version) -> Result<()> {
        self.rewrite_manifest(project, target)?;
        self.install(project).await
    }
}

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use api_migrate_catalog::ArtifactKind;
use api_migrate_catalog::Migration;
use api_migrate_catalog::MigrationCatalog;
use api_migrate_catalog::real_migrations_of;
use api_migrate_exec::CodemodRunner;
use api_migrate_exec::CommandRunner;
use api_migrate_exec::HostPlatform;
use api_migrate_exec::ScriptRunner;
use api_migrate_exec::ToolResolver;
use api_migrate_project::ExtensionProject;
use api_migrate_project::FileClass;
use api_migrate_project::FileSet;
use api_migrate_project::FileSetQuery;
use api_migrate_project::VersionResolver;
use semver::Version;

use crate::config::BumpPolicy;
use crate::config::MigrateConfig;
use crate::error::MigrateError;
use crate::error::Result;
use crate::state::PipelineStage;
use crate::state::PipelineState;
use crate::updater::DependencyUpdater;
use crate::validator::PostMigrationValidator;

/// What a run would do, computed without touching the project.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub project: ExtensionProject,
    pub catalog_root: PathBuf,
    /// Ascending; empty when the project is up to date.
    pub applicable: Vec<Migration>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.applicable.is_empty()
    }

    pub fn target(&self) -> Option<&Version> {
        self.applicable.last().map(|migration| &migration.version)
    }

    pub fn real_count(&self) -> usize {
        real_migrations_of(&self.applicable).len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    UpToDate {
        current: Version,
    },
    Migrated {
        from: Version,
        to: Version,
        applied: Vec<Version>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub project_root: PathBuf,
    pub outcome: Outcome,
}

/// End-to-end migration pipeline for one project.
pub struct Orchestrator {
    config: MigrateConfig,
    catalog_root: PathBuf,
    host: HostPlatform,
    updater: DependencyUpdater,
    codemod: CodemodRunner,
    scripts: ScriptRunner,
    validator: PostMigrationValidator,
}

impl Orchestrator {
    pub fn new(
        config: MigrateConfig,
        catalog_root: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let tools = ToolResolver::new(&config.project.local_bin_dir);
        let host = HostPlatform::current();
        Self {
            updater: DependencyUpdater::new(runner.clone(), tools.clone(), config.install.clone()),
            codemod: CodemodRunner::new(
                runner.clone(),
                tools.clone(),
                config.codemod.program.clone(),
                config.codemod.args.clone(),
            ),
            scripts: ScriptRunner::new(runner.clone(), config.scripts.shells()).with_host(host),
            validator: PostMigrationValidator::new(runner, tools, config.lint.clone()),
            catalog_root: catalog_root.into(),
            host,
            config,
        }
    }

    /// Override the detected host platform (script variant selection).
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self.scripts = self.scripts.with_host(host);
        self
    }

    pub fn host(&self) -> HostPlatform {
        self.host
    }

    /// Resolve the project and list the migrations a run would apply.
    pub fn plan(&self, project_root: &Path) -> Result<MigrationPlan> {
        let project = VersionResolver::new(&self.config.project.host_package)
            .with_manifest_name(&self.config.project.manifest)
            .with_lockfile_name(&self.config.project.lockfile)
            .resolve(project_root)?;
        let catalog = MigrationCatalog::discover(&self.catalog_root, &self.config.catalog.layout)?;
        let applicable = catalog.list_applicable(&project.current_version).to_vec();

        Ok(MigrationPlan {
            project,
            catalog_root: self.catalog_root.clone(),
            applicable,
        })
    }

    /// Run the whole pipeline. The first error stops it; steps already
    /// applied stay on disk.
    pub async fn run(&self, project_root: &Path) -> Result<PipelineReport> {
        let policy = self.config.pipeline.bump_policy;
        let mut state = PipelineState::new(policy);
        state.advance(PipelineStage::ResolvingVersion);

        let plan = self.plan(project_root).map_err(|err| state.fail(err))?;
        let project = &plan.project;
        let current = project.current_version.clone();
        state.plan(current.clone(), &plan.applicable);

        let Some(target) = plan.target().cloned() else {
            tracing::info!(
                "{} {current} is up to date with {}",
                project.host_package,
                plan.catalog_root.display()
            );
            state.advance(PipelineStage::NoMigrationsNeeded);
            return Ok(PipelineReport {
                project_root: project.root.clone(),
                outcome: Outcome::UpToDate { current },
            });
        };

        tracing::info!(
            "{} migration(s) to apply, {} with changes ({current} -> {target})",
            plan.applicable.len(),
            plan.real_count()
        );

        let result = self.drive(&mut state, project, &target).await;
        if let Err(err) = result {
            tracing::warn!(
                "{} of {} migration(s) applied before the failure",
                state.applied().len(),
                plan.applicable.len()
            );
            return Err(state.fail(err));
        }

        Ok(PipelineReport {
            project_root: project.root.clone(),
            outcome: Outcome::Migrated {
                from: current,
                to: target,
                applied: state.applied().to_vec(),
            },
        })
    }

    async fn drive(
        &self,
        state: &mut PipelineState,
        project: &ExtensionProject,
        target: &Version,
    ) -> Result<()> {
        let policy = self.config.pipeline.bump_policy;

        if policy == BumpPolicy::BeforeMigrations {
            self.bump(state, project, target).await?;
        }

        while let Some(migration) = state.begin_next() {
            self.apply_step(&migration, &project.root).await?;
            state.complete_step(migration.version);
        }
        state.advance(PipelineStage::AllMigrationsApplied);

        if policy == BumpPolicy::AfterMigrations {
            self.bump(state, project, target).await?;
        }

        self.validator.lint_fix(&project.root).await?;
        state.advance(PipelineStage::Linted);
        Ok(())
    }

    async fn bump(
        &self,
        state: &mut PipelineState,
        project: &ExtensionProject,
        target: &Version,
    ) -> Result<()> {
        self.updater.rewrite_manifest(project, target)?;
        state.advance(PipelineStage::ManifestBumped);
        self.updater.install(project).await?;
        state.advance(PipelineStage::DependenciesInstalled);
        Ok(())
    }

    /// Apply one migration: its artifacts start together and the step ends
    /// once every one of them has finished.
    async fn apply_step(&self, migration: &Migration, root: &Path) -> Result<()> {
        let version = &migration.version;
        let artifacts = &migration.artifacts;
        if !migration.is_real() {
            tracing::info!("migration {version}: version marker, nothing to run");
            return Ok(());
        }
        tracing::info!("applying migration {version}");

        // File sets are collected per step so earlier steps' edits are seen.
        let code_files = self.collect_for(
            artifacts.code_transform.is_some(),
            FileClass::Source,
            &self.config.project.source_extensions,
            root,
            version,
        )?;
        let config_files = self.collect_for(
            artifacts.config_transform.is_some(),
            FileClass::Configuration,
            &self.config.project.config_extensions,
            root,
            version,
        )?;

        let code = async {
            match (&artifacts.code_transform, &code_files) {
                (Some(transform), Some(files)) => {
                    self.codemod.apply(transform, files.files(), root).await.map(Some)
                }
                _ => Ok(None),
            }
        };
        let config = async {
            match (&artifacts.config_transform, &config_files) {
                (Some(transform), Some(files)) => {
                    self.codemod.apply(transform, files.files(), root).await.map(Some)
                }
                _ => Ok(None),
            }
        };
        let script = async {
            match &artifacts.script {
                Some(script) => self.scripts.run(script, root).await.map(Some),
                None => Ok(None),
            }
        };

        let (code, config, script) = tokio::join!(code, config, script);

        code.map_err(|source| MigrateError::Transform {
            version: version.clone(),
            kind: ArtifactKind::CodeTransform,
            source,
        })?;
        config.map_err(|source| MigrateError::Transform {
            version: version.clone(),
            kind: ArtifactKind::ConfigTransform,
            source,
        })?;
        script.map_err(|source| MigrateError::Script {
            version: version.clone(),
            source,
        })?;
        Ok(())
    }

    fn collect_for(
        &self,
        wanted: bool,
        class: FileClass,
        extensions: &[String],
        root: &Path,
        version: &Version,
    ) -> Result<Option<FileSet>> {
        if !wanted {
            return Ok(None);
        }
        let project = &self.config.project;
        let mut query = FileSetQuery::new(class, extensions, &project.excluded_dirs);
        if class == FileClass::Configuration {
            // The lockfile belongs to the package manager, never to a transform.
            query = query.excluding_files(std::slice::from_ref(&project.lockfile));
        }
        query
            .collect(root)
            .map(Some)
            .map_err(|source| MigrateError::FileScan {
                version: version.clone(),
                source,
            })
    }
}

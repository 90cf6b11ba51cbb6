use crate::config::error::ConfigError;
use crate::config::error::Result;
use api_migrate_catalog::CatalogLayout;
use api_migrate_exec::ScriptShells;
use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Name of the per-project configuration file picked up automatically.
pub const PROJECT_CONFIG_FILE: &str = "api-migrate.toml";

/// Environment variable prefix (`API_MIGRATE_CODEMOD__PROGRAM=...`).
pub const ENV_PREFIX: &str = "API_MIGRATE";

/// Catalog directory looked up next to the executable when nothing else
/// names one.
pub const DEFAULT_CATALOG_DIR: &str = "migrations";

/// Keys whose environment values are comma-separated lists.
const LIST_KEYS: [&str; 8] = [
    "project.source_extensions",
    "project.config_extensions",
    "project.excluded_dirs",
    "install.args",
    "codemod.args",
    "lint.args",
    "catalog.layout.code_transform",
    "catalog.layout.config_transform",
];

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub project: ProjectConfig,

    /// Package-manager install step.
    #[serde(default = "default_install")]
    pub install: ToolConfig,

    /// Structural rewrite engine.
    #[serde(default = "default_codemod")]
    pub codemod: ToolConfig,

    /// Lint/autofix tool run once at the end.
    #[serde(default = "default_lint")]
    pub lint: ToolConfig,

    #[serde(default)]
    pub scripts: ScriptsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog directory; falls back to `migrations/` next to the executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    #[serde(default)]
    pub layout: CatalogLayout,
}

/// Target project conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Dependency whose version drives migration selection.
    #[serde(default = "default_host_package")]
    pub host_package: String,

    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default = "default_lockfile")]
    pub lockfile: String,

    /// Extensions handed to the code transform.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,

    /// Extensions handed to the configuration transform.
    #[serde(default = "default_config_extensions")]
    pub config_extensions: Vec<String>,

    /// Directory names never descended into when collecting files.
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Project-relative directory searched for tools before `PATH`.
    #[serde(default = "default_local_bin_dir")]
    pub local_bin_dir: PathBuf,
}

/// An external program and its fixed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolConfig {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| (*arg).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    #[serde(default = "default_posix_shell")]
    pub posix_shell: String,

    #[serde(default = "default_powershell")]
    pub powershell: String,
}

impl ScriptsConfig {
    pub fn shells(&self) -> ScriptShells {
        ScriptShells {
            posix_shell: self.posix_shell.clone(),
            powershell: self.powershell.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub bump_policy: BumpPolicy,
}

/// When the manifest is bumped and dependencies installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpPolicy {
    /// Bump and install, then run migrations against the new dependencies.
    #[default]
    BeforeMigrations,
    /// Run every migration first; bump and install only if all succeeded.
    AfterMigrations,
}

impl BumpPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeMigrations => "before-migrations",
            Self::AfterMigrations => "after-migrations",
        }
    }
}

// Default value functions
fn default_host_package() -> String {
    "@raycast/api".to_string()
}
fn default_manifest() -> String {
    api_migrate_project::DEFAULT_MANIFEST.to_string()
}
fn default_lockfile() -> String {
    api_migrate_project::DEFAULT_LOCKFILE.to_string()
}
fn default_source_extensions() -> Vec<String> {
    ["ts", "tsx", "js", "jsx"]
        .iter()
        .map(|ext| (*ext).to_string())
        .collect()
}
fn default_config_extensions() -> Vec<String> {
    vec!["json".to_string()]
}
fn default_excluded_dirs() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}
fn default_local_bin_dir() -> PathBuf {
    PathBuf::from("node_modules/.bin")
}
fn default_install() -> ToolConfig {
    ToolConfig::new("npm", &["install"])
}
fn default_codemod() -> ToolConfig {
    ToolConfig::new(
        "jscodeshift",
        &[
            "--fail-on-error",
            "--parser=tsx",
            "--transform",
            api_migrate_exec::TRANSFORM_PLACEHOLDER,
        ],
    )
}
fn default_lint() -> ToolConfig {
    ToolConfig::new("ray", &["lint", "--fix"])
}
fn default_posix_shell() -> String {
    ScriptShells::default().posix_shell
}
fn default_powershell() -> String {
    ScriptShells::default().powershell
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            host_package: default_host_package(),
            manifest: default_manifest(),
            lockfile: default_lockfile(),
            source_extensions: default_source_extensions(),
            config_extensions: default_config_extensions(),
            excluded_dirs: default_excluded_dirs(),
            local_bin_dir: default_local_bin_dir(),
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            posix_shell: default_posix_shell(),
            powershell: default_powershell(),
        }
    }
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            project: ProjectConfig::default(),
            install: default_install(),
            codemod: default_codemod(),
            lint: default_lint(),
            scripts: ScriptsConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl MigrateConfig {
    /// Reject values that would make every run fail later in a less
    /// obvious way.
    pub fn validate(&self) -> Result<()> {
        non_empty("project.host_package", &self.project.host_package)?;
        non_empty("project.manifest", &self.project.manifest)?;
        non_empty("project.lockfile", &self.project.lockfile)?;
        non_empty("install.program", &self.install.program)?;
        non_empty("codemod.program", &self.codemod.program)?;
        non_empty("lint.program", &self.lint.program)?;
        non_empty("scripts.posix_shell", &self.scripts.posix_shell)?;
        non_empty("scripts.powershell", &self.scripts.powershell)?;
        non_empty_list("project.source_extensions", &self.project.source_extensions)?;
        non_empty_list("project.config_extensions", &self.project.config_extensions)?;
        Ok(())
    }

    /// Catalog directory to use: `explicit` wins, then `catalog.root`, then
    /// `migrations/` beside the running executable.
    pub fn catalog_root(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(root) = explicit {
            return Ok(root.to_path_buf());
        }
        if let Some(root) = &self.catalog.root {
            return Ok(root.clone());
        }
        let exe = std::env::current_exe().map_err(ConfigError::CatalogRoot)?;
        let dir = exe.parent().unwrap_or(Path::new("."));
        Ok(dir.join(DEFAULT_CATALOG_DIR))
    }
}

fn non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn non_empty_list(field: &'static str, values: &[String]) -> Result<()> {
    if values.iter().all(|value| value.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            field,
            reason: "must list at least one extension".to_string(),
        });
    }
    Ok(())
}

/// Configuration loader with layered merging support
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    project_root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `path` as the configuration file; it must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Pick up `<root>/api-migrate.toml` when no explicit file is given.
    pub fn with_project_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.project_root = Some(root.as_ref().to_path_buf());
        self
    }

    /// Load configuration with layered merging:
    /// 1. Defaults
    /// 2. Explicit config file, else the project's `api-migrate.toml`
    /// 3. `API_MIGRATE_` environment variables
    pub fn load(&self) -> Result<MigrateConfig> {
        let mut builder = Config::builder();

        let defaults_json = serde_json::to_string(&MigrateConfig::default())?;
        builder = builder.add_source(File::from_str(&defaults_json, config::FileFormat::Json));

        if let Some(path) = self.config_file()? {
            tracing::debug!("loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path.as_path()));
        }

        // API_MIGRATE_CODEMOD__PROGRAM=/opt/bin/jscodeshift
        // API_MIGRATE_PROJECT__SOURCE_EXTENSIONS=ts,tsx
        let mut environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment);

        let config: MigrateConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn config_file(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config_path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            return Ok(Some(path.clone()));
        }
        Ok(self
            .project_root
            .as_ref()
            .map(|root| root.join(PROJECT_CONFIG_FILE))
            .filter(|path| path.is_file()))
    }
}

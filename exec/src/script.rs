use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use api_migrate_catalog::PlatformScript;

use crate::error::Result;
use crate::invocation::Invocation;
use crate::runner::CommandRunner;

/// Operating-system family the migration runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Posix,
}

impl HostPlatform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// The script variant chosen for a host, with the shell that runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSelection {
    Posix(PathBuf),
    PowerShell(PathBuf),
}

impl ScriptSelection {
    /// Windows hosts prefer the PowerShell variant and fall back to the POSIX
    /// one; every other host runs the POSIX variant.
    pub fn resolve(script: &PlatformScript, host: HostPlatform) -> Option<Self> {
        let posix = || script.posix().map(|path| Self::Posix(path.to_path_buf()));
        match host {
            HostPlatform::Windows => script
                .windows()
                .map(|path| Self::PowerShell(path.to_path_buf()))
                .or_else(posix),
            HostPlatform::Posix => posix(),
        }
    }

    pub fn script(&self) -> &Path {
        match self {
            Self::Posix(path) | Self::PowerShell(path) => path,
        }
    }
}

/// Interpreters used for platform scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptShells {
    pub posix_shell: String,
    pub powershell: String,
}

impl Default for ScriptShells {
    fn default() -> Self {
        Self {
            posix_shell: "sh".to_string(),
            powershell: "powershell".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// No variant exists for this host.
    Skipped,
    Ran(ScriptSelection),
}

pub struct ScriptRunner {
    runner: Arc<dyn CommandRunner>,
    shells: ScriptShells,
    host: HostPlatform,
}

impl ScriptRunner {
    pub fn new(runner: Arc<dyn CommandRunner>, shells: ScriptShells) -> Self {
        Self {
            runner,
            shells,
            host: HostPlatform::current(),
        }
    }

    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    pub fn host(&self) -> HostPlatform {
        self.host
    }

    pub fn invocation(&self, selection: &ScriptSelection, cwd: &Path) -> Invocation {
        match selection {
            ScriptSelection::Posix(script) => {
                Invocation::new(&self.shells.posix_shell, cwd).arg(script.as_os_str())
            }
            ScriptSelection::PowerShell(script) => Invocation::new(&self.shells.powershell, cwd)
                .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"])
                .arg(script.as_os_str()),
        }
    }

    /// Run the variant of `script` matching this host with `cwd` as the
    /// working directory.
    pub async fn run(&self, script: &PlatformScript, cwd: &Path) -> Result<ScriptOutcome> {
        let Some(selection) = ScriptSelection::resolve(script, self.host) else {
            tracing::warn!(
                "no {:?} variant of migration script in {}; skipping",
                self.host,
                script_dir(script).display()
            );
            return Ok(ScriptOutcome::Skipped);
        };

        tracing::info!("running script {}", selection.script().display());
        self.runner.run(&self.invocation(&selection, cwd)).await?;
        Ok(ScriptOutcome::Ran(selection))
    }
}

fn script_dir(script: &PlatformScript) -> &Path {
    let path = script.posix().or(script.windows()).unwrap_or(Path::new(""));
    path.parent().unwrap_or(path)
}

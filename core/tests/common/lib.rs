#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Fixtures shared by the core integration tests: a recording
//! [`CommandRunner`] that never spawns anything, and throwaway extension
//! projects and migration catalogs on disk.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use api_migrate_exec::CommandRunner;
use api_migrate_exec::ExecError;
use api_migrate_exec::Invocation;
use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

pub const HOST_PACKAGE: &str = "@raycast/api";

/// Tools stubbed into every fixture's `node_modules/.bin`.
pub const STUB_TOOLS: [&str; 3] = ["npm", "jscodeshift", "ray"];

type Hook = Box<dyn Fn(&Invocation) + Send + Sync>;

/// Records every invocation instead of running it.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    fail_on: Vec<String>,
    hooks: Vec<(String, Hook)>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any invocation whose rendered command line contains `needle`.
    pub fn fail_when(mut self, needle: &str) -> Self {
        self.fail_on.push(needle.to_string());
        self
    }

    /// Run `hook` whenever a program named `program` is invoked.
    pub fn on_program(
        mut self,
        program: &str,
        hook: impl Fn(&Invocation) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.push((program.to_string(), Box::new(hook)));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Program names in invocation order.
    pub fn programs(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(Invocation::program_name)
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), ExecError> {
        self.calls.lock().unwrap().push(invocation.clone());

        let line = invocation.command_line();
        if self.fail_on.iter().any(|needle| line.contains(needle.as_str())) {
            return Err(ExecError::Failed {
                program: invocation.program_name(),
                code: Some(1),
                stderr: format!("recorded failure for {line}"),
            });
        }

        let program = invocation.program_name();
        for (name, hook) in &self.hooks {
            if *name == program {
                hook(invocation);
            }
        }
        Ok(())
    }
}

/// An extension project on disk with the host API installed at a version.
pub struct ExtensionFixture {
    dir: TempDir,
}

impl ExtensionFixture {
    pub fn new(installed: &str) -> Self {
        let dir = TempDir::new().expect("tempdir");
        let fixture = Self { dir };
        fixture.write(
            "package.json",
            &pretty(&json!({
                "name": "weather",
                "title": "Weather",
                "dependencies": { HOST_PACKAGE: format!("^{installed}") },
                "devDependencies": { "typescript": "^4.8.0" },
            })),
        );
        write_lockfile(fixture.root(), installed);
        for tool in STUB_TOOLS {
            fixture.write(&format!("node_modules/.bin/{tool}"), "#!/bin/sh\n");
        }
        fixture.write(
            "src/index.tsx",
            "export default function Command() { return null; }\n",
        );
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(path, contents).expect("write fixture file");
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read fixture file")
    }

    /// Range the manifest currently declares for the host package.
    pub fn declared_range(&self) -> String {
        declared_range(self.root())
    }
}

/// A migration catalog on disk.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Add `<version>/` containing `artifacts` (file names inside it).
    pub fn migration(self, version: &str, artifacts: &[&str]) -> Self {
        let dir = self.root().join(version);
        fs::create_dir_all(&dir).expect("mkdir migration");
        for artifact in artifacts {
            fs::write(dir.join(artifact), format!("// {version} {artifact}\n"))
                .expect("write artifact");
        }
        self
    }
}

impl Default for CatalogFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Make the lockfile resolve whatever the manifest declares, the way a real
/// install would.
pub fn sync_lockfile(project_root: &Path) {
    let range = declared_range(project_root);
    write_lockfile(project_root, range.trim_start_matches('^'));
}

fn declared_range(project_root: &Path) -> String {
    let manifest: Value = serde_json::from_str(
        &fs::read_to_string(project_root.join("package.json")).expect("read manifest"),
    )
    .expect("parse manifest");
    manifest["dependencies"][HOST_PACKAGE]
        .as_str()
        .expect("host dependency")
        .to_string()
}

fn write_lockfile(project_root: &Path, version: &str) {
    let lockfile = json!({
        "name": "weather",
        "lockfileVersion": 3,
        "requires": true,
        "packages": {
            "": { "dependencies": { HOST_PACKAGE: format!("^{version}") } },
            format!("node_modules/{HOST_PACKAGE}"): { "version": version },
        },
    });
    fs::write(project_root.join("package-lock.json"), pretty(&lockfile)).expect("write lockfile");
}

fn pretty(value: &Value) -> String {
    format!("{}\n", serde_json::to_string_pretty(value).expect("render json"))
}

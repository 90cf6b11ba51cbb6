use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use api_migrate_core::HostPlatform;
use api_migrate_core::MigrateConfig;
use api_migrate_core::MigrateError;
use api_migrate_core::Orchestrator;
use api_migrate_core::Outcome;
use api_migrate_core::Phase;
use core_test_support::CatalogFixture;
use core_test_support::ExtensionFixture;
use core_test_support::RecordingRunner;
use core_test_support::sync_lockfile;
use pretty_assertions::assert_eq;
use semver::Version;

fn orchestrator(catalog: &CatalogFixture, runner: &Arc<RecordingRunner>) -> Orchestrator {
    Orchestrator::new(MigrateConfig::default(), catalog.root(), runner.clone())
        .with_host(HostPlatform::Posix)
}

fn versions(list: &[&str]) -> Vec<Version> {
    list.iter()
        .map(|v| Version::parse(v).expect("version"))
        .collect()
}

#[tokio::test]
async fn applies_each_step_in_order_and_bumps_manifest() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new()
        .migration("1.0.0", &["index.ts"])
        .migration("1.1.0", &["config.ts"])
        .migration("1.2.0", &["migration.sh"]);
    let runner = Arc::new(RecordingRunner::new());

    let report = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(
        report.outcome,
        Outcome::Migrated {
            from: Version::new(0, 9, 0),
            to: Version::new(1, 2, 0),
            applied: versions(&["1.0.0", "1.1.0", "1.2.0"]),
        }
    );
    assert_eq!(project.declared_range(), "^1.2.0");
    assert_eq!(
        runner.programs(),
        vec!["npm", "jscodeshift", "jscodeshift", "sh", "ray"]
    );

    let calls = runner.calls();
    let root = &report.project_root;
    assert!(calls.iter().all(|call| call.cwd == *root));

    let code = &calls[1];
    assert_eq!(
        code.args.last(),
        Some(&root.join("src/index.tsx").into_os_string())
    );
    assert!(
        code.args
            .contains(&catalog.root().join("1.0.0/index.ts").into_os_string())
    );

    let config = &calls[2];
    assert!(
        config
            .args
            .contains(&catalog.root().join("1.1.0/config.ts").into_os_string())
    );
    assert_eq!(
        config.args.last(),
        Some(&root.join("package.json").into_os_string())
    );
    assert!(
        !config
            .args
            .contains(&root.join("package-lock.json").into_os_string())
    );

    let script = &calls[3];
    assert_eq!(
        script.args,
        vec![catalog.root().join("1.2.0/migration.sh").into_os_string()]
    );
    assert_eq!(calls[4].args, vec![OsString::from("lint"), OsString::from("--fix")]);
}

#[tokio::test]
async fn up_to_date_project_is_left_alone() {
    let project = ExtensionFixture::new("1.2.0");
    let catalog = CatalogFixture::new()
        .migration("1.0.0", &["index.ts"])
        .migration("1.2.0", &["migration.sh"]);
    let runner = Arc::new(RecordingRunner::new());
    let manifest_before = project.read("package.json");

    let report = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(
        report.outcome,
        Outcome::UpToDate {
            current: Version::new(1, 2, 0)
        }
    );
    assert!(runner.calls().is_empty());
    assert_eq!(project.read("package.json"), manifest_before);
}

#[tokio::test]
async fn empty_source_set_skips_engine() {
    let project = ExtensionFixture::new("0.9.0");
    fs::remove_file(project.path("src/index.tsx")).expect("remove source");
    let catalog = CatalogFixture::new().migration("1.0.0", &["index.ts"]);
    let runner = Arc::new(RecordingRunner::new());

    orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(runner.programs(), vec!["npm", "ray"]);
}

#[tokio::test]
async fn artifacts_of_one_step_all_run() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog =
        CatalogFixture::new().migration("1.0.0", &["index.ts", "config.ts", "migration.sh"]);
    let runner = Arc::new(RecordingRunner::new());

    orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(
        runner.programs(),
        vec!["npm", "jscodeshift", "jscodeshift", "sh", "ray"]
    );
}

#[tokio::test]
async fn step_waits_for_every_artifact_and_reports_code_failure_first() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["index.ts", "migration.sh"]);
    let runner = Arc::new(
        RecordingRunner::new()
            .fail_when("index.ts")
            .fail_when("migration.sh"),
    );

    let err = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect_err("failing step");

    assert_eq!(err.phase(), Phase::Transform);
    assert!(matches!(
        err,
        MigrateError::Transform { ref version, .. } if *version == Version::new(1, 0, 0)
    ));
    assert_eq!(runner.programs(), vec!["npm", "jscodeshift", "sh"]);
}

#[tokio::test]
async fn failing_script_stops_later_steps() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new()
        .migration("1.0.0", &["migration.sh"])
        .migration("1.1.0", &["migration.sh"])
        .migration("1.2.0", &["index.ts"]);
    let runner = Arc::new(
        RecordingRunner::new()
            .fail_when("1.1.0")
            .on_program("sh", |invocation| {
                let step = Path::new(&invocation.args[0])
                    .parent()
                    .and_then(Path::file_name)
                    .expect("version directory")
                    .to_string_lossy()
                    .into_owned();
                fs::write(invocation.cwd.join(format!("migrated-{step}")), "").expect("marker");
            }),
    );

    let err = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect_err("failing script");

    assert_eq!(err.phase(), Phase::Script);
    assert!(matches!(
        err,
        MigrateError::Script { ref version, .. } if *version == Version::new(1, 1, 0)
    ));
    assert_eq!(runner.programs(), vec!["npm", "sh", "sh"]);
    assert!(project.path("migrated-1.0.0").exists());
    assert!(!project.path("migrated-1.1.0").exists());
    assert!(!runner.programs().iter().any(|program| program == "jscodeshift"));
    assert_eq!(project.declared_range(), "^1.2.0");
}

#[tokio::test]
async fn windows_host_prefers_powershell_variant() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["migration.sh", "migration.ps1"]);
    let runner = Arc::new(RecordingRunner::new());

    Orchestrator::new(MigrateConfig::default(), catalog.root(), runner.clone())
        .with_host(HostPlatform::Windows)
        .run(project.root())
        .await
        .expect("pipeline");

    let calls = runner.calls();
    assert_eq!(runner.programs(), vec!["npm", "powershell", "ray"]);
    assert_eq!(
        calls[1].args.last(),
        Some(&catalog.root().join("1.0.0/migration.ps1").into_os_string())
    );
    assert!(calls[1].args.contains(&OsString::from("Bypass")));
}

#[tokio::test]
async fn windows_host_runs_posix_only_script() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["migration.sh"]);
    let runner = Arc::new(RecordingRunner::new());

    Orchestrator::new(MigrateConfig::default(), catalog.root(), runner.clone())
        .with_host(HostPlatform::Windows)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(runner.programs(), vec!["npm", "sh", "ray"]);
    assert_eq!(
        runner.calls()[1].args,
        vec![catalog.root().join("1.0.0/migration.sh").into_os_string()]
    );
}

#[tokio::test]
async fn posix_host_skips_windows_only_script() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["migration.ps1"]);
    let runner = Arc::new(RecordingRunner::new());

    let report = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(runner.programs(), vec!["npm", "ray"]);
    assert!(matches!(report.outcome, Outcome::Migrated { .. }));
}

#[tokio::test]
async fn version_markers_still_advance_the_target() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new()
        .migration("1.0.0", &["index.ts"])
        .migration("1.1.0", &[]);
    let runner = Arc::new(RecordingRunner::new());

    let report = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect("pipeline");

    assert_eq!(project.declared_range(), "^1.1.0");
    assert!(matches!(
        report.outcome,
        Outcome::Migrated { ref applied, .. } if *applied == versions(&["1.0.0", "1.1.0"])
    ));
    assert_eq!(runner.programs(), vec!["npm", "jscodeshift", "ray"]);
}

#[tokio::test]
async fn second_run_finds_nothing_to_do() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new()
        .migration("1.0.0", &["index.ts"])
        .migration("1.1.0", &["migration.sh"]);
    let runner = Arc::new(
        RecordingRunner::new().on_program("npm", |invocation| sync_lockfile(&invocation.cwd)),
    );
    let orchestrator = orchestrator(&catalog, &runner);

    orchestrator.run(project.root()).await.expect("first run");
    let calls_after_first = runner.calls().len();
    let report = orchestrator.run(project.root()).await.expect("second run");

    assert_eq!(
        report.outcome,
        Outcome::UpToDate {
            current: Version::new(1, 1, 0)
        }
    );
    assert_eq!(runner.calls().len(), calls_after_first);
}

#[tokio::test]
async fn install_failure_aborts_before_migrations() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["index.ts"]);
    let runner = Arc::new(RecordingRunner::new().fail_when("npm install"));

    let err = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect_err("install failure");

    assert_eq!(err.phase(), Phase::Install);
    assert_eq!(runner.programs(), vec!["npm"]);
    assert_eq!(project.declared_range(), "^1.0.0");
}

#[tokio::test]
async fn lint_failure_is_reported_last() {
    let project = ExtensionFixture::new("0.9.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["index.ts"]);
    let runner = Arc::new(RecordingRunner::new().fail_when("lint --fix"));

    let err = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect_err("lint failure");

    assert_eq!(err.phase(), Phase::Lint);
    assert_eq!(runner.programs(), vec!["npm", "jscodeshift", "ray"]);
}

#[tokio::test]
async fn missing_manifest_fails_before_any_mutation() {
    let project = ExtensionFixture::new("0.9.0");
    fs::remove_file(project.path("package.json")).expect("remove manifest");
    let catalog = CatalogFixture::new().migration("1.0.0", &["index.ts"]);
    let runner = Arc::new(RecordingRunner::new());

    let err = orchestrator(&catalog, &runner)
        .run(project.root())
        .await
        .expect_err("missing manifest");

    assert_eq!(err.phase(), Phase::Configuration);
    assert!(runner.calls().is_empty());
}

#[tokio::test]
async fn missing_catalog_is_a_catalog_error() {
    let project = ExtensionFixture::new("0.9.0");
    let runner = Arc::new(RecordingRunner::new());

    let err = Orchestrator::new(
        MigrateConfig::default(),
        project.path("no-such-catalog"),
        runner.clone(),
    )
    .run(project.root())
    .await
    .expect_err("missing catalog");

    assert_eq!(err.phase(), Phase::Catalog);
    assert!(runner.calls().is_empty());
}

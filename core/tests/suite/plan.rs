use std::sync::Arc;

use api_migrate_catalog::ArtifactKind;
use api_migrate_core::MigrateConfig;
use api_migrate_core::Orchestrator;
use core_test_support::CatalogFixture;
use core_test_support::ExtensionFixture;
use core_test_support::RecordingRunner;
use pretty_assertions::assert_eq;
use semver::Version;

#[test]
fn plan_lists_newer_migrations_without_side_effects() {
    let project = ExtensionFixture::new("1.0.0");
    let catalog = CatalogFixture::new()
        .migration("0.9.0", &["index.ts"])
        .migration("1.0.0", &["index.ts"])
        .migration("1.10.0", &["migration.sh"])
        .migration("1.2.0", &[])
        .migration("1.9.0", &["config.ts", "migration.sh"]);
    let runner = Arc::new(RecordingRunner::new());
    let manifest_before = project.read("package.json");

    let plan = Orchestrator::new(MigrateConfig::default(), catalog.root(), runner.clone())
        .plan(project.root())
        .expect("plan");

    let versions: Vec<String> = plan
        .applicable
        .iter()
        .map(|migration| migration.version.to_string())
        .collect();
    assert_eq!(versions, vec!["1.2.0", "1.9.0", "1.10.0"]);
    assert_eq!(plan.target(), Some(&Version::new(1, 10, 0)));
    assert_eq!(plan.real_count(), 2);
    assert_eq!(plan.project.current_version, Version::new(1, 0, 0));
    assert_eq!(
        plan.applicable[1].artifacts.kinds(),
        vec![ArtifactKind::ConfigTransform, ArtifactKind::Script]
    );

    assert!(runner.calls().is_empty());
    assert_eq!(project.read("package.json"), manifest_before);
}

#[test]
fn plan_is_empty_at_catalog_maximum() {
    let project = ExtensionFixture::new("2.0.0");
    let catalog = CatalogFixture::new().migration("1.0.0", &["index.ts"]);

    let plan = Orchestrator::new(
        MigrateConfig::default(),
        catalog.root(),
        Arc::new(RecordingRunner::new()),
    )
    .plan(project.root())
    .expect("plan");

    assert!(plan.is_empty());
    assert_eq!(plan.target(), None);
}

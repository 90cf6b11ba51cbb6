//! Root of the `api-migrate-core` library.
//!
//! Composes the catalog, project and exec crates into the migration
//! pipeline: resolve the installed host API version, bump the manifest,
//! apply every newer catalog entry in ascending order, then lint once.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output goes through tracing or the CLI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod state;
pub mod updater;
pub mod validator;

pub use config::BumpPolicy;
pub use config::ConfigError;
pub use config::ConfigLoader;
pub use config::MigrateConfig;
pub use error::MigrateError;
pub use error::Phase;
pub use error::Result;
pub use orchestrator::MigrationPlan;
pub use orchestrator::Orchestrator;
pub use orchestrator::Outcome;
pub use orchestrator::PipelineReport;
pub use state::PipelineStage;
pub use state::PipelineState;
pub use updater::DependencyUpdater;
pub use validator::PostMigrationValidator;

// Re-exported so callers can drive the pipeline without naming the
// lower-level crates.
pub use api_migrate_exec::CommandRunner;
pub use api_migrate_exec::HostPlatform;
pub use api_migrate_exec::ProcessRunner;

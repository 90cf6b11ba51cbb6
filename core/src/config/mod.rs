//! Layered configuration: defaults, then a TOML file, then `API_MIGRATE_*`
//! environment variables.

pub mod error;
pub mod loader;

pub use error::ConfigError;
pub use loader::BumpPolicy;
pub use loader::CatalogConfig;
pub use loader::ConfigLoader;
pub use loader::MigrateConfig;
pub use loader::PROJECT_CONFIG_FILE;
pub use loader::PipelineConfig;
pub use loader::ProjectConfig;
pub use loader::ScriptsConfig;
pub use loader::ToolConfig;

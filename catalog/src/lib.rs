//! Migration catalog
//!
//! A catalog is a directory whose children are named after the host API
//! release they migrate to (`1.28.0/`, `1.29.0/`, ...). Each child may carry
//! a code transform, a configuration transform and a platform script; a
//! child with none of them is a version marker that still advances the
//! target version.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod catalog;
pub mod error;
pub mod layout;
pub mod migration;

pub use catalog::MigrationCatalog;
pub use catalog::parse_catalog_version;
pub use catalog::real_migrations_of;
pub use error::CatalogError;
pub use error::Result;
pub use layout::CatalogLayout;
pub use migration::ArtifactKind;
pub use migration::Artifacts;
pub use migration::Migration;
pub use migration::PlatformScript;

//! Target project model
//!
//! Everything the migration engine needs to know about the project being
//! upgraded: where its manifest and lockfile live, which host API version is
//! installed, and which files a rewrite should touch.

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod error;
pub mod files;
pub mod lockfile;
pub mod manifest;
pub mod resolver;

pub use error::ProjectError;
pub use error::Result;
pub use files::FileClass;
pub use files::FileSet;
pub use files::FileSetQuery;
pub use lockfile::Lockfile;
pub use manifest::Manifest;
pub use manifest::caret_range;
pub use resolver::ExtensionProject;
pub use resolver::VersionResolver;

/// Default manifest file name.
pub const DEFAULT_MANIFEST: &str = "package.json";

/// Default lockfile name.
pub const DEFAULT_LOCKFILE: &str = "package-lock.json";

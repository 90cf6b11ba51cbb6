//! Child-process execution
//!
//! Every external step of a migration (platform scripts, the structural
//! rewrite engine, the package manager, the lint tool) runs as a child
//! process through a [`CommandRunner`]. The working directory is always
//! passed explicitly on the [`Invocation`].

#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod codemod;
pub mod error;
pub mod invocation;
mod output;
pub mod runner;
pub mod script;
pub mod tool;

pub use codemod::CodemodOutcome;
pub use codemod::CodemodRunner;
pub use codemod::TRANSFORM_PLACEHOLDER;
pub use error::ExecError;
pub use error::Result;
pub use invocation::Invocation;
pub use runner::CommandRunner;
pub use runner::ProcessRunner;
pub use script::HostPlatform;
pub use script::ScriptOutcome;
pub use script::ScriptRunner;
pub use script::ScriptSelection;
pub use script::ScriptShells;
pub use tool::ToolResolver;

//! Library half of the `themecraft` binary, so commands can be tested
//! without spawning a process.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};

//! Argument definitions for the `themecraft` binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "themecraft",
    version,
    about = "Derive design tokens and export themed bundles",
    long_about = "Derive a design token set from a JSON design configuration and export\n\
                  stylesheets, component classes and documentation as a directory or zip."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive the token set for a configuration and print it as JSON.
    Derive(DeriveArgs),
    /// Export a complete bundle for a configuration and optional scene.
    Export(ExportArgs),
    /// Print the built-in component catalog as JSON.
    Catalog,
}

#[derive(Args)]
pub struct DeriveArgs {
    /// Design configuration JSON file.
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Write the tokens here instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Design configuration JSON file.
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,

    /// Scene description JSON file.
    #[arg(long, value_name = "FILE")]
    pub scene: Option<PathBuf>,

    /// Component catalog JSON file (default: the built-in catalog).
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Output directory, or archive path with --zip.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Write a single zip archive instead of a directory.
    #[arg(long)]
    pub zip: bool,
}

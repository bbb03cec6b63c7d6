//! weave CLI - literate document engine.
//!
//! Provides commands for:
//! - `marked`: Render a document for preview, running its code blocks

mod commands;
mod error;
mod output;

use std::future::Future;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::MarkedArgs;
use error::CliError;
use output::Output;

/// weave - literate document engine.
#[derive(Parser)]
#[command(name = "weave", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a document, executing its code, to stdout.
    Marked(MarkedArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Marked(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Stdout carries the rendered document
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Marked(args) => block_on(args.execute()),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        if let Some(stderr) = err.command_stderr() {
            output.detail(stderr);
        }
        std::process::exit(1);
    }
}

/// Run a command on a single-threaded runtime; execution is sequential.
///
/// The runtime is shut down without waiting, since a timed-out stdin read
/// may still occupy a blocking thread.
fn block_on(future: impl Future<Output = Result<(), CliError>>) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(future);
    runtime.shutdown_background();
    result
}

//! `weave marked` command implementation.
//!
//! Renders a document for a live preview: reads markup from `--file` or
//! stdin, runs its executable blocks and writes the paginated result to
//! stdout.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tokio::fs::File;
use weave_config::{CliSettings, Config};
use weave_core::{Engine, EngineConfig, parse_duration};

use crate::error::CliError;

/// Arguments for the marked command.
#[derive(Args, Debug)]
pub(crate) struct MarkedArgs {
    /// Path to configuration file (default: auto-discover weave.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File to render, relative to the working directory (default: stdin).
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path of the document being previewed; its directory is the source root.
    #[arg(long, env = "MARKED_PATH")]
    context: Option<PathBuf>,

    /// Working directory for commands and for opening --file.
    #[arg(long, env = "MARKED_ORIGIN")]
    origin: Option<PathBuf>,

    /// Only parse the document, do not execute anything.
    #[arg(short = 'p', long)]
    parse_only: bool,

    /// Timeout for the whole run, e.g. 500ms or 10s (default: 5s).
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Number of the first section (overrides config and page markers).
    #[arg(long)]
    section: Option<usize>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl MarkedArgs {
    /// Execute the marked command.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            file: self.file,
            context: self.context,
            origin: self.origin,
            section: self.section,
            timeout: self.timeout,
            parse_only: self.parse_only.then_some(true),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let engine = Engine::new(engine_config(&config));
        let input = config.document_paths().input;

        tracing::debug!(
            root = %engine.config().root.display(),
            work_dir = %engine.config().work_dir.display(),
            filename = engine.config().filename.as_deref().unwrap_or("-"),
            input = %input.as_deref().map_or_else(|| "stdin".into(), |p| p.display().to_string()),
            "execute"
        );

        let mut stdout = io::stdout().lock();
        match input {
            Some(path) => {
                let file = File::open(&path)
                    .await
                    .map_err(|source| CliError::Input { path, source })?;
                engine.run(file, &mut stdout).await?;
            }
            None => engine.run(tokio::io::stdin(), &mut stdout).await?,
        }

        Ok(())
    }
}

/// Map loaded configuration onto the engine's settings.
fn engine_config(config: &Config) -> EngineConfig {
    let paths = config.document_paths();
    EngineConfig {
        root: paths.root,
        filename: paths.filename,
        work_dir: paths.work_dir,
        section: config.document.section,
        timeout: config.execution.timeout(),
        parse_only: config.execution.parse_only,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: MarkedArgs,
    }

    fn parse(args: &[&str]) -> MarkedArgs {
        TestCli::try_parse_from(std::iter::once("marked").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "-f",
            "hype.md",
            "-p",
            "--timeout",
            "250ms",
            "--section",
            "3",
            "--context",
            "/book/ch1/hype.md",
            "--origin",
            "/book",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("hype.md")));
        assert!(args.parse_only);
        assert_eq!(args.timeout, Some(Duration::from_millis(250)));
        assert_eq!(args.section, Some(3));
        assert_eq!(args.context, Some(PathBuf::from("/book/ch1/hype.md")));
        assert_eq!(args.origin, Some(PathBuf::from("/book")));
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = TestCli::try_parse_from(["marked", "--timeout", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_engine_config_from_settings() {
        let mut config = Config::default();
        config.document.context = Some(PathBuf::from("/book/ch1/hype.md"));
        config.document.origin = Some(PathBuf::from("/book"));
        config.document.section = Some(2);
        config.execution.timeout_ms = Some(1500);

        let engine = engine_config(&config);

        assert_eq!(engine.root, PathBuf::from("/book/ch1"));
        assert_eq!(engine.filename.as_deref(), Some("hype.md"));
        assert_eq!(engine.work_dir, PathBuf::from("/book"));
        assert_eq!(engine.section, Some(2));
        assert_eq!(engine.timeout, Some(Duration::from_millis(1500)));
        assert!(!engine.parse_only);
    }
}

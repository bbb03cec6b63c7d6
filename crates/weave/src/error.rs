//! CLI error types.

use std::path::PathBuf;

use weave_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Document(#[from] weave_core::Error),

    #[error("cannot open {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    /// Standard error of a failed command, if that is what went wrong.
    pub(crate) fn command_stderr(&self) -> Option<&str> {
        match self {
            Self::Document(err) => err
                .captured_output()
                .map(|output| output.stderr.as_str())
                .filter(|stderr| !stderr.trim().is_empty()),
            _ => None,
        }
    }
}

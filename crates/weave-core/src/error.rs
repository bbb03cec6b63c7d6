//! Error types for parsing and executing documents.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use weave_lexer::LexError;

use crate::context::ContextError;
use crate::node::CapturedOutput;

/// Result alias for weave operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Position of an element or node in its source document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// Document filename, if known.
    pub filename: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl Location {
    #[must_use]
    pub fn new(filename: Option<&str>, line: usize) -> Self {
        Self {
            filename: filename.map(str::to_owned),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(filename) => write!(f, "{filename}:{}", self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// Error from parsing, executing or paginating a document.
///
/// Every variant is fatal to the current pipeline run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A missing element or otherwise unusable value was handed to the core.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The markup could not be split into elements.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Reading the input or writing the rendered output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An element with a tag the parser does not handle.
    #[error("{location}: unknown element '{tag}'")]
    UnknownElement {
        /// Where the element starts.
        location: Location,
        /// Element tag.
        tag: String,
    },

    /// An attribute value that cannot be interpreted.
    #[error("{location}: malformed attribute {name}=\"{value}\": {reason}")]
    MalformedAttribute {
        /// Where the element starts.
        location: Location,
        /// Attribute name.
        name: String,
        /// Attribute value as written.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A source file referenced by a node cannot be read.
    #[error("{location}: cannot read {}", .path.display())]
    UnresolvableReference {
        /// Node location.
        location: Location,
        /// Resolved file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An execution directive that cannot be carried out.
    #[error("{location}: {reason}")]
    UnsupportedDirective {
        /// Node location.
        location: Location,
        /// What is unsupported.
        reason: String,
    },

    /// The command of an executable node could not be started.
    #[error("{location}: failed to start `{command}`")]
    Spawn {
        /// Node location.
        location: Location,
        /// Command line.
        command: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An executable node ran but reported a failed status.
    #[error(
        "{location}: `{command}` exited with {} (expected {expected})",
        describe_status(.output.status)
    )]
    ExecutionFailed {
        /// Node location.
        location: Location,
        /// Command line.
        command: String,
        /// Expected exit status.
        expected: i32,
        /// Everything the command printed, kept for diagnostics.
        output: CapturedOutput,
    },

    /// The governing context was cancelled or its deadline passed.
    #[error("{}: {cause}", describe_location(.location.as_ref()))]
    Cancelled {
        /// Node that was about to run or was running, if any.
        location: Option<Location>,
        /// Why the context is done.
        #[source]
        cause: ContextError,
    },

    /// The whole operation did not finish within its time bound.
    #[error("operation timed out after {0:?}")]
    TimedOut(Duration),

    /// Section numbering or page lookup failed.
    #[error("structural error: {0}")]
    Structural(String),
}

impl Error {
    /// Whether this error comes from cancellation or a timeout.
    #[must_use]
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::TimedOut(_))
    }

    /// Captured output attached to an execution failure.
    #[must_use]
    pub fn captured_output(&self) -> Option<&CapturedOutput> {
        match self {
            Self::ExecutionFailed { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn describe_location(location: Option<&Location>) -> String {
    location.map_or_else(|| "execution".to_owned(), ToString::to_string)
}

fn describe_status(status: Option<i32>) -> String {
    status.map_or_else(
        || "no status (terminated by signal)".to_owned(),
        |code| format!("status {code}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(Some("hype.md"), 12).to_string(), "hype.md:12");
        assert_eq!(Location::new(None, 3).to_string(), "line 3");
    }

    #[test]
    fn test_cancelled_display() {
        let err = Error::Cancelled {
            location: None,
            cause: ContextError::DeadlineExceeded,
        };
        assert_eq!(err.to_string(), "execution: context deadline exceeded");
        assert!(err.is_cancellation());

        let err = Error::Cancelled {
            location: Some(Location::new(Some("a.md"), 4)),
            cause: ContextError::Cancelled,
        };
        assert_eq!(err.to_string(), "a.md:4: context cancelled");
    }

    #[test]
    fn test_execution_failed_display() {
        let err = Error::ExecutionFailed {
            location: Location::new(None, 7),
            command: "sh".to_owned(),
            expected: 0,
            output: CapturedOutput {
                stdout: "partial".to_owned(),
                stderr: "boom".to_owned(),
                status: Some(2),
            },
        };
        assert_eq!(err.to_string(), "line 7: `sh` exited with status 2 (expected 0)");
        assert_eq!(err.captured_output().map(|o| o.stdout.as_str()), Some("partial"));
        assert!(!err.is_cancellation());
    }

    #[test]
    fn test_signal_status_display() {
        assert_eq!(describe_status(None), "no status (terminated by signal)");
    }
}

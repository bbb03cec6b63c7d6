use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use weave_lexer::Attributes;

use super::command::{CapturedOutput, CommandError, CommandSpec, run_command};
use crate::context::ExecContext;
use crate::duration::parse_duration;
use crate::error::{Error, Location, Result};
use crate::node::write_fenced;

/// Info string of the appended output block when `output` is not set.
const DEFAULT_OUTPUT_LANGUAGE: &str = "text";

/// Fenced code with attributes, optionally executed.
///
/// Execution is controlled by attributes, interpreted when the node runs:
///
/// - `exec`: absent or `false` means display only. Empty or `true` runs the
///   code with the interpreter for `language`; any other value is a command
///   line run through `sh -c`. The code is always piped to stdin.
/// - `exit`: expected exit status (default 0).
/// - `timeout`: per-node bound such as `500ms` or `2s`.
/// - `output`: info string of the output block (default `text`).
/// - `env`: space-separated `KEY=VALUE` pairs added to the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct FencedCode {
    location: Location,
    attrs: Attributes,
    code: String,
    source: String,
    work_dir: PathBuf,
    output: Option<CapturedOutput>,
}

impl FencedCode {
    pub(crate) fn new(
        location: Location,
        attrs: Attributes,
        code: String,
        source: String,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            location,
            attrs,
            code,
            source,
            work_dir,
            output: None,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    /// Fence language, if one was given.
    pub fn language(&self) -> Option<&str> {
        self.attrs.get("language").filter(|lang| !lang.is_empty())
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether the `exec` attribute asks for execution.
    pub fn is_exec(&self) -> bool {
        self.attrs.get("exec").is_some_and(|exec| exec != "false")
    }

    /// Output captured by the last successful run.
    pub fn output(&self) -> Option<&CapturedOutput> {
        self.output.as_ref()
    }

    pub(crate) async fn run(&mut self, ctx: &ExecContext) -> Result<()> {
        if !self.is_exec() {
            return Ok(());
        }

        let spec = self.command()?;
        let expected = self.expected_status()?;
        let ctx = match self.timeout()? {
            Some(timeout) => ctx.with_timeout(timeout),
            None => ctx.clone(),
        };

        tracing::debug!(location = %self.location, command = %spec.display(), "running code");

        let output = run_command(&spec, &ctx).await.map_err(|err| match err {
            CommandError::Io(source) => Error::Spawn {
                location: self.location.clone(),
                command: spec.display(),
                source,
            },
            CommandError::Interrupted(cause) => Error::Cancelled {
                location: Some(self.location.clone()),
                cause,
            },
        })?;

        if output.status != Some(expected) {
            return Err(Error::ExecutionFailed {
                location: self.location.clone(),
                command: spec.display(),
                expected,
                output,
            });
        }

        self.output = Some(output);
        Ok(())
    }

    /// Build the process to spawn from the `exec` and `language` attributes.
    fn command(&self) -> Result<CommandSpec> {
        let exec = self.attrs.get("exec").unwrap_or_default();

        let (program, args) = if exec.is_empty() || exec == "true" {
            let language = self.language().unwrap_or_default();
            let (program, args) = interpreter(language).ok_or_else(|| {
                let reason = if language.is_empty() {
                    "exec requires a language or a command".to_owned()
                } else {
                    format!("no interpreter for language '{language}'")
                };
                Error::UnsupportedDirective {
                    location: self.location.clone(),
                    reason,
                }
            })?;
            (program.to_owned(), args.iter().map(|&a| a.to_owned()).collect())
        } else {
            ("sh".to_owned(), vec!["-c".to_owned(), exec.to_owned()])
        };

        Ok(CommandSpec {
            program,
            args,
            stdin: self.code.clone(),
            dir: self.work_dir.clone(),
            env: self.env()?,
        })
    }

    fn expected_status(&self) -> Result<i32> {
        match self.attrs.get("exit") {
            None => Ok(0),
            Some(value) => value
                .parse()
                .map_err(|_| self.malformed("exit", value, "expected an integer exit status")),
        }
    }

    fn timeout(&self) -> Result<Option<Duration>> {
        self.attrs
            .get("timeout")
            .map(|value| {
                parse_duration(value)
                    .map_err(|err| self.malformed("timeout", value, &err.to_string()))
            })
            .transpose()
    }

    fn env(&self) -> Result<Vec<(String, String)>> {
        let Some(value) = self.attrs.get("env") else {
            return Ok(Vec::new());
        };
        value
            .split_whitespace()
            .map(|pair| {
                pair.split_once('=')
                    .filter(|(key, _)| !key.is_empty())
                    .map(|(key, val)| (key.to_owned(), val.to_owned()))
                    .ok_or_else(|| self.malformed("env", value, "expected KEY=VALUE pairs"))
            })
            .collect()
    }

    fn malformed(&self, name: &str, value: &str, reason: &str) -> Error {
        Error::MalformedAttribute {
            location: self.location.clone(),
            name: name.to_owned(),
            value: value.to_owned(),
            reason: reason.to_owned(),
        }
    }
}

/// Interpreter reading a program from stdin, by fence language.
fn interpreter(language: &str) -> Option<(&'static str, &'static [&'static str])> {
    match language {
        "sh" | "shell" | "console" => Some(("sh", &[])),
        "bash" => Some(("bash", &[])),
        "python" | "py" | "python3" => Some(("python3", &["-"])),
        "ruby" | "rb" => Some(("ruby", &[])),
        "node" | "js" | "javascript" => Some(("node", &[])),
        _ => None,
    }
}

impl fmt::Display for FencedCode {
    /// Writes the original block, then the captured stdout as its own block.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)?;

        let Some(output) = &self.output else {
            return Ok(());
        };

        if !self.source.ends_with('\n') {
            f.write_str("\n")?;
        }
        f.write_str("\n")?;
        let info = self.attrs.get("output").unwrap_or(DEFAULT_OUTPUT_LANGUAGE);
        write_fenced(f, info, &output.stdout)?;
        f.write_str("\n")
    }
}

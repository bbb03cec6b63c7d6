//! External process execution under an [`ExecContext`].

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::context::{ContextError, ExecContext};

/// Everything a command printed, plus its exit status.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Standard output (lossy UTF-8).
    pub stdout: String,
    /// Standard error (lossy UTF-8).
    pub stderr: String,
    /// Exit code; `None` if the process was terminated by a signal.
    pub status: Option<i32>,
}

/// A process to spawn: program, arguments, stdin and environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommandSpec {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) stdin: String,
    pub(crate) dir: PathBuf,
    pub(crate) env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Command line for messages.
    pub(crate) fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Failure to run a command to completion.
#[derive(Debug)]
pub(crate) enum CommandError {
    /// The process could not be spawned or its pipes failed.
    Io(io::Error),
    /// The context finished first; the process was killed.
    Interrupted(ContextError),
}

/// Run a command, feeding `spec.stdin` and capturing output.
///
/// The process is raced against `ctx`. If the context finishes first the
/// child is dropped, which kills it.
pub(crate) async fn run_command(
    spec: &CommandSpec,
    ctx: &ExecContext,
) -> Result<CapturedOutput, CommandError> {
    if let Some(err) = ctx.err() {
        return Err(CommandError::Interrupted(err));
    }

    tracing::debug!(
        command = %spec.display(),
        dir = %spec.dir.display(),
        "spawning command"
    );

    let mut child = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(&spec.dir)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(CommandError::Io)?;

    let stdin = child.stdin.take();
    let input = spec.stdin.as_bytes();
    let write = async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        match stdin.write_all(input).await {
            // The command may exit without reading its input
            Err(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err),
            _ => Ok(()),
        }
        // stdin dropped here, signalling EOF
    };

    let finished = ctx
        .run(async move { tokio::join!(write, child.wait_with_output()) })
        .await
        .map_err(CommandError::Interrupted)?;

    let (written, output) = finished;
    written.map_err(CommandError::Io)?;
    let output = output.map_err(CommandError::Io)?;

    let captured = CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status.code(),
    };

    tracing::debug!(
        command = %spec.display(),
        status = ?captured.status,
        stdout_bytes = captured.stdout.len(),
        "command finished"
    );

    Ok(captured)
}

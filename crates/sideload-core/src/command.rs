//! # External Commands
//!
//! Every side effect on a database goes through an external program
//! (`influxd`, `influx`, `rm`, or the runner binary itself when driven by a
//! batch). [`CommandRunner`] is the seam between building those invocations
//! and executing them, so the orchestration can be exercised without the
//! real tools installed.

use crate::error::{SideloadError, SideloadResult};
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tracing::{debug, info};

/// A program plus its argument vector. Arguments are never passed through a
/// shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Program and arguments joined by single spaces, for logs and dry runs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Program and arguments quoted for a POSIX shell, so the line can be
    /// pasted back and split into the same words
    pub fn shell_line(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        // Only a NUL byte makes quoting fail; no shell can carry one anyway
        shlex::try_join(words).unwrap_or_else(|_| self.command_line())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes commands to completion, one at a time
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and wait for it. A non-zero exit is an error.
    async fn run(&self, command: &CommandSpec) -> SideloadResult<CommandOutput>;
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    async fn run(&self, command: &CommandSpec) -> SideloadResult<CommandOutput> {
        (**self).run(command).await
    }
}

/// How a [`ProcessRunner`] treats the child's stdout and stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Collect both streams and log them once the child exits
    Capture,
    /// Let the child write straight to this process's streams
    Inherit,
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    output: OutputMode,
}

impl ProcessRunner {
    pub fn capturing() -> Self {
        Self {
            output: OutputMode::Capture,
        }
    }

    pub fn inheriting() -> Self {
        Self {
            output: OutputMode::Inherit,
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::capturing()
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandSpec) -> SideloadResult<CommandOutput> {
        info!(command = %command, "Executing command");

        let mut child = tokio::process::Command::new(command.program());
        child.args(command.get_args()).stdin(Stdio::null());

        let (status, output) = match self.output {
            OutputMode::Capture => {
                let raw = child
                    .output()
                    .await
                    .map_err(|e| SideloadError::CommandSpawn {
                        program: command.program().to_string(),
                        source: e,
                    })?;
                let output = CommandOutput {
                    stdout: String::from_utf8_lossy(&raw.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&raw.stderr).into_owned(),
                };
                (raw.status, output)
            }
            OutputMode::Inherit => {
                let status = child
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(|e| SideloadError::CommandSpawn {
                        program: command.program().to_string(),
                        source: e,
                    })?;
                (status, CommandOutput::default())
            }
        };

        if !output.stdout.trim().is_empty() {
            info!(program = %command.program(), stdout = %output.stdout.trim_end(), "Command output");
        }
        if !output.stderr.trim().is_empty() {
            info!(program = %command.program(), stderr = %output.stderr.trim_end(), "Command diagnostics");
        }

        if !status.success() {
            return Err(SideloadError::CommandFailed {
                command: command.command_line(),
                status: status.to_string(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        debug!(program = %command.program(), "Command finished");
        Ok(output)
    }
}

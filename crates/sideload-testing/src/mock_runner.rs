//! # Recording Command Runner
//!
//! A [`CommandRunner`] that records each command it is asked to run and
//! reports success without spawning anything. Failures can be scripted by
//! substring of the command line.

use async_trait::async_trait;
use sideload_core::{CommandOutput, CommandRunner, CommandSpec, SideloadError, SideloadResult};
use std::sync::{Arc, Mutex};

/// Exit status reported for scripted failures
pub const SIMULATED_STATUS: &str = "exit status: 1";

/// Records commands instead of running them
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    failures: Vec<String>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl RecordingRunner {
    /// Create a runner where every command succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every command whose command line contains `needle`
    pub fn with_failure_matching(mut self, needle: impl Into<String>) -> Self {
        self.failures.push(needle.into());
        self
    }

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines of every command run so far, in order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(CommandSpec::command_line)
            .collect()
    }

    /// Get the number of commands run
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Check if any command line contained `needle`
    pub fn was_called_with(&self, needle: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|call| call.command_line().contains(needle))
    }

    /// Forget recorded calls; scripted failures stay
    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &CommandSpec) -> SideloadResult<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());

        let line = command.command_line();
        if self.failures.iter().any(|needle| line.contains(needle.as_str())) {
            return Err(SideloadError::CommandFailed {
                command: line,
                status: SIMULATED_STATUS.to_string(),
                stderr: "simulated failure".to_string(),
            });
        }

        Ok(CommandOutput::default())
    }
}

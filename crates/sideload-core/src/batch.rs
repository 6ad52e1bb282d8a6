//! # Batch Driver
//!
//! Splits a long interval into one-hour windows and runs the single-window
//! runner binary once per window, in order. Each window is finished before
//! the next one starts because every run reuses the same temporary
//! namespace.

use crate::command::{CommandRunner, CommandSpec};
use crate::error::{SideloadError, SideloadResult};
use crate::identifiers::Identifier;
use crate::time::{TimeWindow, Timestamp};
use std::path::PathBuf;
use tracing::{info, warn};

/// Width of every batch window, in hours
pub const BATCH_WINDOW_HOURS: i64 = 1;

/// Default program run for each window
pub const DEFAULT_RUNNER_COMMAND: &str = "influx-sideload";

/// Cut `[from, until)` into consecutive one-hour windows.
///
/// The number of windows is the whole number of hours in the interval; a
/// trailing remainder shorter than an hour is not covered. The first window
/// starts at `from` exactly as it was spelled. Windows are produced lazily,
/// one at a time.
pub fn plan_windows(from: &Timestamp, until: &Timestamp) -> SideloadResult<WindowPlan> {
    if from >= until {
        return Err(SideloadError::InvalidWindow {
            start: from.to_string(),
            end: until.to_string(),
        });
    }

    let span = until.instant() - from.instant();
    let total = span.num_hours() / BATCH_WINDOW_HOURS;
    let remainder = span - chrono::TimeDelta::hours(total * BATCH_WINDOW_HOURS);
    if !remainder.is_zero() {
        warn!(
            from = %from,
            until = %until,
            uncovered_secs = remainder.num_seconds(),
            "Interval is not a whole number of hours, the remainder is skipped"
        );
    }

    Ok(WindowPlan {
        cursor: from.clone(),
        remaining: u64::try_from(total).unwrap_or_default(),
    })
}

/// The windows of a batch, in order
#[derive(Debug, Clone)]
pub struct WindowPlan {
    cursor: Timestamp,
    remaining: u64,
}

impl WindowPlan {
    /// Start of the next window
    pub fn start(&self) -> &Timestamp {
        &self.cursor
    }

    /// Windows not yet produced
    pub fn len(&self) -> u64 {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

impl Iterator for WindowPlan {
    type Item = SideloadResult<TimeWindow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let next = match self.cursor.add_hours(BATCH_WINDOW_HOURS) {
            Ok(next) => next,
            Err(e) => {
                self.remaining = 0;
                return Some(Err(e));
            }
        };
        let start = std::mem::replace(&mut self.cursor, next.clone());
        Some(TimeWindow::new(start, next))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Whether windows are executed or only printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverMode {
    #[default]
    Execute,
    /// Print each runner invocation to stdout without running it
    DryRun,
}

/// The runner invocation shared by every window, minus the window itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerTemplate {
    pub command: String,
    pub source_host: String,
    pub destination_host: String,
    pub database: Identifier,
    pub staging_directory: PathBuf,
    pub post_restore_wait_secs: u64,
}

impl RunnerTemplate {
    /// Runner invocation for one window, using the runner's own flag names
    pub fn for_window(&self, window: &TimeWindow) -> CommandSpec {
        CommandSpec::new(&self.command).args([
            "-start".to_string(),
            window.start().to_string(),
            "-end".to_string(),
            window.end().to_string(),
            "-influxdb-source".to_string(),
            self.source_host.clone(),
            "-influxdb-destination".to_string(),
            self.destination_host.clone(),
            "-database".to_string(),
            self.database.to_string(),
            "-database-directory".to_string(),
            self.staging_directory.to_string_lossy().into_owned(),
            "-timeout".to_string(),
            self.post_restore_wait_secs.to_string(),
        ])
    }
}

/// Outcome of a completed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Windows run (or printed, in dry-run mode)
    pub windows: usize,
    /// Runner invocations, shell-quoted, one per window, in order
    pub invocations: Vec<String>,
}

pub struct BatchDriver<R> {
    commands: R,
    template: RunnerTemplate,
    mode: DriverMode,
}

impl<R: CommandRunner> BatchDriver<R> {
    pub fn new(commands: R, template: RunnerTemplate, mode: DriverMode) -> Self {
        Self {
            commands,
            template,
            mode,
        }
    }

    pub fn mode(&self) -> DriverMode {
        self.mode
    }

    /// Run (or print) every window in order, stopping at the first failure
    pub async fn run(&self, plan: WindowPlan) -> SideloadResult<BatchReport> {
        let mut report = BatchReport::default();

        if plan.is_empty() {
            warn!("Interval is shorter than one window, nothing to do");
        } else {
            info!(
                from = %plan.start(),
                windows = plan.len(),
                hours_per_window = BATCH_WINDOW_HOURS,
                mode = ?self.mode,
                "Starting batch"
            );
        }

        for (index, window) in plan.enumerate() {
            let window = window?;
            let invocation = self.template.for_window(&window);
            let line = invocation.shell_line();

            match self.mode {
                DriverMode::DryRun => println!("{}", line),
                DriverMode::Execute => {
                    info!(index, start = %window.start(), end = %window.end(), "Running window");
                    self.commands.run(&invocation).await.map_err(|e| {
                        SideloadError::WindowFailed {
                            index,
                            start: window.start().to_string(),
                            end: window.end().to_string(),
                            source: Box::new(e),
                        }
                    })?;
                }
            }

            report.invocations.push(line);
            report.windows += 1;
        }

        info!(windows = report.windows, "Batch finished");
        Ok(report)
    }
}

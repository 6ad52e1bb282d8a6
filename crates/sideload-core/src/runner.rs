//! # Single-Window Runner
//!
//! One backup, restore and merge cycle for one database.
//!
//! A first run copies the whole database:
//!
//! 1. `influxd backup -portable -database <db> -host <source> <dir>`
//! 2. `influxd restore -portable -db <db> -host <destination> <dir>`
//!
//! Any other run copies one time window and side-loads it:
//!
//! 1. `influxd backup ... -start <start> -end <end> <dir>`
//! 2. `influxd restore -portable -db <db> -newdb <db>_tmp -host <destination> <dir>`
//! 3. post-restore hold
//! 4. `influx -database <db>_tmp -execute "SELECT * INTO <db>..:MEASUREMENT ..."`
//! 5. `influx -execute "DROP DATABASE <db>_tmp"`
//!
//! Either way the staging directory is removed last, whether or not the
//! earlier steps succeeded.
//!
//! Runs for the same database must not overlap: they share `<db>_tmp`.

use crate::command::{CommandRunner, CommandSpec};
use crate::config::{BackupRequest, ToolPaths};
use crate::error::SideloadResult;
use crate::identifiers::Identifier;
use crate::influxql::Statement;
use crate::time::{Clock, TimeWindow};
use tracing::{info, warn};

/// What a finished run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// The window that was backed up; `None` for a first run
    pub window: Option<TimeWindow>,
    /// Command lines in the order they were executed
    pub commands: Vec<String>,
}

/// `influxd backup`, for the whole database or for one window
pub fn backup_command(
    tools: &ToolPaths,
    request: &BackupRequest,
    window: Option<&TimeWindow>,
) -> CommandSpec {
    let mut command = CommandSpec::new(&tools.influxd).args([
        "backup",
        "-portable",
        "-database",
        request.database.as_str(),
        "-host",
        request.source_host.as_str(),
    ]);
    if let Some(window) = window {
        command = command.args(["-start", window.start().as_str(), "-end", window.end().as_str()]);
    }
    command.arg(request.staging_arg())
}

/// `influxd restore`, into the live database or into `into` when given
pub fn restore_command(
    tools: &ToolPaths,
    request: &BackupRequest,
    into: Option<&Identifier>,
) -> CommandSpec {
    let mut command = CommandSpec::new(&tools.influxd).args([
        "restore",
        "-portable",
        "-db",
        request.database.as_str(),
    ]);
    if let Some(namespace) = into {
        command = command.args(["-newdb", namespace.as_str()]);
    }
    command
        .args(["-host", request.destination_host.as_str()])
        .arg(request.staging_arg())
}

/// `influx` query copying the temporary namespace back into the live one
pub fn merge_command(
    tools: &ToolPaths,
    request: &BackupRequest,
    temporary: &Identifier,
    window: Option<&TimeWindow>,
) -> CommandSpec {
    CommandSpec::new(&tools.influx)
        .args(["-database", temporary.as_str(), "-execute"])
        .arg(Statement::merge_into(&request.database, window).render())
}

/// `influx` query dropping the temporary namespace
pub fn drop_command(tools: &ToolPaths, temporary: &Identifier) -> CommandSpec {
    CommandSpec::new(&tools.influx)
        .arg("-execute")
        .arg(Statement::drop_database(temporary).render())
}

/// `rm -rfv <dir>`
pub fn remove_staging_command(tools: &ToolPaths, request: &BackupRequest) -> CommandSpec {
    CommandSpec::new(&tools.rm)
        .arg("-rfv")
        .arg(request.staging_arg())
}

/// Executes one [`BackupRequest`] against a [`CommandRunner`]
pub struct BackupRunner<R, C> {
    commands: R,
    clock: C,
    tools: ToolPaths,
}

impl<R: CommandRunner, C: Clock> BackupRunner<R, C> {
    pub fn new(commands: R, clock: C, tools: ToolPaths) -> Self {
        Self {
            commands,
            clock,
            tools,
        }
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Run the request to completion.
    ///
    /// The first failing step ends the backup/restore/merge sequence. Once a
    /// restore into the temporary namespace has been attempted the namespace
    /// is still dropped, and the staging directory is always removed. The
    /// error returned is the first one encountered.
    pub async fn run(&self, request: &BackupRequest) -> SideloadResult<RunReport> {
        let mut report = RunReport::default();

        let outcome = match request.window.resolve(self.clock.now()) {
            Ok(None) => self.full_copy(request, &mut report).await,
            Ok(Some(window)) => {
                report.window = Some(window.clone());
                self.side_load(request, &window, &mut report).await
            }
            Err(e) => Err(e),
        };

        let cleanup = self
            .exec(&remove_staging_command(&self.tools, request), &mut report)
            .await;

        match (outcome, cleanup) {
            (Ok(()), Ok(())) => {
                info!(
                    database = %request.database,
                    commands = report.commands.len(),
                    "Backup and restore completed"
                );
                Ok(report)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(cleanup_err)) => Err(cleanup_err),
            (Err(e), Err(cleanup_err)) => {
                warn!(
                    directory = %request.staging_directory.display(),
                    error = %cleanup_err,
                    "Staging directory cleanup failed after an earlier error"
                );
                Err(e)
            }
        }
    }

    async fn full_copy(&self, request: &BackupRequest, report: &mut RunReport) -> SideloadResult<()> {
        info!(database = %request.database, "First run, copying the whole database");

        self.exec(&backup_command(&self.tools, request, None), report)
            .await?;
        self.exec(&restore_command(&self.tools, request, None), report)
            .await
    }

    async fn side_load(
        &self,
        request: &BackupRequest,
        window: &TimeWindow,
        report: &mut RunReport,
    ) -> SideloadResult<()> {
        let temporary = request.temporary_namespace()?;

        info!(
            database = %request.database,
            start = %window.start(),
            end = %window.end(),
            "Backing up window"
        );
        self.exec(&backup_command(&self.tools, request, Some(window)), report)
            .await?;

        let merged = match self
            .exec(&restore_command(&self.tools, request, Some(&temporary)), report)
            .await
        {
            Ok(()) => {
                request.stabilization.wait().await;
                self.exec(
                    &merge_command(&self.tools, request, &temporary, Some(window)),
                    report,
                )
                .await
            }
            Err(e) => Err(e),
        };

        let dropped = self.exec(&drop_command(&self.tools, &temporary), report).await;

        match (merged, dropped) {
            (Ok(()), dropped) => dropped,
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(drop_err)) => {
                warn!(
                    namespace = %temporary,
                    error = %drop_err,
                    "Temporary namespace could not be dropped and needs manual cleanup"
                );
                Err(e)
            }
        }
    }

    async fn exec(&self, command: &CommandSpec, report: &mut RunReport) -> SideloadResult<()> {
        report.commands.push(command.command_line());
        self.commands.run(command).await.map(|_| ())
    }
}

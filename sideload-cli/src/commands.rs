//! What each binary does once its flags are parsed.

use crate::args::{BatchArgs, RunnerArgs};
use crate::error::CliResult;
use sideload_core::{
    BackupRunner, BatchDriver, BatchReport, Clock, CommandRunner, RunReport, ToolPaths,
};
use sideload_http::{ContinuousQueryCopier, ContinuousQueryRecord, QueryClient};
use std::time::Duration;
use tracing::info;

/// One runner invocation: either the continuous-query copy or a single
/// backup/restore/merge cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideloadOutcome {
    ContinuousQueries(Vec<ContinuousQueryRecord>),
    Window(RunReport),
}

/// Run `influx-sideload` against the given command runner, clock and tool
/// locations
pub async fn run_sideload<R, C>(
    args: &RunnerArgs,
    commands: R,
    clock: C,
    tools: ToolPaths,
    http_timeout: Duration,
) -> CliResult<SideloadOutcome>
where
    R: CommandRunner,
    C: Clock,
{
    if args.continuous_queries {
        let copied = copy_continuous_queries(args, http_timeout).await?;
        return Ok(SideloadOutcome::ContinuousQueries(copied));
    }

    let request = args.backup_request()?;
    let report = BackupRunner::new(commands, clock, tools)
        .run(&request)
        .await?;
    Ok(SideloadOutcome::Window(report))
}

/// Copy the database's continuous queries from the source query API to the
/// destination's
pub async fn copy_continuous_queries(
    args: &RunnerArgs,
    http_timeout: Duration,
) -> CliResult<Vec<ContinuousQueryRecord>> {
    let database = args.target.database()?;
    let copier = ContinuousQueryCopier::new(
        QueryClient::with_timeout(&args.query_source, http_timeout)?,
        QueryClient::with_timeout(&args.query_destination, http_timeout)?,
    );

    info!(
        database = %database,
        source = %args.query_source,
        destination = %args.query_destination,
        "Copying continuous queries"
    );
    Ok(copier.copy(&database).await?)
}

/// Run `influx-sideload-batch`: plan the windows and drive one runner
/// invocation per window
pub async fn run_batch<R: CommandRunner>(args: &BatchArgs, commands: R) -> CliResult<BatchReport> {
    let windows = args.windows()?;
    let driver = BatchDriver::new(commands, args.template()?, args.mode());
    Ok(driver.run(windows).await?)
}

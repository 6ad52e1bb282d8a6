//! Command-line flags of both tools.

use clap::{ArgAction, Args, Parser};
use sideload_core::batch::DEFAULT_RUNNER_COMMAND;
use sideload_core::config::{
    DEFAULT_DATABASE, DEFAULT_DESTINATION_HOST, DEFAULT_POST_RESTORE_WAIT_SECS,
    DEFAULT_SINCE_HOURS, DEFAULT_SOURCE_HOST, DEFAULT_STAGING_DIRECTORY,
};
use sideload_core::{
    BackupRequest, DriverMode, Identifier, RunnerTemplate, SideloadResult, StabilizationDelay,
    Timestamp, WindowPlan, WindowSource, plan_windows,
};
use std::path::PathBuf;

/// Default query API of the source server
pub const DEFAULT_QUERY_SOURCE: &str = "http://influxdb-source:8086";

/// Default query API of the destination server
pub const DEFAULT_QUERY_DESTINATION: &str = "http://influxdb-destination:8086";

/// Flags shared by the runner and the batch driver
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Source influxd backup/restore address
    #[arg(long = "influxdb-source", default_value = DEFAULT_SOURCE_HOST)]
    pub source: String,

    /// Destination influxd backup/restore address
    #[arg(long = "influxdb-destination", default_value = DEFAULT_DESTINATION_HOST)]
    pub destination: String,

    /// Database to copy
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Local staging directory for backup files
    #[arg(long = "database-directory", default_value = DEFAULT_STAGING_DIRECTORY)]
    pub database_directory: PathBuf,

    /// Seconds to wait after restoring before the merge query
    #[arg(long, default_value_t = DEFAULT_POST_RESTORE_WAIT_SECS)]
    pub timeout: u64,
}

impl TargetArgs {
    pub fn database(&self) -> SideloadResult<Identifier> {
        Identifier::parse(&self.database)
    }
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "influx-sideload", version)]
#[command(about = "Incrementally back up an InfluxDB database and side-load it into another server")]
pub struct RunnerArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Source HTTP query API
    #[arg(long = "influxdb-query-source", default_value = DEFAULT_QUERY_SOURCE)]
    pub query_source: String,

    /// Destination HTTP query API
    #[arg(long = "influxdb-query-destination", default_value = DEFAULT_QUERY_DESTINATION)]
    pub query_destination: String,

    /// Look-back in hours from now; must be negative
    #[arg(long, default_value_t = DEFAULT_SINCE_HOURS, allow_negative_numbers = true)]
    pub since: i64,

    /// Window start (RFC3339), used together with --end
    #[arg(long)]
    pub start: Option<String>,

    /// Window end (RFC3339), used together with --start
    #[arg(long)]
    pub end: Option<String>,

    /// Copy the whole database straight into the destination
    #[arg(
        long,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub firstrun: bool,

    /// Copy continuous-query definitions instead of data, then exit
    #[arg(
        long = "continuous-queries",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub continuous_queries: bool,
}

impl RunnerArgs {
    pub fn backup_request(&self) -> SideloadResult<BackupRequest> {
        let window = WindowSource::from_flags(
            self.firstrun,
            self.start.as_deref(),
            self.end.as_deref(),
            self.since,
        )?;

        Ok(
            BackupRequest::new(self.target.database()?, &self.target.database_directory)
                .with_source(&self.target.source)
                .with_destination(&self.target.destination)
                .with_window(window)
                .with_stabilization(StabilizationDelay::from_secs(self.target.timeout)),
        )
    }
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "influx-sideload-batch", version)]
#[command(about = "Run influx-sideload once per hour across a longer interval")]
pub struct BatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Interval start (RFC3339)
    #[arg(long)]
    pub from: String,

    /// Interval end (RFC3339)
    #[arg(long)]
    pub until: String,

    /// Runner program started for each window
    #[arg(long, default_value = DEFAULT_RUNNER_COMMAND)]
    pub command: String,

    /// Print each runner invocation instead of running it
    #[arg(
        long = "dry-run",
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub dry_run: bool,
}

impl BatchArgs {
    pub fn windows(&self) -> SideloadResult<WindowPlan> {
        plan_windows(&Timestamp::parse(&self.from)?, &Timestamp::parse(&self.until)?)
    }

    pub fn template(&self) -> SideloadResult<RunnerTemplate> {
        Ok(RunnerTemplate {
            command: self.command.clone(),
            source_host: self.target.source.clone(),
            destination_host: self.target.destination.clone(),
            database: self.target.database()?,
            staging_directory: self.target.database_directory.clone(),
            post_restore_wait_secs: self.target.timeout,
        })
    }

    pub fn mode(&self) -> DriverMode {
        if self.dry_run {
            DriverMode::DryRun
        } else {
            DriverMode::Execute
        }
    }
}

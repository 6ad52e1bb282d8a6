//! # influx-sideload
//!
//! Incremental backup and restore of an InfluxDB 1.x database from one
//! server to another. A window of data is backed up from the source,
//! restored into a scratch `<db>_tmp` database on the destination, merged
//! into the live database with `SELECT * INTO` and dropped again.
//!
//! - [`sideload_core`]: window resolution, command construction and the
//!   single-window runner and batch driver
//! - [`sideload_http`]: the `/query` client and continuous-query copier
//! - [`sideload_cli`]: flags and entry points of the two binaries

pub use sideload_cli::{BatchArgs, CliError, RunnerArgs, normalize_args};
pub use sideload_core::{
    BackupRequest, BackupRunner, BatchDriver, BatchReport, Clock, CommandRunner, CommandSpec,
    DriverMode, Identifier, ProcessRunner, RunReport, RunnerTemplate, SideloadError,
    SideloadResult, StabilizationDelay, SystemClock, TimeWindow, Timestamp, ToolPaths,
    WindowPlan, WindowSource, plan_windows,
};
pub use sideload_http::{
    ContinuousQueryCopier, ContinuousQueryRecord, HttpError, HttpResult, QueryClient,
};

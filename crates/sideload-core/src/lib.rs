//! # Sideload Core
//!
//! Incremental backup and restore of an InfluxDB database between two
//! instances, driven through `influxd backup`/`restore` and the `influx`
//! query CLI.
//!
//! Each run backs up a time window from the source, restores it into a
//! scratch `<db>_tmp` database on the destination, copies the window's points
//! into the live database and drops the scratch database. The batch driver
//! repeats that hour by hour across a longer interval.

pub mod batch;
pub mod command;
pub mod config;
pub mod error;
pub mod identifiers;
pub mod influxql;
pub mod runner;
pub mod time;

pub use batch::{BatchDriver, BatchReport, DriverMode, RunnerTemplate, WindowPlan, plan_windows};
pub use command::{CommandOutput, CommandRunner, CommandSpec, OutputMode, ProcessRunner};
pub use config::{BackupRequest, StabilizationDelay, ToolPaths, WindowSource};
pub use error::{SideloadError, SideloadResult};
pub use identifiers::{IdValidationError, Identifier};
pub use influxql::Statement;
pub use runner::{BackupRunner, RunReport};
pub use time::{Clock, SystemClock, TimeWindow, Timestamp};

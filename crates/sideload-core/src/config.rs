//! # Run Configuration
//!
//! What a single side-load run needs to know: the two `influxd` endpoints,
//! the database, the staging directory, how the time window is chosen and how
//! long to hold after restoring.
//!
//! ## Environment Variables
//!
//! Tool locations can be overridden without new flags:
//!
//! - `SIDELOAD_INFLUXD_PATH` - backup/restore binary (default: `/usr/bin/influxd`)
//! - `SIDELOAD_INFLUX_PATH` - query CLI (default: `influx`)
//! - `SIDELOAD_RM_PATH` - remove command used for the staging directory (default: `/bin/rm`)

use crate::error::{SideloadError, SideloadResult};
use crate::identifiers::Identifier;
use crate::time::TimeWindow;
use chrono::{DateTime, FixedOffset};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_SOURCE_HOST: &str = "influxdb-source:8088";
pub const DEFAULT_DESTINATION_HOST: &str = "influxdb-destination:8088";
pub const DEFAULT_DATABASE: &str = "stress";
pub const DEFAULT_STAGING_DIRECTORY: &str = "/tmp/stress";
pub const DEFAULT_SINCE_HOURS: i64 = -1;
pub const DEFAULT_POST_RESTORE_WAIT_SECS: u64 = 10;

pub const DEFAULT_INFLUXD_PATH: &str = "/usr/bin/influxd";
pub const DEFAULT_INFLUX_PATH: &str = "influx";
pub const DEFAULT_RM_PATH: &str = "/bin/rm";

pub const INFLUXD_PATH_ENV: &str = "SIDELOAD_INFLUXD_PATH";
pub const INFLUX_PATH_ENV: &str = "SIDELOAD_INFLUX_PATH";
pub const RM_PATH_ENV: &str = "SIDELOAD_RM_PATH";

/// Locations of the external programs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub influxd: String,
    pub influx: String,
    pub rm: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            influxd: DEFAULT_INFLUXD_PATH.to_string(),
            influx: DEFAULT_INFLUX_PATH.to_string(),
            rm: DEFAULT_RM_PATH.to_string(),
        }
    }
}

impl ToolPaths {
    /// Defaults, overridden by any `SIDELOAD_*_PATH` variables that are set
    ///
    /// # Errors
    ///
    /// Returns `SideloadError::Config` if a variable is set but blank.
    pub fn from_env() -> SideloadResult<Self> {
        let mut paths = Self::default();

        if let Some(path) = get_env_path(INFLUXD_PATH_ENV)? {
            paths.influxd = path;
        }
        if let Some(path) = get_env_path(INFLUX_PATH_ENV)? {
            paths.influx = path;
        }
        if let Some(path) = get_env_path(RM_PATH_ENV)? {
            paths.rm = path;
        }

        Ok(paths)
    }
}

fn get_env_path(key: &str) -> SideloadResult<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Err(SideloadError::config(key, "must not be blank")),
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            Err(SideloadError::config(key, "must be valid UTF-8"))
        }
    }
}

/// How the time range of a run is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSource {
    /// Full backup and restore straight into the live database
    FirstRun,
    /// Explicit bounds, used verbatim
    Explicit(TimeWindow),
    /// Look back `since_hours` (negative) from the moment the run starts
    Relative { since_hours: i64 },
}

impl WindowSource {
    /// Apply flag precedence: first run, then an explicit start/end pair,
    /// then the relative offset.
    ///
    /// A lone `start` or `end` does not make an explicit window; the run falls
    /// back to the relative offset and logs a warning.
    pub fn from_flags(
        first_run: bool,
        start: Option<&str>,
        end: Option<&str>,
        since_hours: i64,
    ) -> SideloadResult<Self> {
        if first_run {
            return Ok(Self::FirstRun);
        }

        match (non_blank(start), non_blank(end)) {
            (Some(start), Some(end)) => Ok(Self::Explicit(TimeWindow::parse(start, end)?)),
            (None, None) => Ok(Self::Relative { since_hours }),
            (start, end) => {
                warn!(
                    start = start.unwrap_or(""),
                    end = end.unwrap_or(""),
                    since_hours,
                    "Both -start and -end are needed for an explicit window, using -since"
                );
                Ok(Self::Relative { since_hours })
            }
        }
    }

    /// The window to back up, or `None` for a first run
    pub fn resolve(&self, now: DateTime<FixedOffset>) -> SideloadResult<Option<TimeWindow>> {
        match self {
            WindowSource::FirstRun => Ok(None),
            WindowSource::Explicit(window) => Ok(Some(window.clone())),
            WindowSource::Relative { since_hours } => {
                TimeWindow::trailing(now, *since_hours).map(Some)
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Hold between restoring into the temporary namespace and querying it.
///
/// Freshly restored shards report "shard is disabled" for a short while; the
/// destination gives no signal for when they are ready, so this is a fixed
/// delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StabilizationDelay {
    hold: Duration,
}

impl StabilizationDelay {
    pub fn fixed(hold: Duration) -> Self {
        Self { hold }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::fixed(Duration::from_secs(secs))
    }

    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub async fn wait(&self) {
        if self.hold.is_zero() {
            return;
        }
        info!(
            hold = %humantime::format_duration(self.hold),
            "Waiting for restored shards to be enabled"
        );
        tokio::time::sleep(self.hold).await;
    }
}

impl Default for StabilizationDelay {
    fn default() -> Self {
        Self::from_secs(DEFAULT_POST_RESTORE_WAIT_SECS)
    }
}

/// Everything one invocation of the runner operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRequest {
    pub source_host: String,
    pub destination_host: String,
    pub database: Identifier,
    pub staging_directory: PathBuf,
    pub window: WindowSource,
    pub stabilization: StabilizationDelay,
}

impl BackupRequest {
    /// Request with default endpoints, a one-hour look-back and the default
    /// post-restore hold
    pub fn new(database: Identifier, staging_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_host: DEFAULT_SOURCE_HOST.to_string(),
            destination_host: DEFAULT_DESTINATION_HOST.to_string(),
            database,
            staging_directory: staging_directory.into(),
            window: WindowSource::Relative {
                since_hours: DEFAULT_SINCE_HOURS,
            },
            stabilization: StabilizationDelay::default(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, host: impl Into<String>) -> Self {
        self.source_host = host.into();
        self
    }

    #[must_use]
    pub fn with_destination(mut self, host: impl Into<String>) -> Self {
        self.destination_host = host.into();
        self
    }

    #[must_use]
    pub fn with_window(mut self, window: WindowSource) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn with_stabilization(mut self, stabilization: StabilizationDelay) -> Self {
        self.stabilization = stabilization;
        self
    }

    pub fn temporary_namespace(&self) -> SideloadResult<Identifier> {
        self.database.temporary()
    }

    /// Staging directory as a command-line argument
    pub fn staging_arg(&self) -> String {
        self.staging_directory.to_string_lossy().into_owned()
    }
}

//! # Sideload CLI
//!
//! Flag parsing, logging setup and entry points behind the
//! `influx-sideload` and `influx-sideload-batch` binaries.

pub mod args;
pub mod commands;
pub mod error;
pub mod legacy_flags;
pub mod logging;

pub use args::{BatchArgs, RunnerArgs, TargetArgs};
pub use commands::{SideloadOutcome, copy_continuous_queries, run_batch, run_sideload};
pub use error::{CliError, CliResult};
pub use legacy_flags::normalize_args;
pub use logging::init_logging;

//! # Sideload Testing
//!
//! Test doubles shared by the sideload crates' tests.
//!
//! - [`RecordingRunner`]: a [`CommandRunner`](sideload_core::CommandRunner)
//!   that records commands instead of spawning them
//! - [`FixedClock`]: a clock stuck at one instant
//! - [`MockInflux`]: a mock server for the InfluxDB `/query` API
//!
//! ```rust
//! use sideload_testing::RecordingRunner;
//!
//! let runner = RecordingRunner::new().with_failure_matching("restore");
//! assert_eq!(runner.call_count(), 0);
//! ```

/// Fixed clock
pub mod clock;
/// Mock InfluxDB query API
pub mod mock_influx;
/// Recording command runner
pub mod mock_runner;

pub use clock::FixedClock;
pub use mock_influx::MockInflux;
pub use mock_runner::RecordingRunner;

//! Property-Based Tests for Window Planning and Run Sequencing
//!
//! These tests check invariants that should hold for any interval or
//! look-back: batch windows tile the interval hour by hour, identifiers
//! render safely, and every side-load run ends by dropping the temporary
//! namespace and removing the staging directory.

use chrono::{DateTime, TimeDelta};
use proptest::prelude::*;
use sideload_core::{
    BackupRequest, BackupRunner, Identifier, SideloadResult, StabilizationDelay, TimeWindow,
    Timestamp, ToolPaths, WindowSource, plan_windows,
};
use sideload_testing::{FixedClock, RecordingRunner};

// Strategy for interval starts between 2000 and 2030, whole seconds
fn start_strategy() -> impl Strategy<Value = Timestamp> {
    (946_684_800i64..1_893_456_000i64).prop_map(|secs| {
        let instant = DateTime::from_timestamp(secs, 0)
            .unwrap()
            .fixed_offset();
        Timestamp::from_instant(instant)
    })
}

// Strategy for interval starts with a millisecond fraction
fn fractional_start_strategy() -> impl Strategy<Value = Timestamp> {
    (946_684_800i64..1_893_456_000i64, 1u32..1000).prop_map(|(secs, millis)| {
        let instant = DateTime::from_timestamp(secs, millis * 1_000_000)
            .unwrap()
            .fixed_offset();
        Timestamp::from_instant(instant)
    })
}

// Strategy for valid database names
fn identifier_strategy() -> impl Strategy<Value = Identifier> {
    prop::string::string_regex("[a-zA-Z0-9_ .\"-]{1,32}")
        .unwrap()
        .prop_filter_map("Valid identifier", |s| Identifier::new(s).ok())
}

proptest! {
    /// Property: the window count is the whole number of hours in the interval
    #[test]
    fn prop_window_count_is_whole_hours(
        from in start_strategy(),
        interval_secs in 1i64..(72 * 3600)
    ) {
        let until = Timestamp::from_instant(from.instant() + TimeDelta::seconds(interval_secs));
        let plan = plan_windows(&from, &until).expect("Interval is non-empty");

        prop_assert_eq!(plan.len() as i64, interval_secs / 3600);
        prop_assert_eq!(plan.count() as i64, interval_secs / 3600);
    }

    /// Property: windows are one hour wide, contiguous and start at `from`
    #[test]
    fn prop_windows_tile_the_interval(
        from in start_strategy(),
        hours in 1i64..48,
        extra_secs in 0i64..3600
    ) {
        let until = Timestamp::from_instant(
            from.instant() + TimeDelta::seconds(hours * 3600 + extra_secs),
        );
        let windows: Vec<TimeWindow> = plan_windows(&from, &until)
            .expect("Interval is non-empty")
            .collect::<SideloadResult<_>>()
            .expect("Every window is valid");

        prop_assert_eq!(windows[0].start(), &from);
        for window in &windows {
            prop_assert_eq!(window.duration(), TimeDelta::hours(1));
        }
        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].start());
        }
        prop_assert!(windows[windows.len() - 1].end() <= &until);
    }

    /// Property: a fractional start keeps every printed window an hour wide
    #[test]
    fn prop_fractional_bounds_reparse_to_whole_hours(
        from in fractional_start_strategy(),
        hours in 1i64..24
    ) {
        let until = from.add_hours(hours).expect("Within range");
        let windows: Vec<TimeWindow> = plan_windows(&from, &until)
            .expect("Interval is non-empty")
            .collect::<SideloadResult<_>>()
            .expect("Every window is valid");

        prop_assert_eq!(windows.len() as i64, hours);
        for window in &windows {
            let start = Timestamp::parse(window.start().as_str()).expect("Start re-parses");
            let end = Timestamp::parse(window.end().as_str()).expect("End re-parses");
            prop_assert_eq!(end.instant() - start.instant(), TimeDelta::hours(1));
        }
        let last = Timestamp::parse(windows[windows.len() - 1].end().as_str()).expect("End re-parses");
        prop_assert_eq!(last, until);
    }

    /// Property: the temporary namespace is always `<db>_tmp`
    #[test]
    fn prop_temporary_namespace_suffix(database in identifier_strategy()) {
        if let Ok(temporary) = database.temporary() {
            prop_assert_eq!(temporary.as_str(), format!("{}_tmp", database.as_str()));
        }
    }

    /// Property: quoted identifiers never leave an unescaped double quote
    #[test]
    fn prop_identifier_rendering_is_balanced(database in identifier_strategy()) {
        let rendered = database.to_influxql();
        if database.is_bare() {
            prop_assert_eq!(rendered, database.as_str());
        } else {
            prop_assert!(rendered.starts_with('"') && rendered.ends_with('"'));
            let inner = &rendered[1..rendered.len() - 1];
            let mut escaped = false;
            for c in inner.chars() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else {
                    prop_assert_ne!(c, '"');
                }
            }
            prop_assert!(!escaped);
        }
    }

    /// Property: every relative run drops the temporary namespace, then
    /// removes the staging directory
    #[test]
    fn prop_side_load_always_cleans_up(
        since_hours in -72i64..0,
        failing_step in prop::option::of(prop::sample::select(vec![
            " backup ", "-newdb", "SELECT * INTO", "DROP DATABASE",
        ]))
    ) {
        let mut recorder = RecordingRunner::new();
        if let Some(needle) = failing_step {
            recorder = recorder.with_failure_matching(needle);
        }
        let request = BackupRequest::new(Identifier::new("stress").unwrap(), "/tmp/stress")
            .with_window(WindowSource::Relative { since_hours })
            .with_stabilization(StabilizationDelay::none());
        let runner = BackupRunner::new(
            recorder.clone(),
            FixedClock::at("2021-06-01T12:00:00Z"),
            ToolPaths::default(),
        );

        let result = tokio_test::block_on(runner.run(&request));
        prop_assert_eq!(result.is_ok(), failing_step.is_none());

        let lines = recorder.command_lines();
        prop_assert_eq!(lines.last().map(String::as_str), Some("/bin/rm -rfv /tmp/stress"));
        if failing_step != Some(" backup ") {
            prop_assert_eq!(
                lines[lines.len() - 2].as_str(),
                "influx -execute DROP DATABASE stress_tmp"
            );
        }
    }
}

//! # Continuous-Query Mode Integration Tests
//!
//! `influx-sideload -continuous-queries` against mock source and destination
//! query APIs.

use clap::Parser;
use sideload_cli::{CliError, RunnerArgs, SideloadOutcome, normalize_args, run_sideload};
use sideload_core::ToolPaths;
use sideload_http::HttpError;
use sideload_testing::{FixedClock, MockInflux, RecordingRunner};
use std::time::Duration;

const CQ_HOURLY: &str = "CREATE CONTINUOUS QUERY cq_hourly ON stress BEGIN \
     SELECT mean(value) INTO stress.autogen.cpu_1h FROM stress.autogen.cpu GROUP BY time(1h), * END";
const CQ_DAILY: &str = "CREATE CONTINUOUS QUERY \"cq daily\" ON stress BEGIN \
     SELECT max(value) INTO stress.autogen.cpu_1d FROM stress.autogen.cpu GROUP BY time(1d), * END";

fn args(source: &MockInflux, destination: &MockInflux) -> RunnerArgs {
    RunnerArgs::try_parse_from(normalize_args([
        "influx-sideload".to_string(),
        "-continuous-queries".to_string(),
        "-influxdb-query-source".to_string(),
        source.uri(),
        "-influxdb-query-destination".to_string(),
        format!("{}/query", destination.uri()),
    ]))
    .unwrap()
}

async fn run(args: &RunnerArgs, recorder: &RecordingRunner) -> Result<SideloadOutcome, CliError> {
    run_sideload(
        args,
        recorder.clone(),
        FixedClock::at("2021-06-01T12:00:00Z"),
        ToolPaths::default(),
        Duration::from_secs(20),
    )
    .await
}

#[tokio::test]
async fn test_definitions_copied_without_touching_data() {
    let source = MockInflux::start()
        .await
        .with_continuous_queries("stress", &[("cq_hourly", CQ_HOURLY), ("cq daily", CQ_DAILY)])
        .await;
    let destination = MockInflux::start().await.accepting_writes().await;
    let recorder = RecordingRunner::new();

    let outcome = run(&args(&source, &destination), &recorder).await.unwrap();

    match outcome {
        SideloadOutcome::ContinuousQueries(records) => {
            let names: Vec<_> = records.iter().map(|r| r.name.as_deref()).collect();
            assert_eq!(names, vec![Some("cq_hourly"), Some("cq daily")]);
        }
        other => panic!("Expected a continuous-query copy, got {:?}", other),
    }
    assert_eq!(
        destination.written_queries().await,
        vec![
            ("stress".to_string(), CQ_HOURLY.to_string()),
            ("stress".to_string(), CQ_DAILY.to_string()),
        ]
    );
    assert_eq!(recorder.call_count(), 0);
}

#[tokio::test]
async fn test_database_without_definitions() {
    let source = MockInflux::start()
        .await
        .with_continuous_queries("stress", &[])
        .await;
    let destination = MockInflux::start().await.accepting_writes().await;

    let outcome = run(&args(&source, &destination), &RecordingRunner::new())
        .await
        .unwrap();

    assert_eq!(outcome, SideloadOutcome::ContinuousQueries(Vec::new()));
    assert!(destination.written_queries().await.is_empty());
}

#[tokio::test]
async fn test_unanswered_listing_is_an_http_error() {
    // No listing mounted: wiremock answers 404
    let source = MockInflux::start().await;
    let destination = MockInflux::start().await.accepting_writes().await;

    let err = run(&args(&source, &destination), &RecordingRunner::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CliError::Http(HttpError::Status { status: 404, .. })
    ));
}

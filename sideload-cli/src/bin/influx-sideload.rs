use clap::Parser;
use sideload_cli::{
    CliError, RunnerArgs, SideloadOutcome, init_logging, normalize_args, run_sideload,
};
use sideload_core::{ProcessRunner, SystemClock, ToolPaths};
use sideload_http::timeout_from_env;

#[tokio::main]
async fn main() {
    init_logging();

    let args = match RunnerArgs::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = run(&args).await {
        tracing::error!(error = %e, "influx-sideload failed");
        std::process::exit(1);
    }
}

async fn run(args: &RunnerArgs) -> Result<(), CliError> {
    let tools = ToolPaths::from_env()?;
    let http_timeout = timeout_from_env()?;

    match run_sideload(
        args,
        ProcessRunner::capturing(),
        SystemClock,
        tools,
        http_timeout,
    )
    .await?
    {
        SideloadOutcome::ContinuousQueries(copied) => {
            tracing::info!(copied = copied.len(), "Continuous query copy finished");
        }
        SideloadOutcome::Window(report) => {
            tracing::info!(commands = report.commands.len(), "Run finished");
        }
    }
    Ok(())
}

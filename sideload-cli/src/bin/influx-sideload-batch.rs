use clap::Parser;
use sideload_cli::{BatchArgs, init_logging, normalize_args, run_batch};
use sideload_core::ProcessRunner;

#[tokio::main]
async fn main() {
    init_logging();

    let args = match BatchArgs::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    if let Err(e) = run_batch(&args, ProcessRunner::inheriting()).await {
        tracing::error!(error = %e, "influx-sideload-batch failed");
        std::process::exit(1);
    }
}

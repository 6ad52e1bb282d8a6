/// Initialize JSON logging once.
///
/// `RUST_LOG` selects what is logged, with `info` added as a default
/// directive. Logs go to stderr; stdout carries the batch dry-run output.
pub fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .try_init();
}

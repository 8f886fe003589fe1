use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

/// Command output owns stdout, so diagnostics go to stderr and stay quiet
/// unless `WREN_LOG_LEVEL` asks for more.
fn init_logging() {
    let level = std::env::var("WREN_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).compact().init();
}

fn main() -> ExitCode {
    init_logging();
    wren_cli::run()
}

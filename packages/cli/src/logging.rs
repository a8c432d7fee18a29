// ABOUTME: Tracing subscriber setup for the regressivos binary
// ABOUTME: RUST_LOG wins; otherwise warn, or debug with --verbose

use tracing_subscriber::EnvFilter;

use regressivos_config::constants::RUST_LOG;

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

pub fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(RUST_LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

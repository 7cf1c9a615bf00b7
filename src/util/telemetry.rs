//! Log subscriber setup for the `lfg-sim` binary and embedders.

use tracing_subscriber::EnvFilter;

/// Directives used when `RUST_LOG` is unset or does not parse.
const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the process-wide log subscriber unless one is already present.
///
/// Events go to stderr tagged with the emitting thread's name
/// (`lfg-instance-3`, `lfg-generator`), leaving stdout to the simulation's
/// own lines. `RUST_LOG` selects what is shown; without it only warnings and
/// errors appear.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let directives = std::env::var("RUST_LOG").ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_writer(std::io::stderr)
        .with_thread_names(true)
        .try_init();
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

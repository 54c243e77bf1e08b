// ABOUTME: Log output for the console and smoke front-ends
// ABOUTME: Routes `log` records through a tracing-subscriber formatter on stderr

use tracing_subscriber::EnvFilter;

/// Install the stderr logger. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "in450_viewer_lib=debug,in450_viewer=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    // try_init also bridges the `log` facade the library logs through
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("logging already initialised: {}", e);
    }
}

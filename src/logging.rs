use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber, writing to stderr
///
/// `-v` forces debug output. Otherwise `RUST_LOG` is honoured and falls back
/// to `info`.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::new(filter_directive(
            verbose,
            std::env::var("RUST_LOG").ok(),
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn filter_directive(verbose: bool, rust_log: Option<String>) -> String {
    if verbose {
        return "debug".to_string();
    }
    rust_log
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| "info".to_string())
}

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs a global `tracing` subscriber. Safe to call more than once.
///
/// The filter comes from `FEEDBACK_LOG`, then `RUST_LOG`, then the verbosity flag.
pub fn init_logging(verbose: bool) {
    let filter = std::env::var("FEEDBACK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map_or_else(
            |_| {
                if verbose {
                    EnvFilter::new("debug")
                } else {
                    EnvFilter::new("info")
                }
            },
            |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        );

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
    }
}

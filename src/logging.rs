//! Logging setup
//!
//! Errors are written to stderr, everything else to stdout. `RUST_LOG`
//! overrides the level chosen from configuration.

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::writer::{MakeWriter, MakeWriterExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "cache_api=debug,tower_http=debug"
    } else {
        "cache_api=info,tower_http=info"
    }
}

/// Formatting layer that sends ERROR events to `err` and all others to `out`.
pub fn fmt_layer<S, Out, Err>(out: Out, err: Err, use_color: bool) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    Out: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    Err: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(err.with_max_level(Level::ERROR).or_else(out))
        .with_ansi(use_color)
}

/// Installs the global tracing subscriber. Call once, at startup.
pub fn init_tracing(debug: bool, use_color: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(std::io::stdout, std::io::stderr, use_color))
        .init();
}

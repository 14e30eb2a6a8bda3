//! Tracing setup with optional span timing.
//!
//! With `--timing`, spans annotated `#[instrument]` log their duration when
//! they close (`FmtSpan::CLOSE`). Span close events are emitted at INFO, so
//! the timing filter floor is INFO even without `--verbose`.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

pub fn init_tracing(verbose: bool, timing: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else if timing {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let span_events = if timing { FmtSpan::CLOSE } else { FmtSpan::NONE };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_level(true)
                .with_span_events(span_events)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

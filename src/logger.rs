use std::path::Path;

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Targets, fmt, fmt::MakeWriter, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::constants::LOG_FILE_NAME;

/// Target of events that end up in the append-only log file.
pub const JOURNAL_TARGET: &str = "journal";

/// Append-only record of claim outcomes, one `[tag] message` line per event.
pub trait Journal: Send + Sync {
    fn record(&self, tag: &str, message: &str);
}

/// Journal backed by `tracing`; the file layer set up in [`init_logger`] picks these events up.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingJournal;

impl Journal for TracingJournal {
    fn record(&self, tag: &str, message: &str) {
        tracing::info!(target: JOURNAL_TARGET, "[{tag}] {message}");
    }
}

/// Plain-text layer that only lets journal events through.
pub fn journal_layer<S, W>(make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .with_filter(Targets::new().with_target(JOURNAL_TARGET, Level::INFO))
}

/// Console gets everything allowed by `RUST_LOG` (default `info`),
/// `<log_dir>/log.txt` gets journal lines only.
pub fn init_logger(log_dir: impl AsRef<Path>) -> eyre::Result<WorkerGuard> {
    // `rolling::never` panics when the directory is missing
    std::fs::create_dir_all(log_dir.as_ref())?;

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console_layer = fmt::layer().with_target(false).with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(journal_layer(non_blocking))
        .try_init()?;

    Ok(guard)
}

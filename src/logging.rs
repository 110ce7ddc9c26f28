//! Console logging: one info sink and one error sink on stdout.
//!
//! Each sink accepts exactly one severity and renders `time message`, with the
//! timestamp in yellow and the message in green (info) or red (error) when
//! ANSI colour is enabled. Events at any other level are dropped.
//!
//! Nothing here installs a global subscriber. A [`Logger`] owns its own
//! [`Dispatch`] and components scope their work to it, so two loggers (for
//! example one per test) never interfere.

use std::fmt::{self, Write as _};
use std::future::Future;
use std::io::IsTerminal;

use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::filter::{EnvFilter, filter_fn};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Filter directive used when neither `RUST_LOG` nor `--quiet` say otherwise.
pub const DEFAULT_FILTER: &str = "info";

/// Filter directive used with `--quiet`.
pub const QUIET_FILTER: &str = "error";

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_YELLOW: &str = "\x1b[33m";

/// Settings for building a [`Logger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directive applied before the two sinks.
    pub filter: String,
    /// Whether to emit ANSI colour codes.
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            ansi: false,
        }
    }
}

impl LogConfig {
    /// Resolves logging settings for the CLI.
    ///
    /// Priority: `RUST_LOG` env var > `--quiet` flag > default (info).
    /// Colour is enabled only when stdout is a terminal.
    #[must_use]
    pub fn from_env(quiet: bool) -> Self {
        let fallback = if quiet { QUIET_FILTER } else { DEFAULT_FILTER };
        let filter = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self {
            filter,
            ansi: std::io::stdout().is_terminal(),
        }
    }
}

/// Handle to a configured pair of log sinks.
#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Builds a logger that writes both sinks to `make_writer`.
    ///
    /// An invalid filter directive falls back to [`DEFAULT_FILTER`].
    pub fn new<W>(config: &LogConfig, make_writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
    {
        let filter =
            EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(sink(
                Level::INFO,
                SinkColor::Green,
                config.ansi,
                make_writer.clone(),
            ))
            .with(sink(Level::ERROR, SinkColor::Red, config.ansi, make_writer));
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Builds a logger writing to process stdout.
    #[must_use]
    pub fn stdout(config: &LogConfig) -> Self {
        Self::new(config, std::io::stdout)
    }

    /// A logger that discards every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Runs `future` with this logger as the active subscriber.
    pub fn scope<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }

    /// Runs `f` with this logger as the active subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

fn sink<S, W>(level: Level, color: SinkColor, ansi: bool, make_writer: W) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_writer(make_writer)
        .event_format(SinkFormat {
            color,
            timer: SystemTime,
        })
        .with_filter(filter_fn(move |metadata| *metadata.level() == level))
}

#[derive(Debug, Clone, Copy)]
enum SinkColor {
    Green,
    Red,
}

impl SinkColor {
    fn code(self) -> &'static str {
        match self {
            Self::Green => "\x1b[32m",
            Self::Red => "\x1b[31m",
        }
    }
}

struct SinkFormat {
    color: SinkColor,
    timer: SystemTime,
}

impl<S, N> FormatEvent<S, N> for SinkFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let ansi = writer.has_ansi_escapes();

        if ansi {
            writer.write_str(ANSI_YELLOW)?;
        }
        self.timer.format_time(&mut writer)?;
        if ansi {
            writer.write_str(ANSI_RESET)?;
        }
        writer.write_char(' ')?;

        if ansi {
            writer.write_str(self.color.code())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        if ansi {
            writer.write_str(ANSI_RESET)?;
        }
        writeln!(writer)
    }
}

//! Logging setup.
//!
//! `tracing` events are rendered as GitHub Actions workflow commands so the
//! runner can annotate them:
//!
//! | level         | rendered as       |
//! |---------------|-------------------|
//! | ERROR         | `::error::msg`    |
//! | WARN          | `::warning::msg`  |
//! | INFO          | `msg`             |
//! | DEBUG / TRACE | `::debug::msg`    |
//!
//! The filter defaults to debug output for this crate and warnings for
//! dependencies, and can be overridden with `RUST_LOG`.

use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::workflow::escape_data;

const DEFAULT_FILTER: &str = "rust_toolchain_action=debug,warn";

/// Event formatter producing workflow commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
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
        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;

        let command = match *event.metadata().level() {
            Level::ERROR => "error",
            Level::WARN => "warning",
            Level::INFO => return writeln!(writer, "{message}"),
            Level::DEBUG | Level::TRACE => "debug",
        };
        writeln!(writer, "::{command}::{}", escape_data(&message))
    }
}

/// Installs the global subscriber writing workflow commands to stdout.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .event_format(WorkflowCommandFormat)
        .init();
}

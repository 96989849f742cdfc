//! Log line formatter that stamps every event with the simulation tick and level.

use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

static TICK_COUNTER: AtomicU64 = AtomicU64::new(0);
static CURRENT_LEVEL: AtomicU32 = AtomicU32::new(0);

const TIMESTAMP_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second].[subsecond digits:3]");

/// Formats events as `time tick level severity target: fields`.
///
/// The tick and level come from process-wide counters updated by the game loop,
/// so lines emitted from inside systems still carry them.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        let timestamp = OffsetDateTime::now_utc().format(&TIMESTAMP_FORMAT).map_err(|_| fmt::Error)?;
        let position = format!("#{:06} L{:02}", get_tick_count(), get_level());
        if ansi {
            write!(writer, "\x1b[2m{timestamp} {position}\x1b[0m ")?;
        } else {
            write!(writer, "{timestamp} {position} ")?;
        }

        write_level(&mut writer, meta.level(), ansi)?;

        if ansi {
            write!(writer, " \x1b[2m{}:\x1b[0m ", meta.target())?;
        } else {
            write!(writer, " {}: ", meta.target())?;
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn write_level(writer: &mut Writer<'_>, level: &Level, ansi: bool) -> fmt::Result {
    let (color, text) = match *level {
        Level::TRACE => ("\x1b[35m", "TRACE"),
        Level::DEBUG => ("\x1b[34m", "DEBUG"),
        Level::INFO => ("\x1b[32m", " INFO"),
        Level::WARN => ("\x1b[33m", " WARN"),
        Level::ERROR => ("\x1b[31m", "ERROR"),
    };
    if ansi {
        write!(writer, "{color}{text}\x1b[0m")
    } else {
        write!(writer, "{text}")
    }
}

/// Advances the global tick counter; call once per simulated tick.
pub fn increment_tick() {
    TICK_COUNTER.fetch_add(1, Ordering::Relaxed);
}

pub fn get_tick_count() -> u64 {
    TICK_COUNTER.load(Ordering::Relaxed)
}

/// Records the level shown on subsequent log lines.
pub fn set_level(level: u32) {
    CURRENT_LEVEL.store(level, Ordering::Relaxed);
}

pub fn get_level() -> u32 {
    CURRENT_LEVEL.load(Ordering::Relaxed)
}

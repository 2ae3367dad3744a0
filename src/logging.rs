//! Logging and panic reporting.
//!
//! Installs one `tracing` subscriber for the whole process: an [`EnvFilter`]
//! (taken from `RUST_LOG` when set, from the configured directive otherwise)
//! in front of a `fmt` layer writing prefixed, timestamp-free lines. The web
//! backend plugs in a console writer; native hosts log to stderr.

use std::{
    backtrace::Backtrace,
    io::{self, Write},
    panic::{self, PanicHookInfo},
    sync::Once,
};

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, FormatEvent, FormatFields, format::Writer, writer::MakeWriter},
    prelude::*,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const PREFIX: &str = "[marsview]";
const PANIC_TARGET: &str = "marsview::panic";
const MAX_PANIC_LINES: usize = 8;

static PANIC_HOOK_INSTALLED: Once = Once::new();
static TRACING_INSTALLED: Once = Once::new();

/// Installs logging to stderr (idempotent).
pub fn init(directive: &str) {
    init_with_writer(directive, io::stderr);
}

/// Installs logging to `writer` (idempotent). Only the first call has an
/// effect.
pub fn init_with_writer<W>(directive: &str, writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    TRACING_INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directive))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let layer = fmt::layer()
            .event_format(PanicAwareFormatter)
            .with_writer(Prefixed(writer))
            .with_ansi(false)
            .with_filter(filter);

        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            eprintln!("{PREFIX} a global tracing subscriber is already installed");
        }
    });
}

/// Routes panics through `tracing` before the previous hook runs
/// (idempotent).
pub fn install_panic_forwarder() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            forward_panic(info);
            previous(info);
        }));
    });
}

fn forward_panic(info: &PanicHookInfo<'_>) {
    let location = info
        .location()
        .map(|location| format!("{}:{}", location.file(), location.line()))
        .unwrap_or_default();
    let backtrace = Backtrace::capture().to_string();
    tracing::error!(
        target: PANIC_TARGET,
        message = %panic_message(info),
        location = %location,
        backtrace = %backtrace
    );
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "Unknown panic".to_string()
    }
}

struct Prefixed<W>(W);

impl<'a, W: MakeWriter<'a>> MakeWriter<'a> for Prefixed<W> {
    type Writer = PrefixedWriter<W::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        PrefixedWriter {
            inner: self.0.make_writer(),
            wrote_prefix: false,
        }
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        PrefixedWriter {
            inner: self.0.make_writer_for(meta),
            wrote_prefix: false,
        }
    }
}

struct PrefixedWriter<W> {
    inner: W,
    wrote_prefix: bool,
}

impl<W: Write> Write for PrefixedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.wrote_prefix {
            self.inner.write_all(PREFIX.as_bytes())?;
            self.inner.write_all(b" ")?;
            self.wrote_prefix = true;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[derive(Clone, Copy, Default)]
struct PanicAwareFormatter;

impl<S, N> FormatEvent<S, N> for PanicAwareFormatter
where
    S: tracing::Subscriber + for<'span> LookupSpan<'span>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let target = event.metadata().target();
        if target == PANIC_TARGET {
            let mut visitor = PanicFieldVisitor::default();
            event.record(&mut visitor);
            write!(writer, "PANIC: {}", visitor.message.as_deref().unwrap_or("panic"))?;
            if let Some(location) = visitor.location.as_deref().filter(|l| !l.is_empty()) {
                write!(writer, " at {location}")?;
            }
            if let Some(backtrace) = visitor.backtrace.as_deref() {
                let mut lines = backtrace.lines();
                for line in lines.by_ref().take(MAX_PANIC_LINES) {
                    write!(writer, "\n  {line}")?;
                }
                if lines.next().is_some() {
                    write!(writer, "\n  ... (truncated)")?;
                }
            }
            writeln!(writer)
        } else {
            write!(writer, "{} {target}: ", event.metadata().level())?;
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            writeln!(writer)
        }
    }
}

#[derive(Default)]
struct PanicFieldVisitor {
    message: Option<String>,
    location: Option<String>,
    backtrace: Option<String>,
}

impl tracing::field::Visit for PanicFieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        let slot = match field.name() {
            "message" => &mut self.message,
            "location" => &mut self.location,
            "backtrace" => &mut self.backtrace,
            _ => return,
        };
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().map_err(|_| io::Error::other("poisoned"))?.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Capture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn captured(capture: &Capture) -> String {
        String::from_utf8(capture.0.lock().expect("lock").clone()).expect("utf-8")
    }

    #[test]
    fn lines_are_prefixed_and_leveled() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .event_format(PanicAwareFormatter)
                .with_writer(Prefixed(capture.clone()))
                .with_ansi(false),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "marsview::test", "no route matched");
        });
        assert_eq!(captured(&capture), "[marsview] WARN marsview::test: no route matched\n");
    }

    #[test]
    fn panic_events_are_rendered_with_location() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .event_format(PanicAwareFormatter)
                .with_writer(Prefixed(capture.clone()))
                .with_ansi(false),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(
                target: PANIC_TARGET,
                message = %"boom",
                location = %"src/app.rs:10",
                backtrace = %"frame 0\nframe 1"
            );
        });
        assert_eq!(
            captured(&capture),
            "[marsview] PANIC: boom at src/app.rs:10\n  frame 0\n  frame 1\n"
        );
    }
}

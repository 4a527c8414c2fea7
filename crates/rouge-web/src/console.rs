//! Formatted `tracing` output routed to the browser console.
//!
//! Each event is buffered by a [`ConsoleWriter`] and handed to the
//! `console` method matching its level when the writer is dropped, so
//! devtools level filtering works on rouge logs.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Install the console subscriber. Later calls are ignored.
pub fn install() {
    let installed = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_max_level(Level::INFO)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("console logging ready");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// One formatted event, emitted on drop.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    const fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    /// The buffered event without its trailing newline, if any text
    /// was written.
    fn line(&self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        (!line.is_empty()).then(|| line.to_owned())
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        if let Some(line) = self.line() {
            emit(self.level, &line);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use web_sys::console;

    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => console::error_1(&value),
        Level::WARN => console::warn_1(&value),
        Level::INFO => console::info_1(&value),
        _ => console::debug_1(&value),
    }
}

// Native builds (unit tests) have no console to write to.
#[cfg(not(target_arch = "wasm32"))]
fn emit(level: Level, line: &str) {
    let _ = (level, line);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_writer_logs_at_info() {
        let mut w = ConsoleMakeWriter.make_writer();
        assert_eq!(w.level, Level::INFO);
        w.write_all(b"x").unwrap();
        assert_eq!(w.line().as_deref(), Some("x"));
    }

    #[test]
    fn line_joins_partial_writes_and_trims_newline() {
        let mut w = ConsoleWriter::new(Level::WARN);
        write!(w, " WARN rouge_core: ").unwrap();
        writeln!(w, "layer skipped").unwrap();
        assert_eq!(w.line().as_deref(), Some(" WARN rouge_core: layer skipped"));
    }

    #[test]
    fn blank_output_emits_nothing() {
        let mut w = ConsoleWriter::new(Level::DEBUG);
        assert_eq!(w.line(), None);
        w.write_all(b"\n").unwrap();
        assert_eq!(w.line(), None);
    }
}

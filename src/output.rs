//! Destination of log lines and animation frames.

use crossterm::tty::IsTty;
use parking_lot::Mutex;
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

/// A shared writer plus whether it is attached to a terminal.
///
/// Cloning an `Output` shares the underlying writer. Every line or frame is
/// written with a single `write_all` under the writer lock, so lines from
/// concurrent loggers never interleave mid-line.
#[derive(Clone)]
pub struct Output {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    tty: bool,
}

impl Output {
    /// Wraps an arbitrary writer. It is treated as a non-terminal.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
            tty: false,
        }
    }

    /// Standard error, with terminal detection.
    pub fn stderr() -> Self {
        let tty = io::stderr().is_tty();
        Self::new(io::stderr()).with_tty(tty)
    }

    /// Standard output, with terminal detection.
    pub fn stdout() -> Self {
        let tty = io::stdout().is_tty();
        Self::new(io::stdout()).with_tty(tty)
    }

    /// Overrides terminal detection.
    pub fn with_tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    /// Reports whether the writer is a terminal.
    pub fn is_tty(&self) -> bool {
        self.tty
    }

    /// Writes `line` followed by a newline.
    pub fn write_line(&self, line: &str) {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');
        self.write_bytes(&buf);
    }

    /// Writes raw bytes and flushes.
    ///
    /// Failures are reported through the `log` facade instead of being
    /// returned, so a closed terminal never aborts the task being animated.
    pub fn write_bytes(&self, bytes: &[u8]) {
        let mut writer = self.writer.lock();
        if let Err(err) = writer.write_all(bytes).and_then(|()| writer.flush()) {
            log::warn!("clog: failed to write to output: {err}");
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stderr()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").field("tty", &self.tty).finish()
    }
}

/// In-memory writer whose contents can be read back, handy in tests.
///
/// ```rust
/// use clog::output::{Output, SharedBuffer};
///
/// let buffer = SharedBuffer::new();
/// let output = Output::new(buffer.clone());
/// output.write_line("hello");
/// assert_eq!(buffer.contents(), "hello\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Raw bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

//! Output sinks for the session engine.
//!
//! Two distinct outbound seams: a display sink that receives every
//! formatted transcript line as it arrives, and a dispatch sink that
//! receives the drained buffer once per flush. The engine never interprets
//! a dispatch result beyond success or failure.

use crate::error::Result;
use std::sync::{Arc, Mutex};

/// Live transcript display. Fired once per appended fragment.
///
/// Implementations must not block the worker meaningfully; UI updates
/// should be marshaled asynchronously by the caller.
pub trait DisplaySink: Send + 'static {
    /// Handles one formatted line. `provisional` marks non-final
    /// recognitions that will not enter the accumulation buffer.
    fn line(&mut self, formatted: &str, provisional: bool);

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "display"
    }
}

/// Downstream consumer of flushed chunks (the summarizer side).
pub trait DispatchSink: Send + 'static {
    /// Handles one drained chunk. An error leaves the chunk recoverable:
    /// the engine re-buffers the text and retries on the next flush
    /// trigger.
    fn dispatch(&mut self, text: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "dispatch"
    }
}

/// Writes final lines to stdout; provisional lines to stderr so pipes see
/// only settled text.
pub struct StdoutDisplay;

impl DisplaySink for StdoutDisplay {
    fn line(&mut self, formatted: &str, provisional: bool) {
        if provisional {
            eprint!("{}", formatted);
        } else {
            print!("{}", formatted);
        }
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}

/// Display sink that drops everything (quiet mode).
pub struct NullDisplay;

impl DisplaySink for NullDisplay {
    fn line(&mut self, _formatted: &str, _provisional: bool) {}

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Collects lines for library use and tests.
#[derive(Clone, Default)]
pub struct CollectorDisplay {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CollectorDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final lines collected so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl DisplaySink for CollectorDisplay {
    fn line(&mut self, formatted: &str, provisional: bool) {
        if provisional {
            return;
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(formatted.to_string());
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Collects dispatched chunks for library use and tests.
#[derive(Clone, Default)]
pub struct CollectorDispatch {
    chunks: Arc<Mutex<Vec<String>>>,
}

impl CollectorDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks dispatched so far, in flush order.
    pub fn chunks(&self) -> Vec<String> {
        self.chunks.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl DispatchSink for CollectorDispatch {
    fn dispatch(&mut self, text: &str) -> Result<()> {
        if let Ok(mut chunks) = self.chunks.lock() {
            chunks.push(text.to_string());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

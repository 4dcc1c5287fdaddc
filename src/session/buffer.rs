//! Transcript buffer: ordered accumulator of formatted transcript lines.
//!
//! Collects everything that arrived since the last flush and tracks which
//! speakers have appeared over the whole session. The buffer never decides
//! *when* to flush; that is the scheduler's job.

use crate::session::fragment::TranscriptFragment;
use std::collections::BTreeSet;
use std::time::Duration;

/// Accumulates formatted transcript lines between flushes.
#[derive(Debug, Default)]
pub struct TranscriptBuffer {
    /// Concatenation of formatted fragment lines since the last drain.
    accumulated: String,
    /// Distinct speakers seen since session start. Grows monotonically;
    /// a drain does not clear it.
    speakers: BTreeSet<String>,
    /// Lines appended since session start (for status reporting).
    line_count: u64,
}

impl TranscriptBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats and appends a fragment, returning the formatted line.
    ///
    /// The line has the shape `[MM:SS] <speaker>: <text>\n`. The fragment's
    /// own session-relative timestamp wins when present; `elapsed` (time
    /// since session start at arrival) is the fallback for sources that
    /// carry no timing.
    ///
    /// Whitespace-only fragments are discarded: no line is produced and the
    /// buffer is unchanged.
    pub fn append(&mut self, fragment: &TranscriptFragment, elapsed: Duration) -> Option<String> {
        let line = format_line(fragment, elapsed)?;

        self.accumulated.push_str(&line);
        self.speakers.insert(fragment.speaker.clone());
        self.line_count += 1;

        Some(line)
    }

    /// Returns the accumulated text and resets the buffer to empty.
    ///
    /// Safe to call twice in a row: the second call returns `""`. This is
    /// the only operation that clears the accumulation.
    pub fn drain(&mut self) -> String {
        std::mem::take(&mut self.accumulated)
    }

    /// Re-prepends text that could not be dispatched, so it rides along
    /// with the next accumulation cycle.
    pub fn restore(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.accumulated.insert_str(0, &text);
    }

    /// True iff no real content has accumulated since the last drain.
    pub fn is_empty(&self) -> bool {
        self.accumulated.trim().is_empty()
    }

    /// Distinct speakers seen over the session so far.
    pub fn speakers(&self) -> &BTreeSet<String> {
        &self.speakers
    }

    /// Total lines appended over the session so far.
    pub fn line_count(&self) -> u64 {
        self.line_count
    }
}

/// Formats a fragment as `[MM:SS] <speaker>: <text>\n` without buffering
/// it. Returns `None` for whitespace-only fragments.
///
/// The fragment's own session-relative timestamp wins when present;
/// `elapsed` is the fallback for sources that carry no timing.
pub fn format_line(fragment: &TranscriptFragment, elapsed: Duration) -> Option<String> {
    let text = fragment.text.trim();
    if text.is_empty() {
        return None;
    }
    let seconds = fragment.timestamp.unwrap_or_else(|| elapsed.as_secs_f64());
    Some(format!(
        "{} {}: {}\n",
        format_timestamp(seconds),
        fragment.speaker,
        text
    ))
}

/// Renders seconds since session start as `[MM:SS]`.
fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("[{:02}:{:02}]", total / 60, total % 60)
}

//! Per-session state: start anchor, markers, dispatch bookkeeping.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A user-inserted bookmark, independent of the transcript buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Seconds since session start when the marker was set.
    pub timestamp: f64,
    /// Key or label the user associated with the marker (e.g. `"F5"`).
    pub key: String,
    /// Transcript line index at the time the marker was set.
    pub position: u64,
}

impl Marker {
    /// Renders the marker timestamp as `MM:SS`.
    pub fn timestamp_display(&self) -> String {
        let total = self.timestamp.max(0.0) as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

/// One recording/transcription run, bounded by start and stop.
#[derive(Debug)]
pub struct Session {
    /// Meeting name, used in the session summary.
    pub name: String,
    started_at: Instant,
    markers: Vec<Marker>,
    chunks_dispatched: u64,
}

impl Session {
    /// Starts a session now.
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Instant::now(),
            markers: Vec::new(),
            chunks_dispatched: 0,
        }
    }

    /// Time since the session started.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Adds a marker at the current session-relative time.
    pub fn add_marker(&mut self, key: impl Into<String>, position: u64) -> &Marker {
        self.markers.push(Marker {
            timestamp: self.elapsed().as_secs_f64(),
            key: key.into(),
            position,
        });
        // Just pushed, cannot be empty.
        &self.markers[self.markers.len() - 1]
    }

    /// Markers in insertion order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Records one successfully dispatched chunk.
    pub fn record_dispatch(&mut self) {
        self.chunks_dispatched += 1;
    }

    /// Chunks dispatched so far.
    pub fn chunks_dispatched(&self) -> u64 {
        self.chunks_dispatched
    }
}

/// Snapshot reported when a session ends (or on a status query).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub name: String,
    pub duration_secs: u64,
    pub speakers: Vec<String>,
    pub markers: Vec<Marker>,
    pub lines: u64,
    pub chunks_dispatched: u64,
}

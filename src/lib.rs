//! meetscribe - Live meeting transcript aggregation
//!
//! Accumulates streaming transcript fragments into timestamped lines and
//! flushes them as chunks to a summarizer on a configurable interval.

// Errors are propagated, not swallowed
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod ipc;
pub mod session;
pub mod summarize;

// Core traits (source → engine → sinks)
pub use engine::{DispatchSink, DisplaySink, TranscriptSource};
pub use summarize::Summarizer;

// Engine
pub use engine::{EngineConfig, EngineHandle, EngineStatus, SessionEngine, SessionWorker};

// Session model
pub use session::{
    ChunkScheduler, IntervalPolicy, Marker, Session, SessionSummary, TranscriptBuffer,
    TranscriptFragment,
};

// Error handling
pub use error::{MeetscribeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns "X.Y.Z+hash" when built in a git checkout, plain "X.Y.Z"
/// otherwise.
pub fn version_string() -> String {
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => {
            format!("{}+{}", env!("CARGO_PKG_VERSION"), hash)
        }
        _ => env!("CARGO_PKG_VERSION").to_string(),
    }
}

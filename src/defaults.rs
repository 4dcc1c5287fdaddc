//! Default configuration constants for meetscribe.
//!
//! Shared constants used across configuration types to ensure consistency
//! and eliminate duplication.

use std::time::Duration;

/// Default processing interval for automatic chunk dispatch.
///
/// 10 seconds matches the expectations of live note-taking: long enough to
/// accumulate a few utterances, short enough that summaries track the
/// conversation.
pub const PROCESSING_INTERVAL: Duration = Duration::from_secs(10);

/// How long the worker waits on the fragment queue before re-checking the
/// stop flag.
///
/// 100ms keeps teardown latency well under the 200ms responsiveness target
/// while avoiding a busy loop.
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Speaker label used when the transcription source does not identify one.
pub const UNKNOWN_SPEAKER: &str = "Speaker 1";

/// Default prompt template for chunk summarization.
pub const DEFAULT_TEMPLATE: &str = "Meeting Summary";

/// Number of previously dispatched chunks carried as context for the next
/// summarization call.
pub const CONTEXT_CHUNKS: usize = 5;

/// How many times a failed chunk dispatch is retried (on subsequent flush
/// triggers) before the chunk is dropped with a warning.
pub const MAX_DISPATCH_RETRIES: u32 = 3;

/// Bound for the fragment queue between a push-style transcription source
/// and the session worker.
pub const FRAGMENT_QUEUE_SIZE: usize = 256;

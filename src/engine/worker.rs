//! Session worker: drives buffer and scheduler from a transcript source.
//!
//! One dedicated thread pulls fragments with a bounded poll, appends them
//! to the transcript buffer and asks the scheduler whether to flush. The
//! buffer, scheduler and session state share a single mutex so that a
//! fragment-driven auto-flush and a UI-driven instant flush can never race;
//! dispatch to the summarizer always runs outside that lock. Flush triggers
//! serialize on the dispatch sink's own lock, drain included, so chunks
//! reach the summarizer in drain order.

use crate::defaults;
use crate::engine::sink::{DisplaySink, DispatchSink};
use crate::engine::source::TranscriptSource;
use crate::error::{MeetscribeError, Result};
use crate::session::buffer::format_line;
use crate::session::{
    ChunkScheduler, IntervalPolicy, Session, SessionSummary, TranscriptBuffer, TranscriptFragment,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial flush policy.
    pub policy: IntervalPolicy,
    /// Whether provisional fragments enter the buffer. When false they
    /// still reach the display sink, flagged as provisional.
    pub include_partials: bool,
    /// Failed-dispatch retry budget per chunk.
    pub max_dispatch_retries: u32,
    /// Poll bound; also the worst-case stop latency.
    pub poll_timeout: Duration,
    /// Label substituted for fragments whose source names no speaker.
    pub speaker: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            policy: IntervalPolicy::Fixed(defaults::PROCESSING_INTERVAL),
            include_partials: false,
            max_dispatch_retries: defaults::MAX_DISPATCH_RETRIES,
            poll_timeout: defaults::POLL_TIMEOUT,
            speaker: defaults::UNKNOWN_SPEAKER.to_string(),
        }
    }
}

/// Why a flush fired. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlushReason {
    Interval,
    IntervalChanged,
    Instant,
    SessionEnd,
}

/// State guarded by the engine's single mutex.
struct Shared {
    buffer: TranscriptBuffer,
    scheduler: ChunkScheduler,
    session: Session,
    /// Retries already consumed by the currently re-buffered chunk.
    dispatch_retries: u32,
}

/// Point-in-time view of a running session, for status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub session_name: String,
    pub running: bool,
    pub policy: String,
    pub elapsed_secs: u64,
    pub since_last_flush_secs: u64,
    pub buffer_empty: bool,
    pub lines: u64,
    pub speakers: Vec<String>,
    pub chunks_dispatched: u64,
    pub markers: u64,
}

/// Control surface for a running session. Cheap to clone; safe to use from
/// any thread.
#[derive(Clone)]
pub struct EngineHandle {
    shared: Arc<Mutex<Shared>>,
    dispatch: Arc<Mutex<Box<dyn DispatchSink>>>,
    running: Arc<AtomicBool>,
    max_dispatch_retries: u32,
}

impl EngineHandle {
    /// True while the worker loop is alive.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Installs a new flush policy.
    ///
    /// If the new interval has already elapsed since the last flush and
    /// there is buffered text, the change flushes immediately; returns
    /// whether that happened.
    pub fn set_interval(&self, policy: IntervalPolicy) -> Result<bool> {
        self.flush_if(FlushReason::IntervalChanged, |shared, now| {
            let buffer_empty = shared.buffer.is_empty();
            shared.scheduler.on_interval_changed(policy, now, buffer_empty)
        })
    }

    /// Manual "flush now". Honored under any policy, including manual;
    /// returns whether anything was flushed.
    pub fn trigger_instant_flush(&self) -> Result<bool> {
        self.flush_if(FlushReason::Instant, |shared, _now| {
            shared.scheduler.trigger_instant(shared.buffer.is_empty())
        })
    }

    /// Bookmarks the current moment in the session.
    pub fn add_marker(&self, key: &str) -> Result<()> {
        let mut shared = self.lock()?;
        let position = shared.buffer.line_count();
        shared.session.add_marker(key, position);
        Ok(())
    }

    /// Snapshot of the session for status queries.
    pub fn status(&self) -> Result<EngineStatus> {
        let shared = self.lock()?;
        let now = Instant::now();
        Ok(EngineStatus {
            session_name: shared.session.name.clone(),
            running: self.is_running(),
            policy: shared.scheduler.policy().to_string(),
            elapsed_secs: shared.session.elapsed().as_secs(),
            since_last_flush_secs: shared.scheduler.since_last_flush(now).as_secs(),
            buffer_empty: shared.buffer.is_empty(),
            lines: shared.buffer.line_count(),
            speakers: shared.buffer.speakers().iter().cloned().collect(),
            chunks_dispatched: shared.session.chunks_dispatched(),
            markers: shared.session.markers().len() as u64,
        })
    }

    /// Asks the worker to stop. It exits after at most one poll interval,
    /// flushing any remaining buffer first.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Builds the end-of-session summary from current state.
    pub fn summary(&self) -> Result<SessionSummary> {
        let shared = self.lock()?;
        Ok(SessionSummary {
            name: shared.session.name.clone(),
            duration_secs: shared.session.elapsed().as_secs(),
            speakers: shared.buffer.speakers().iter().cloned().collect(),
            markers: shared.session.markers().to_vec(),
            lines: shared.buffer.line_count(),
            chunks_dispatched: shared.session.chunks_dispatched(),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Shared>> {
        self.shared
            .lock()
            .map_err(|_| MeetscribeError::Other("session state poisoned".to_string()))
    }

    /// Runs one flush end to end: the drain decision, the drain and the
    /// hand-off to the dispatch sink all happen while holding the sink's
    /// lock, so a competing flush trigger cannot drain until this chunk is
    /// through. The state lock is only held around the drain itself, never
    /// across the dispatch call. Returns whether a chunk was drained.
    ///
    /// A failed dispatch re-buffers the text for the next flush trigger
    /// until the retry budget is exhausted, at which point the chunk is
    /// dropped with a surfaced warning.
    fn flush_if<F>(&self, reason: FlushReason, decide: F) -> Result<bool>
    where
        F: FnOnce(&mut Shared, Instant) -> bool,
    {
        let mut sink = self
            .dispatch
            .lock()
            .map_err(|_| MeetscribeError::Other("dispatch sink poisoned".to_string()))?;

        let chunk = {
            let mut shared = self.lock()?;
            let now = Instant::now();
            if decide(&mut *shared, now) {
                take_chunk(&mut shared, now)
            } else {
                None
            }
        };

        let Some(text) = chunk else {
            return Ok(false);
        };

        let result = sink.dispatch(&text);
        drop(sink);

        let mut shared = self.lock()?;
        match result {
            Ok(()) => {
                shared.session.record_dispatch();
                shared.dispatch_retries = 0;
                Ok(true)
            }
            Err(e) => {
                if shared.dispatch_retries < self.max_dispatch_retries {
                    shared.dispatch_retries += 1;
                    let attempt = shared.dispatch_retries;
                    shared.buffer.restore(text);
                    eprintln!(
                        "meetscribe: {:?} flush dispatch failed (attempt {}), chunk re-buffered: {}",
                        reason, attempt, e
                    );
                    Ok(true)
                } else {
                    let attempts = shared.dispatch_retries + 1;
                    shared.dispatch_retries = 0;
                    eprintln!(
                        "meetscribe: dropping chunk after {} failed dispatch attempts: {}",
                        attempts, e
                    );
                    Err(MeetscribeError::DispatchExhausted { attempts })
                }
            }
        }
    }
}

/// Owns the worker thread; joined to retrieve the session summary.
pub struct SessionWorker {
    handle: EngineHandle,
    thread: Option<JoinHandle<Result<()>>>,
}

impl SessionWorker {
    /// Waits for the worker to finish (source end or stop request) and
    /// returns the session summary.
    pub fn wait(mut self) -> Result<SessionSummary> {
        let outcome = match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| MeetscribeError::Other("session worker panicked".to_string()))?,
            None => Ok(()),
        };
        let summary = self.handle.summary()?;
        outcome?;
        Ok(summary)
    }

    /// Signals stop, then waits.
    pub fn stop(self) -> Result<SessionSummary> {
        self.handle.request_stop();
        self.wait()
    }
}

/// The streaming session engine.
pub struct SessionEngine {
    config: EngineConfig,
}

impl SessionEngine {
    /// Creates an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Starts a session: spawns the worker thread and returns the control
    /// handle plus the worker owner.
    pub fn start<S, D, P>(
        &self,
        session_name: &str,
        source: S,
        display: D,
        dispatch: P,
    ) -> (EngineHandle, SessionWorker)
    where
        S: TranscriptSource,
        D: DisplaySink,
        P: DispatchSink,
    {
        let now = Instant::now();
        let shared = Arc::new(Mutex::new(Shared {
            buffer: TranscriptBuffer::new(),
            scheduler: ChunkScheduler::new(self.config.policy, now),
            session: Session::start(session_name),
            dispatch_retries: 0,
        }));
        let running = Arc::new(AtomicBool::new(true));

        let handle = EngineHandle {
            shared,
            dispatch: Arc::new(Mutex::new(Box::new(dispatch))),
            running,
            max_dispatch_retries: self.config.max_dispatch_retries,
        };

        let worker_handle = handle.clone();
        let config = self.config.clone();
        let thread = thread::spawn(move || run_worker(worker_handle, source, display, config));

        let worker = SessionWorker {
            handle: handle.clone(),
            thread: Some(thread),
        };
        (handle, worker)
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// The worker loop. Exits on stop request or source disconnect, always
/// performing one terminal flush of any remaining buffer.
fn run_worker<S, D>(
    handle: EngineHandle,
    mut source: S,
    mut display: D,
    config: EngineConfig,
) -> Result<()>
where
    S: TranscriptSource,
    D: DisplaySink,
{
    let mut outcome = Ok(());

    while handle.running.load(Ordering::SeqCst) {
        match source.poll(config.poll_timeout) {
            Ok(Some(fragment)) => {
                if let Err(e) = handle_fragment(&handle, fragment, &mut display, &config) {
                    // Exhausted dispatch retries are surfaced but do not
                    // end the session; the transcript keeps flowing.
                    eprintln!("meetscribe: {}", e);
                }
            }
            Ok(None) => continue,
            Err(e) => {
                // Source disconnect is fatal to the session.
                outcome = Err(e);
                break;
            }
        }
    }

    // Terminal flush: exactly one final chunk for whatever is left.
    if let Err(e) = handle.flush_if(FlushReason::SessionEnd, |_shared, _now| true) {
        eprintln!("meetscribe: final flush failed: {}", e);
    }

    handle.running.store(false, Ordering::SeqCst);
    match outcome {
        // An orderly end of input is how queue/pipe sessions finish.
        Err(MeetscribeError::SourceDisconnected { .. }) => Ok(()),
        other => other,
    }
}

/// Applies one fragment: format, display, buffer, flush decision.
fn handle_fragment<D: DisplaySink>(
    handle: &EngineHandle,
    mut fragment: TranscriptFragment,
    display: &mut D,
    config: &EngineConfig,
) -> Result<()> {
    if fragment.is_blank() {
        // Expected and frequent; not an error.
        return Ok(());
    }
    if fragment.speaker.is_empty() {
        fragment.speaker = config.speaker.clone();
    }

    let buffered = fragment.is_final || config.include_partials;
    let flush_due = {
        let mut shared = handle.lock()?;
        let elapsed = shared.session.elapsed();
        if buffered {
            if let Some(line) = shared.buffer.append(&fragment, elapsed) {
                display.line(&line, false);
            }
            shared
                .scheduler
                .should_flush_on_fragment(Instant::now(), shared.buffer.is_empty())
        } else {
            if let Some(line) = format_line(&fragment, elapsed) {
                display.line(&line, true);
            }
            false
        }
    };
    if !flush_due {
        return Ok(());
    }

    // Re-decided under the sink lock; a concurrent flush that got there
    // first leaves an empty buffer and this becomes a no-op.
    handle
        .flush_if(FlushReason::Interval, |shared, now| {
            shared
                .scheduler
                .should_flush_on_fragment(now, shared.buffer.is_empty())
        })
        .map(|_| ())
}

/// Drains the buffer and anchors the flush timer. Callers dispatch the
/// returned text after releasing the state lock.
fn take_chunk(shared: &mut Shared, now: Instant) -> Option<String> {
    if shared.buffer.is_empty() {
        return None;
    }
    let text = shared.buffer.drain();
    shared.scheduler.mark_flushed(now);
    Some(text)
}

//! End-to-end session tests: JSON-lines input through the engine to the
//! summarizer dispatch.

use meetscribe::engine::{
    CollectorDispatch, CollectorDisplay, DispatchSink, EngineConfig, JsonLinesSource, NullDisplay,
    QueueSource, SessionEngine,
};
use meetscribe::session::{IntervalPolicy, TranscriptFragment};
use meetscribe::summarize::{SummarizerDispatch, Summarizer, SummaryRequest, find_template};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn manual_engine() -> SessionEngine {
    SessionEngine::with_config(EngineConfig {
        policy: IntervalPolicy::Manual,
        ..EngineConfig::default()
    })
}

fn wait_for(predicate: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !predicate() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn manual_session_over_json_lines_produces_ordered_transcript() {
    let input = concat!(
        r#"{"text":"Hello","speaker":"Speaker 1","timestamp":0.0}"#,
        "\n",
        r#"{"text":"world","speaker":"Speaker 1","timestamp":3.0}"#,
        "\n",
    );
    let source = JsonLinesSource::new(Cursor::new(input.to_string()));
    let display = CollectorDisplay::new();
    let dispatch = CollectorDispatch::new();

    let (_handle, worker) =
        manual_engine().start("standup", source, display.clone(), dispatch.clone());

    // EOF ends the session; the remaining buffer flushes as one chunk.
    let summary = worker.wait().unwrap();

    assert_eq!(
        dispatch.chunks(),
        vec!["[00:00] Speaker 1: Hello\n[00:03] Speaker 1: world\n"]
    );
    assert_eq!(
        display.lines(),
        vec!["[00:00] Speaker 1: Hello\n", "[00:03] Speaker 1: world\n"]
    );
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.chunks_dispatched, 1);
    assert_eq!(summary.speakers, vec!["Speaker 1"]);
}

#[test]
fn malformed_and_blank_json_lines_are_skipped() {
    let input = concat!(
        "not json at all\n",
        "\n",
        r#"{"text":"   ","speaker":"Speaker 1","timestamp":5.0}"#,
        "\n",
        r#"{"text":"kept","speaker":"Speaker 2","timestamp":6.0}"#,
        "\n",
    );
    let source = JsonLinesSource::new(Cursor::new(input.to_string()));
    let dispatch = CollectorDispatch::new();

    let (_handle, worker) = manual_engine().start("sync", source, NullDisplay, dispatch.clone());
    let summary = worker.wait().unwrap();

    assert_eq!(dispatch.chunks(), vec!["[00:06] Speaker 2: kept\n"]);
    assert_eq!(summary.lines, 1);
    assert_eq!(summary.speakers, vec!["Speaker 2"]);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    // No speaker, no timestamp: default speaker label, session-relative
    // elapsed time (rounds to 00:00 this early in the session).
    let input = r#"{"text":"bare"}
"#;
    let source = JsonLinesSource::new(Cursor::new(input.to_string()));
    let dispatch = CollectorDispatch::new();

    let (_handle, worker) = manual_engine().start("sync", source, NullDisplay, dispatch.clone());
    worker.wait().unwrap();

    assert_eq!(dispatch.chunks(), vec!["[00:00] Speaker 1: bare\n"]);
}

/// Reader that stays idle until its sender is dropped, then hits EOF.
/// Stands in for a pipe whose upstream transcriber has gone quiet.
struct IdleReader {
    gate: std::sync::mpsc::Receiver<u8>,
}

impl std::io::Read for IdleReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        self.gate.recv().ok();
        Ok(0)
    }
}

#[test]
fn stop_does_not_wait_for_idle_input() {
    let (hold, gate) = std::sync::mpsc::channel::<u8>();
    let source = JsonLinesSource::new(std::io::BufReader::new(IdleReader { gate }));
    let dispatch = CollectorDispatch::new();

    let (_handle, worker) = manual_engine().start("standup", source, NullDisplay, dispatch.clone());

    // No line ever arrives; stop must still return within one poll
    // interval instead of hanging on the reader.
    let started = Instant::now();
    let summary = worker.stop().unwrap();
    assert!(
        started.elapsed() < Duration::from_millis(500),
        "stop took {:?}",
        started.elapsed()
    );
    assert_eq!(summary.lines, 0);
    assert!(dispatch.chunks().is_empty());
    drop(hold);
}

#[test]
fn instant_flush_splits_chunks_mid_session() {
    let (tx, source) = QueueSource::new();
    let display = CollectorDisplay::new();
    let dispatch = CollectorDispatch::new();
    let (handle, worker) = manual_engine().start("sync", source, display.clone(), dispatch.clone());

    tx.push(TranscriptFragment::new("first", "Speaker 1", 0.0))
        .unwrap();
    wait_for(|| display.lines().len() == 1);
    assert!(handle.trigger_instant_flush().unwrap());

    tx.push(TranscriptFragment::new("second", "Speaker 1", 4.0))
        .unwrap();
    wait_for(|| display.lines().len() == 2);
    drop(tx);

    let summary = worker.wait().unwrap();
    assert_eq!(
        dispatch.chunks(),
        vec![
            "[00:00] Speaker 1: first\n",
            "[00:04] Speaker 1: second\n"
        ]
    );
    assert_eq!(summary.chunks_dispatched, 2);
}

#[test]
fn stop_with_pending_buffer_flushes_exactly_once() {
    let (tx, source) = QueueSource::new();
    let display = CollectorDisplay::new();
    let dispatch = CollectorDispatch::new();
    let (_handle, worker) = manual_engine().start("sync", source, display.clone(), dispatch.clone());

    tx.push(TranscriptFragment::new("pending tail", "Speaker 1", 9.0))
        .unwrap();
    wait_for(|| display.lines().len() == 1);

    let summary = worker.stop().unwrap();
    drop(tx);

    assert_eq!(dispatch.chunks(), vec!["[00:09] Speaker 1: pending tail\n"]);
    assert_eq!(summary.chunks_dispatched, 1);
}

/// Summarizer double that records every prompt it receives.
#[derive(Clone)]
struct RecordingSummarizer {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingSummarizer {
    fn new() -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Summarizer for RecordingSummarizer {
    fn summarize(&mut self, request: &SummaryRequest<'_>) -> meetscribe::Result<String> {
        self.prompts.lock().unwrap().push(request.prompt());
        Ok(String::new())
    }
}

#[test]
fn summarizer_dispatch_threads_context_between_chunks() {
    let summarizer = RecordingSummarizer::new();
    let template = find_template("Meeting Summary").unwrap();
    let mut dispatch = SummarizerDispatch::new(summarizer.clone(), template);

    dispatch.dispatch("[00:00] Speaker 1: alpha\n").unwrap();
    dispatch.dispatch("[00:10] Speaker 1: beta\n").unwrap();

    let prompts = summarizer.prompts();
    assert_eq!(prompts.len(), 2);

    // First chunk has no context.
    assert!(prompts[0].contains("Current chunk:\n[00:00] Speaker 1: alpha"));
    assert!(!prompts[0].contains("beta"));

    // Second chunk sees the first as context.
    assert!(prompts[1].contains("Context (previous chunks):\n[00:00] Speaker 1: alpha"));
    assert!(prompts[1].contains("Current chunk:\n[00:10] Speaker 1: beta"));
}

#[test]
fn end_to_end_session_with_summarizer_dispatch() {
    let (tx, source) = QueueSource::new();
    let summarizer = RecordingSummarizer::new();
    let template = find_template("Action Items").unwrap();
    let dispatch = SummarizerDispatch::new(summarizer.clone(), template);

    let (handle, worker) = manual_engine().start("retro", source, NullDisplay, dispatch);

    tx.push(TranscriptFragment::new(
        "We should ship on Friday",
        "Speaker 2",
        12.0,
    ))
    .unwrap();
    wait_for(|| {
        handle
            .status()
            .map(|s| s.lines == 1)
            .unwrap_or(false)
    });
    handle.add_marker("decision").unwrap();
    drop(tx);

    let summary = worker.wait().unwrap();
    assert_eq!(summary.chunks_dispatched, 1);
    assert_eq!(summary.markers.len(), 1);
    assert_eq!(summary.markers[0].key, "decision");

    let prompts = summarizer.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("[00:12] Speaker 2: We should ship on Friday"));
}

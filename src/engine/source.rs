//! Transcript sources: where fragments come from.
//!
//! Vendor SDKs vary between callback handlers and hand-rolled socket loops;
//! the engine only ever sees the single pull interface below. Callback-push
//! transports adapt through [`QueueSource`], a bounded queue the worker
//! polls.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use crate::session::TranscriptFragment;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use std::io::BufRead;
use std::thread;
use std::time::Duration;

/// Pull interface over a live transcription session.
pub trait TranscriptSource: Send + 'static {
    /// Waits up to `timeout` for the next fragment.
    ///
    /// `Ok(None)` means "nothing yet", not an error. A disconnected source
    /// is fatal to the session and returns `SourceDisconnected`.
    fn poll(&mut self, timeout: Duration) -> Result<Option<TranscriptFragment>>;
}

/// Push handle paired with a [`QueueSource`].
///
/// Cheap to clone; hand one to each vendor callback.
#[derive(Debug, Clone)]
pub struct FragmentSender {
    tx: Sender<TranscriptFragment>,
}

impl FragmentSender {
    /// Enqueues a fragment, blocking while the queue is full.
    pub fn push(&self, fragment: TranscriptFragment) -> Result<()> {
        self.tx
            .send(fragment)
            .map_err(|_| MeetscribeError::SourceDisconnected {
                message: "fragment queue closed".to_string(),
            })
    }

    /// Enqueues a fragment without blocking. Returns the fragment back
    /// when the queue is full so the caller can decide what to drop.
    pub fn try_push(
        &self,
        fragment: TranscriptFragment,
    ) -> std::result::Result<(), TranscriptFragment> {
        match self.tx.try_send(fragment) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(f)) | Err(TrySendError::Disconnected(f)) => Err(f),
        }
    }
}

/// Bounded-queue source for callback-driven transports.
///
/// Dropping every [`FragmentSender`] closes the queue; the worker then
/// drains what is left and runs its terminal flush.
pub struct QueueSource {
    rx: Receiver<TranscriptFragment>,
}

impl QueueSource {
    /// Creates a queue with the default bound.
    pub fn new() -> (FragmentSender, Self) {
        Self::with_capacity(defaults::FRAGMENT_QUEUE_SIZE)
    }

    /// Creates a queue with an explicit bound.
    pub fn with_capacity(capacity: usize) -> (FragmentSender, Self) {
        let (tx, rx) = bounded(capacity);
        (FragmentSender { tx }, Self { rx })
    }
}

impl TranscriptSource for QueueSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<TranscriptFragment>> {
        match self.rx.recv_timeout(timeout) {
            Ok(fragment) => Ok(Some(fragment)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(MeetscribeError::SourceDisconnected {
                message: "fragment queue closed".to_string(),
            }),
        }
    }
}

/// Upper bound on per-session malformed-line warnings.
const MAX_MALFORMED_WARNINGS: u64 = 5;

/// Reads JSON-lines fragments from any reader (the CLI's pipe mode).
///
/// `read_line` blocks for as long as the reader stays idle, which would
/// swallow the worker's poll bound; the reads therefore run on their own
/// thread feeding a bounded queue, and `poll` stays a timed receive. Blank
/// lines are skipped; a malformed line is reported once and skipped rather
/// than ending the session.
pub struct JsonLinesSource {
    rx: Receiver<Result<TranscriptFragment>>,
}

impl JsonLinesSource {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = bounded(defaults::FRAGMENT_QUEUE_SIZE);
        thread::spawn(move || read_fragments(reader, tx));
        Self { rx }
    }
}

/// Reader-thread loop: parse lines, forward fragments until EOF or the
/// engine side hangs up.
fn read_fragments<R: BufRead>(mut reader: R, tx: Sender<Result<TranscriptFragment>>) {
    let mut line = String::new();
    let mut warned_lines: u64 = 0;
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            // EOF: the stream is over; dropping the sender ends the session.
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tx.send(Err(MeetscribeError::SourceDisconnected {
                    message: e.to_string(),
                }))
                .ok();
                break;
            }
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match TranscriptFragment::from_json(trimmed) {
            Ok(fragment) => {
                if tx.send(Ok(fragment)).is_err() {
                    // Source dropped; nothing left to read for.
                    break;
                }
            }
            Err(e) => {
                warned_lines += 1;
                if warned_lines <= MAX_MALFORMED_WARNINGS {
                    eprintln!("meetscribe: skipping malformed fragment line: {}", e);
                }
                if warned_lines == MAX_MALFORMED_WARNINGS {
                    eprintln!("meetscribe: further malformed lines will be skipped silently");
                }
            }
        }
    }
}

impl TranscriptSource for JsonLinesSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<TranscriptFragment>> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => item.map(Some),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(MeetscribeError::SourceDisconnected {
                message: "end of input".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};
    use std::time::Instant;

    #[test]
    fn test_queue_source_delivers_in_order() {
        let (tx, mut source) = QueueSource::with_capacity(4);
        tx.push(TranscriptFragment::new("one", "Speaker 1", 0.0))
            .unwrap();
        tx.push(TranscriptFragment::new("two", "Speaker 1", 1.0))
            .unwrap();

        let first = source.poll(Duration::from_millis(10)).unwrap().unwrap();
        let second = source.poll(Duration::from_millis(10)).unwrap().unwrap();
        assert_eq!(first.text, "one");
        assert_eq!(second.text, "two");
    }

    #[test]
    fn test_queue_source_timeout_is_not_an_error() {
        let (_tx, mut source) = QueueSource::with_capacity(4);
        let polled = source.poll(Duration::from_millis(5)).unwrap();
        assert!(polled.is_none());
    }

    #[test]
    fn test_queue_source_disconnect_is_fatal() {
        let (tx, mut source) = QueueSource::with_capacity(4);
        drop(tx);
        let err = source.poll(Duration::from_millis(5)).unwrap_err();
        assert!(matches!(err, MeetscribeError::SourceDisconnected { .. }));
    }

    #[test]
    fn test_try_push_returns_fragment_when_full() {
        let (tx, _source) = QueueSource::with_capacity(1);
        tx.try_push(TranscriptFragment::new("a", "Speaker 1", 0.0))
            .unwrap();
        let rejected = tx
            .try_push(TranscriptFragment::new("b", "Speaker 1", 1.0))
            .unwrap_err();
        assert_eq!(rejected.text, "b");
    }

    #[test]
    fn test_json_lines_source_parses_and_skips() {
        let input = "\n{\"text\":\"Hello\"}\nnot json\n{\"text\":\"world\",\"timestamp\":3.0}\n";
        let mut source = JsonLinesSource::new(Cursor::new(input));

        let first = source.poll(Duration::from_secs(2)).unwrap().unwrap();
        assert_eq!(first.text, "Hello");
        let second = source.poll(Duration::from_secs(2)).unwrap().unwrap();
        assert_eq!(second.text, "world");
        assert_eq!(second.timestamp, Some(3.0));

        let err = source.poll(Duration::from_secs(2)).unwrap_err();
        assert!(matches!(err, MeetscribeError::SourceDisconnected { .. }));
    }

    #[test]
    fn test_json_lines_source_poll_honors_timeout_while_reader_is_idle() {
        let (hold, gate) = std::sync::mpsc::channel::<u8>();
        let mut source = JsonLinesSource::new(BufReader::new(IdleReader { gate }));

        let started = Instant::now();
        let polled = source.poll(Duration::from_millis(50)).unwrap();
        assert!(polled.is_none());
        assert!(started.elapsed() < Duration::from_millis(500));
        drop(hold);
    }

    /// Reader that stays idle until its sender is dropped, then hits EOF.
    struct IdleReader {
        gate: std::sync::mpsc::Receiver<u8>,
    }

    impl Read for IdleReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            self.gate.recv().ok();
            Ok(0)
        }
    }
}

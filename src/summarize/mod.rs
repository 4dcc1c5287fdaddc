//! Summarization seam: what happens to a flushed chunk.
//!
//! The engine never talks to an LLM itself; it hands drained text to a
//! [`DispatchSink`]. This module provides the dispatch adapter that frames
//! chunks with a prompt template and a rolling context window of previous
//! chunks, plus a local summarizer that renders chunk boundaries instead of
//! calling a model. Real LLM clients implement [`Summarizer`] outside the
//! crate.

pub mod templates;

use crate::defaults;
use crate::engine::sink::DispatchSink;
use crate::error::Result;
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::time::Instant;

pub use templates::{Template, builtin_templates, find_template};

/// One summarization call: the chunk, its template, and prior chunks for
/// continuity.
#[derive(Debug)]
pub struct SummaryRequest<'a> {
    pub template: &'a Template,
    /// Previously dispatched chunks, oldest first.
    pub context: &'a [String],
    pub chunk: &'a str,
}

impl SummaryRequest<'_> {
    /// Renders the user-side prompt the way a chat model expects it.
    pub fn prompt(&self) -> String {
        format!(
            "{}\n\nContext (previous chunks):\n{}\n\nCurrent chunk:\n{}",
            self.template.user,
            self.context.join(" "),
            self.chunk
        )
    }
}

/// Accepts an accumulated text block and a template, returns prose.
pub trait Summarizer: Send + 'static {
    fn summarize(&mut self, request: &SummaryRequest<'_>) -> Result<String>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "summarizer"
    }
}

/// Rolling window of the last N dispatched chunks.
#[derive(Debug)]
pub struct ContextWindow {
    chunks: Vec<String>,
    capacity: usize,
}

impl ContextWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            chunks: Vec::new(),
            capacity,
        }
    }

    /// Records a dispatched chunk, evicting the oldest beyond capacity.
    pub fn push(&mut self, chunk: String) {
        self.chunks.push(chunk);
        if self.chunks.len() > self.capacity {
            self.chunks.remove(0);
        }
    }

    /// Chunks currently in the window, oldest first.
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(defaults::CONTEXT_CHUNKS)
    }
}

/// Dispatch sink that frames each chunk with template + context and hands
/// it to a summarizer.
pub struct SummarizerDispatch<S: Summarizer> {
    summarizer: S,
    template: Template,
    window: ContextWindow,
}

impl<S: Summarizer> SummarizerDispatch<S> {
    pub fn new(summarizer: S, template: Template) -> Self {
        Self {
            summarizer,
            template,
            window: ContextWindow::default(),
        }
    }

    pub fn with_context_chunks(mut self, capacity: usize) -> Self {
        self.window = ContextWindow::new(capacity);
        self
    }
}

impl<S: Summarizer> DispatchSink for SummarizerDispatch<S> {
    fn dispatch(&mut self, text: &str) -> Result<()> {
        let request = SummaryRequest {
            template: &self.template,
            context: self.window.chunks(),
            chunk: text,
        };
        self.summarizer.summarize(&request)?;
        // Only chunks that actually reached the summarizer become context.
        self.window.push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "summarizer"
    }
}

/// Local summarizer: renders chunk boundaries to stderr instead of calling
/// a model. This is what `meetscribe run` uses out of the box.
pub struct LogSummarizer {
    started: Instant,
    chunk_count: u64,
    quiet: bool,
}

impl LogSummarizer {
    pub fn new(quiet: bool) -> Self {
        Self {
            started: Instant::now(),
            chunk_count: 0,
            quiet,
        }
    }
}

impl Summarizer for LogSummarizer {
    fn summarize(&mut self, request: &SummaryRequest<'_>) -> Result<String> {
        self.chunk_count += 1;
        if !self.quiet {
            let elapsed = self.started.elapsed().as_secs();
            let header = format!(
                "=== chunk {} (+{:02}:{:02}) [{}] ===",
                self.chunk_count,
                elapsed / 60,
                elapsed % 60,
                request.template.name
            );
            if std::io::stderr().is_terminal() {
                eprintln!("{}", header.bold());
            } else {
                eprintln!("{}", header);
            }
            eprint!("{}", request.chunk);
        }
        Ok(request.chunk.to_string())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

//! Composition root: wires configuration, engine, source and sinks for
//! the foreground `run` mode.

use crate::config::Config;
use crate::engine::{EngineConfig, JsonLinesSource, SessionEngine, StdoutDisplay};
use crate::session::SessionSummary;
use crate::summarize::{LogSummarizer, SummarizerDispatch, find_template};
use owo_colors::OwoColorize;
use std::io::{BufReader, IsTerminal};

/// Run a foreground session reading JSON-lines fragments from stdin.
///
/// The session ends on stdin EOF or Ctrl+C; either way the remaining
/// buffer is flushed as one final chunk before the summary is printed.
pub async fn run_session(
    config: Config,
    session_name: &str,
    quiet: bool,
    verbosity: u8,
) -> anyhow::Result<SessionSummary> {
    let policy = config.session.policy()?;
    let template = find_template(&config.summarize.template)?;

    if verbosity >= 1 {
        eprintln!(
            "Session '{}': interval {}, template '{}'",
            session_name, policy, template.name
        );
    }

    let engine = SessionEngine::with_config(EngineConfig {
        policy,
        include_partials: config.session.include_partials,
        max_dispatch_retries: config.summarize.max_dispatch_retries,
        speaker: config.session.speaker.clone(),
        ..EngineConfig::default()
    });

    let source = JsonLinesSource::new(BufReader::new(std::io::stdin()));
    let dispatch = SummarizerDispatch::new(LogSummarizer::new(quiet), template)
        .with_context_chunks(config.summarize.context_chunks);

    let (handle, worker) = engine.start(session_name, source, StdoutDisplay, dispatch);

    // Ctrl+C asks the worker to stop; the terminal flush still runs.
    let ctrl_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_handle.request_stop();
        }
    });

    let summary = tokio::task::spawn_blocking(move || worker.wait()).await??;

    if !quiet {
        print_summary(&summary);
    }
    Ok(summary)
}

/// Render the end-of-session summary to stderr.
pub fn print_summary(summary: &SessionSummary) {
    let color = std::io::stderr().is_terminal();

    let header = format!("=== session '{}' summary ===", summary.name);
    if color {
        eprintln!("{}", header.bold());
    } else {
        eprintln!("{}", header);
    }

    eprintln!(
        "  duration: {:02}:{:02}",
        summary.duration_secs / 60,
        summary.duration_secs % 60
    );
    eprintln!("  lines: {}", summary.lines);
    eprintln!("  chunks dispatched: {}", summary.chunks_dispatched);
    if summary.speakers.is_empty() {
        eprintln!("  speakers: none");
    } else {
        eprintln!("  speakers: {}", summary.speakers.join(", "));
    }
    if !summary.markers.is_empty() {
        eprintln!("  markers:");
        for marker in &summary.markers {
            eprintln!(
                "    [{}] {} (line {})",
                marker.timestamp_display(),
                marker.key,
                marker.position
            );
        }
    }
}

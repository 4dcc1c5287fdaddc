//! Daemon mode for meetscribe - runs a session controlled over IPC.

pub mod handler;

use crate::config::Config;
use crate::engine::{
    EngineConfig, EngineHandle, JsonLinesSource, SessionEngine, SessionWorker, StdoutDisplay,
};
use crate::error::Result;
use crate::ipc::server::IpcServer;
use crate::summarize::{LogSummarizer, SummarizerDispatch, find_template};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Daemon state: the running session and its control handle.
pub struct DaemonState {
    /// Control surface for the session engine.
    pub handle: EngineHandle,
    /// Worker owner; taken on Stop to join and build the summary.
    pub worker: Mutex<Option<SessionWorker>>,
    /// Signalled by the Shutdown command.
    pub shutdown: Notify,
}

impl DaemonState {
    /// Creates a new daemon state around a started session.
    pub fn new(handle: EngineHandle, worker: SessionWorker) -> Self {
        Self {
            handle,
            worker: Mutex::new(Some(worker)),
            shutdown: Notify::new(),
        }
    }

    /// Returns true while the session worker is alive.
    pub async fn is_running(&self) -> bool {
        self.handle.is_running() && self.worker.lock().await.is_some()
    }
}

/// Run the daemon: start the session engine on stdin, start the IPC
/// server, wait for shutdown.
///
/// Fragments arrive as JSON lines on stdin; control commands arrive over
/// the Unix socket.
pub async fn run_daemon(
    config: Config,
    socket_path: Option<PathBuf>,
    session_name: &str,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    let policy = config.session.policy()?;
    let template = find_template(&config.summarize.template)?;

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
    let state = Arc::new(DaemonState::new(handle.clone(), worker));

    // Determine socket path
    let socket_path = socket_path.unwrap_or_else(IpcServer::default_socket_path);

    let server = Arc::new(IpcServer::new(socket_path)?);

    if !quiet {
        eprintln!(
            "IPC server listening at: {}",
            server.socket_path().display()
        );
        eprintln!("Session '{}' started ({}).", session_name, policy);
    }

    // Create command handler
    let handler = handler::SessionCommandHandler::new(Arc::clone(&state), quiet, verbosity);

    // Start IPC server in background task
    let server_clone = Arc::clone(&server);
    let server_handle = tokio::spawn(async move { server_clone.start(handler).await });

    // Wait for SIGTERM, SIGINT or the Shutdown command
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if !quiet {
                eprintln!("\nReceived SIGINT, shutting down...");
            }
        }
        res = wait_for_sigterm() => {
            if let Err(e) = res {
                eprintln!("Error setting up signal handler: {}", e);
            }
            if !quiet {
                eprintln!("\nReceived SIGTERM, shutting down...");
            }
        }
        _ = state.shutdown.notified() => {
            if !quiet {
                eprintln!("Shutdown requested, shutting down...");
            }
        }
    }

    // Stop the session (final flush) if still running
    let worker = state.worker.lock().await.take();
    if let Some(worker) = worker {
        let summary = tokio::task::spawn_blocking(move || worker.stop())
            .await
            .map_err(|e| crate::error::MeetscribeError::Other(format!("stop task failed: {e}")))?;
        match summary {
            Ok(summary) if !quiet => {
                eprintln!(
                    "Session '{}' finished: {} lines, {} chunks, {} markers.",
                    summary.name,
                    summary.lines,
                    summary.chunks_dispatched,
                    summary.markers.len()
                );
            }
            Ok(_) => {}
            Err(e) => eprintln!("meetscribe: session ended with error: {}", e),
        }
    }

    // Stop IPC server
    server.stop().await?;

    // Wait for server task to finish
    if let Err(e) = server_handle.await {
        eprintln!("meetscribe: daemon server task failed: {e}");
    }

    if !quiet {
        eprintln!("Daemon stopped.");
    }

    Ok(())
}

/// Wait for SIGTERM signal (used by systemd).
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use crate::error::MeetscribeError;
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
        MeetscribeError::Other(format!("Failed to register SIGTERM handler: {}", e))
    })?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    // On non-Unix, just wait forever (Ctrl+C will still work)
    std::future::pending::<()>().await
}

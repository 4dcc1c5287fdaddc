//! Command handler implementation for the daemon.

use crate::daemon::DaemonState;
use crate::ipc::protocol::{Command, Response};
use crate::ipc::server::CommandHandler;
use crate::session::IntervalPolicy;
use std::sync::Arc;

/// Command handler mapping IPC commands onto the session engine.
pub struct SessionCommandHandler {
    state: Arc<DaemonState>,
    quiet: bool,
    verbosity: u8,
}

impl SessionCommandHandler {
    /// Creates a new command handler.
    pub fn new(state: Arc<DaemonState>, quiet: bool, verbosity: u8) -> Self {
        Self {
            state,
            quiet,
            verbosity,
        }
    }

    /// Change the processing interval of the running session.
    fn set_interval(&self, value: &str) -> Response {
        let policy = match IntervalPolicy::parse(value) {
            Ok(policy) => policy,
            Err(e) => {
                return Response::Error {
                    message: e.to_string(),
                };
            }
        };

        match self.state.handle.set_interval(policy) {
            Ok(flushed) => {
                if self.verbosity >= 1 && flushed {
                    eprintln!("Interval change flushed the pending buffer.");
                }
                Response::Ok
            }
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    /// Flush the current buffer immediately.
    fn flush(&self) -> Response {
        match self.state.handle.trigger_instant_flush() {
            Ok(dispatched) => Response::Flushed { dispatched },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    /// Record a named marker at the current position.
    fn marker(&self, key: &str) -> Response {
        match self.state.handle.add_marker(key) {
            Ok(()) => {
                if !self.quiet {
                    eprintln!("Marker '{}' recorded.", key);
                }
                Response::Ok
            }
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    /// Get session status.
    fn status(&self) -> Response {
        match self.state.handle.status() {
            Ok(status) => Response::Status { status },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    /// Stop the session, flushing remaining content, and return the
    /// summary.
    async fn stop(&self) -> Response {
        let worker = self.state.worker.lock().await.take();
        let Some(worker) = worker else {
            return Response::Error {
                message: "Session already stopped".to_string(),
            };
        };

        // The worker exits within one poll interval; join off the runtime.
        let result = tokio::task::spawn_blocking(move || worker.stop()).await;
        match result {
            Ok(Ok(summary)) => Response::Summary { summary },
            Ok(Err(e)) => Response::Error {
                message: e.to_string(),
            },
            Err(e) => Response::Error {
                message: format!("stop task failed: {}", e),
            },
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for SessionCommandHandler {
    async fn handle(&self, command: Command) -> Response {
        match command {
            Command::SetInterval { value } => self.set_interval(&value),
            Command::Flush => self.flush(),
            Command::Marker { key } => self.marker(&key),
            Command::Status => self.status(),
            Command::Stop => self.stop().await,
            Command::Shutdown => {
                self.state.shutdown.notify_one();
                Response::Ok
            }
        }
    }
}

//! IPC client for sending commands to the daemon.

use crate::error::{MeetscribeError, Result};
use crate::ipc::protocol::{Command, Response};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Send a command to the daemon via Unix socket.
///
/// # Errors
/// Returns `MeetscribeError::IpcConnection` if connection fails
/// Returns `MeetscribeError::IpcProtocol` if serialization/deserialization fails
pub async fn send_command(socket_path: &Path, command: Command) -> Result<Response> {
    // Connect to daemon socket
    let stream =
        UnixStream::connect(socket_path)
            .await
            .map_err(|e| MeetscribeError::IpcConnection {
                message: format!("Failed to connect to daemon: {}", e),
            })?;

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    // Serialize and send command
    let command_json = command.to_json().map_err(|e| MeetscribeError::IpcProtocol {
        message: format!("Failed to serialize command: {}", e),
    })?;

    writer
        .write_all(command_json.as_bytes())
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to write command: {}", e),
        })?;

    writer
        .write_all(b"\n")
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to write newline: {}", e),
        })?;

    writer
        .flush()
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to flush writer: {}", e),
        })?;

    // Read response
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to read response: {}", e),
        })?;

    // Deserialize response
    let response =
        Response::from_json(response_line.trim()).map_err(|e| MeetscribeError::IpcProtocol {
            message: format!("Failed to deserialize response: {}", e),
        })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::server::{CommandHandler, IpcServer};
    use tempfile::TempDir;

    // Mock handler for testing
    struct MockHandler;

    #[async_trait::async_trait]
    impl CommandHandler for MockHandler {
        async fn handle(&self, command: Command) -> Response {
            match command {
                Command::SetInterval { .. } => Response::Ok,
                Command::Flush => Response::Flushed { dispatched: false },
                Command::Marker { .. } => Response::Ok,
                Command::Status => Response::Status {
                    status: crate::engine::EngineStatus {
                        session_name: "client-test".to_string(),
                        running: true,
                        policy: "manual".to_string(),
                        elapsed_secs: 12,
                        since_last_flush_secs: 12,
                        buffer_empty: false,
                        lines: 4,
                        speakers: vec!["Speaker 1".to_string()],
                        chunks_dispatched: 0,
                        markers: 2,
                    },
                },
                Command::Stop => Response::Summary {
                    summary: crate::session::SessionSummary {
                        name: "client-test".to_string(),
                        duration_secs: 12,
                        speakers: vec!["Speaker 1".to_string()],
                        markers: vec![],
                        lines: 4,
                        chunks_dispatched: 1,
                    },
                },
                Command::Shutdown => Response::Ok,
            }
        }
    }

    async fn spawn_server(socket_path: &Path) {
        let server_socket_path = socket_path.to_path_buf();
        tokio::spawn(async move {
            let server = IpcServer::new(server_socket_path).unwrap();
            server.start(MockHandler).await
        });

        // Give server time to start
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_send_command_status() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(&socket_path).await;

        let response = send_command(&socket_path, Command::Status).await.unwrap();

        match response {
            Response::Status { status } => {
                assert!(status.running);
                assert_eq!(status.session_name, "client-test");
                assert_eq!(status.markers, 2);
            }
            _ => panic!("Expected Status response, got: {:?}", response),
        }
    }

    #[tokio::test]
    async fn test_send_command_flush() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(&socket_path).await;

        let response = send_command(&socket_path, Command::Flush).await.unwrap();
        assert_eq!(response, Response::Flushed { dispatched: false });
    }

    #[tokio::test]
    async fn test_send_command_stop_returns_summary() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(&socket_path).await;

        let response = send_command(&socket_path, Command::Stop).await.unwrap();
        match response {
            Response::Summary { summary } => {
                assert_eq!(summary.name, "client-test");
                assert_eq!(summary.chunks_dispatched, 1);
            }
            _ => panic!("Expected Summary response"),
        }
    }

    #[tokio::test]
    async fn test_send_command_connection_failed() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("nonexistent.sock");

        // Try to connect to non-existent socket
        let result = send_command(&socket_path, Command::Status).await;

        assert!(result.is_err());
        let err = result.unwrap_err();
        match err {
            MeetscribeError::IpcConnection { message } => {
                assert!(message.contains("Failed to connect to daemon"));
            }
            _ => panic!("Expected IpcConnection error, got: {:?}", err),
        }
    }

    #[tokio::test]
    async fn test_multiple_sequential_commands() {
        let temp_dir = TempDir::new().unwrap();
        let socket_path = temp_dir.path().join("test.sock");
        spawn_server(&socket_path).await;

        let commands = vec![
            Command::Status,
            Command::SetInterval {
                value: "20s".to_string(),
            },
            Command::Marker {
                key: "action".to_string(),
            },
            Command::Shutdown,
        ];

        for cmd in commands {
            let response = send_command(&socket_path, cmd.clone()).await.unwrap();
            assert!(
                matches!(response, Response::Ok | Response::Status { .. }),
                "Unexpected response for {:?}: {:?}",
                cmd,
                response
            );
        }
    }
}

//! JSON message protocol for IPC communication between CLI and daemon.

use crate::engine::EngineStatus;
use crate::session::SessionSummary;
use serde::{Deserialize, Serialize};

/// Commands sent by CLI to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Change the processing interval ("manual", "10s", ...)
    SetInterval { value: String },
    /// Flush the current buffer immediately
    Flush,
    /// Record a named marker at the current position
    Marker { key: String },
    /// Get session status
    Status,
    /// Stop the session and flush remaining content
    Stop,
    /// Shutdown the daemon
    Shutdown,
}

impl Command {
    /// Serialize command to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize command from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent by daemon to CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Command succeeded
    Ok,
    /// Flush completed; `dispatched` is false when the buffer was empty
    Flushed { dispatched: bool },
    /// Current session status
    Status { status: EngineStatus },
    /// Session finished with a summary
    Summary { summary: SessionSummary },
    /// Error occurred
    Error { message: String },
}

impl Response {
    /// Serialize response to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize response from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Command Tests

    #[test]
    fn test_command_all_variants_serialize() {
        let commands = vec![
            Command::SetInterval {
                value: "15s".to_string(),
            },
            Command::Flush,
            Command::Marker {
                key: "decision".to_string(),
            },
            Command::Status,
            Command::Stop,
            Command::Shutdown,
        ];

        for cmd in commands {
            let json = cmd.to_json().expect("should serialize");
            let deserialized = Command::from_json(&json).expect("should deserialize");
            assert_eq!(cmd, deserialized, "roundtrip failed for {:?}", cmd);
        }
    }

    #[test]
    fn test_json_format_is_snake_case() {
        let cmd = Command::SetInterval {
            value: "manual".to_string(),
        };
        let json = cmd.to_json().expect("should serialize");
        assert!(
            json.contains("\"type\":\"set_interval\""),
            "JSON should use snake_case. Got: {}",
            json
        );

        let cmd = Command::Flush;
        let json = cmd.to_json().expect("should serialize");
        assert!(
            json.contains("\"type\":\"flush\""),
            "JSON should use snake_case. Got: {}",
            json
        );
    }

    #[test]
    fn test_command_json_format_examples() {
        // Verify the exact format matches expected output
        let flush = Command::Flush.to_json().unwrap();
        assert_eq!(flush, r#"{"type":"flush"}"#);

        let status = Command::Status.to_json().unwrap();
        assert_eq!(status, r#"{"type":"status"}"#);

        let marker = Command::Marker {
            key: "action".to_string(),
        }
        .to_json()
        .unwrap();
        assert_eq!(marker, r#"{"type":"marker","key":"action"}"#);
    }

    // Response Tests

    #[test]
    fn test_response_ok_json_roundtrip() {
        let resp = Response::Ok;
        let json = resp.to_json().expect("should serialize");
        let deserialized = Response::from_json(&json).expect("should deserialize");
        assert_eq!(resp, deserialized);
        assert_eq!(json, r#"{"type":"ok"}"#);
    }

    #[test]
    fn test_response_flushed_json_roundtrip() {
        let resp = Response::Flushed { dispatched: true };
        let json = resp.to_json().expect("should serialize");
        let deserialized = Response::from_json(&json).expect("should deserialize");
        assert_eq!(resp, deserialized);
        assert!(json.contains("\"type\":\"flushed\""));
        assert!(json.contains("\"dispatched\":true"));
    }

    #[test]
    fn test_response_status_json_roundtrip() {
        let resp = Response::Status {
            status: EngineStatus {
                session_name: "standup".to_string(),
                running: true,
                policy: "10s".to_string(),
                elapsed_secs: 95,
                since_last_flush_secs: 5,
                buffer_empty: false,
                lines: 12,
                speakers: vec!["Alice".to_string()],
                chunks_dispatched: 3,
                markers: 1,
            },
        };
        let json = resp.to_json().expect("should serialize");
        let deserialized = Response::from_json(&json).expect("should deserialize");
        assert_eq!(resp, deserialized);
        assert!(json.contains("\"type\":\"status\""));
        assert!(json.contains("\"session_name\":\"standup\""));
        assert!(json.contains("\"chunks_dispatched\":3"));
    }

    #[test]
    fn test_response_error_json_roundtrip() {
        let resp = Response::Error {
            message: "invalid interval: 0s".to_string(),
        };
        let json = resp.to_json().expect("should serialize");
        let deserialized = Response::from_json(&json).expect("should deserialize");
        assert_eq!(resp, deserialized);
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"message\":\"invalid interval: 0s\""));
    }

    #[test]
    fn test_invalid_json_returns_error() {
        let invalid = r#"{"type": "unknown_command"}"#;
        let result = Command::from_json(invalid);
        assert!(result.is_err(), "should fail for unknown command type");

        let invalid = r#"{"invalid": "json"}"#;
        let result = Command::from_json(invalid);
        assert!(result.is_err(), "should fail for missing type field");

        let invalid = r#"not json at all"#;
        let result = Command::from_json(invalid);
        assert!(result.is_err(), "should fail for malformed JSON");
    }

    #[test]
    fn test_response_error_with_special_chars() {
        let resp = Response::Error {
            message: r#"failed to parse "5x" (unknown unit)"#.to_string(),
        };
        let json = resp.to_json().expect("should serialize");
        let deserialized = Response::from_json(&json).expect("should deserialize");
        assert_eq!(resp, deserialized);
    }
}

//! Error types for meetscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetscribeError {
    // Interval policy errors
    #[error("Invalid interval '{value}': {message}")]
    InvalidInterval { value: String, message: String },

    // Session errors
    #[error("Transcription source disconnected: {message}")]
    SourceDisconnected { message: String },

    // Chunk dispatch errors
    #[error("Chunk dispatch failed: {message}")]
    Dispatch { message: String },

    #[error("Chunk dispatch failed after {attempts} attempts, dropping chunk")]
    DispatchExhausted { attempts: u32 },

    // Summarization errors
    #[error("Unknown template '{name}'")]
    UnknownTemplate { name: String },

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MeetscribeError>;

//! Command-line interface for meetscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Live meeting transcript aggregation and chunked summarization
#[derive(Parser, Debug)]
#[command(
    name = "meetscribe",
    version,
    about = "Live meeting transcript aggregation and chunked summarization"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress chunk output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: per-line echo, -vv: full diagnostics)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Session name, used in chunk headers and the final summary
    #[arg(long, global = true, value_name = "NAME", default_value = "meeting")]
    pub session: String,

    /// Processing interval: "manual" or a duration (10s, 45s, 5m)
    #[arg(long, short = 'i', global = true, value_name = "INTERVAL")]
    pub interval: Option<String>,

    /// Summarization template (Meeting Summary, Action Items, Decision Tracking)
    #[arg(long, short = 't', global = true, value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Include provisional recognitions in the buffer (normally display-only)
    #[arg(long, global = true)]
    pub include_partials: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a session reading JSON-lines fragments from stdin
    Run,

    /// Start the daemon (foreground process, controlled over the socket)
    Daemon {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Change the processing interval of a running session via IPC
    SetInterval {
        /// New interval: "manual" or a duration (10s, 45s, 5m)
        value: String,

        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Flush the current buffer immediately via IPC
    Flush {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Record a named marker at the current position via IPC
    Marker {
        /// Marker key or label (e.g. "decision", "F5")
        key: String,

        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Get session status via IPC
    Status {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// Stop the session, flushing remaining content, via IPC
    Stop {
        /// Path to Unix socket (default: $XDG_RUNTIME_DIR/meetscribe.sock)
        #[arg(long, value_name = "PATH")]
        socket: Option<PathBuf>,
    },

    /// List available summarization templates
    Templates,

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file path
    Path,
    /// Show the effective configuration as TOML
    Show,
}

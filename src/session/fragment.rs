//! Transcript fragment type.
//!
//! One unit received from the transcription source: a recognized speech
//! segment with speaker, finality flag and session-relative timestamp.

use serde::{Deserialize, Serialize};

/// A recognized speech segment emitted by the transcription source.
///
/// Fragments are consumed immediately by the session worker and are not
/// retained beyond formatting. Missing fields are tolerated by substituting
/// defaults rather than failing the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    /// Recognized text. Whitespace-only fragments are discarded on append.
    pub text: String,
    /// Whether this is a settled recognition or a provisional one.
    /// The source may emit the same utterance first as provisional, then
    /// as final.
    #[serde(default = "default_final")]
    pub is_final: bool,
    /// Speaker label. Left empty when the source does not identify one;
    /// the engine substitutes its configured label before formatting.
    #[serde(default)]
    pub speaker: String,
    /// Seconds since session start. `None` when the source carries no
    /// timing; the buffer then falls back to session-relative elapsed time.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

fn default_final() -> bool {
    true
}

impl TranscriptFragment {
    /// Creates a final fragment with an explicit timestamp.
    pub fn new(text: impl Into<String>, speaker: impl Into<String>, timestamp: f64) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            speaker: speaker.into(),
            timestamp: Some(timestamp),
        }
    }

    /// Creates a provisional (non-final) variant of this fragment.
    pub fn provisional(mut self) -> Self {
        self.is_final = false;
        self
    }

    /// Returns true if the fragment carries no real content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Parses a fragment from a JSON line (the CLI's stdin wire format).
    pub fn from_json(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

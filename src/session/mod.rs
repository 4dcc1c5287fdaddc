//! Session-scoped transcript state: fragments, buffer, flush scheduling.

pub mod buffer;
pub mod fragment;
pub mod scheduler;
pub mod state;

pub use buffer::TranscriptBuffer;
pub use fragment::TranscriptFragment;
pub use scheduler::{ChunkScheduler, IntervalPolicy};
pub use state::{Marker, Session, SessionSummary};

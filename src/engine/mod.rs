//! Session engine: worker loop, sources and sinks.
//!
//! One worker thread per session pulls fragments from a [`TranscriptSource`],
//! feeds the transcript buffer and scheduler, and hands flushed chunks to a
//! [`DispatchSink`]. Control arrives from other threads through the
//! [`EngineHandle`].

pub mod sink;
pub mod source;
pub mod worker;

pub use sink::{
    CollectorDispatch, CollectorDisplay, DispatchSink, DisplaySink, NullDisplay, StdoutDisplay,
};
pub use source::{FragmentSender, JsonLinesSource, QueueSource, TranscriptSource};
pub use worker::{EngineConfig, EngineHandle, EngineStatus, SessionEngine, SessionWorker};

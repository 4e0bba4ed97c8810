//! Playback scheduling for the timeline engine.
//!
//! Reads timeline snapshots from `montage_core`, owns the transport clock,
//! and keeps external media sources in sync through the [`PlayableSource`]
//! abstraction. Never mutates the model.

pub mod scheduler;
pub mod source;

pub use scheduler::{build_frame, ActiveLayer, Frame, PlayState, Playback, Scheduler};
pub use source::{PlayableSource, SourcePool, DRIFT_TOLERANCE_SECS};

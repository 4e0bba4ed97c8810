//! Timeline editing engine: the track/clip model, the mutation surface, the
//! effects/transition compositor, and snapshot-based undo/redo.
//!
//! Rendering, media decoding, and playback clocking live outside this crate;
//! the playback side consumes read-only snapshots of the model.

pub mod assets;
pub mod compositor;
pub mod drag;
pub mod editing;
pub mod engine;
pub mod error;
pub mod history;
pub mod snapping;
pub mod types;

pub use assets::AssetRegistry;
pub use compositor::{resolve, ClipRect, ResolvedStyle};
pub use drag::DragKind;
pub use engine::Engine;
pub use error::EditError;
pub use types::{
    Asset, AssetKind, Clip, ClipContent, Effect, EffectKind, SourceHandle, TextStyle, Time,
    Timeline, Track, TrackKind, Transition, TransitionEdge, TransitionKind,
};

//! External media sources and drift reconciliation.
//!
//! The scheduler never talks to a concrete player; it drives anything that
//! implements [`PlayableSource`]. Drift correction is a steady-state control
//! loop: each tick compares the source's reported position with the expected
//! intra-asset offset and issues a corrective seek only past the tolerance,
//! so continuous playback is not thrashed by micro-seeks.

use crate::scheduler::Frame;
use std::collections::HashMap;
use uuid::Uuid;

/// Maximum discrepancy, in seconds, between a source's position and the
/// expected offset before a corrective seek is issued.
pub const DRIFT_TOLERANCE_SECS: f64 = 0.2;

pub trait PlayableSource {
    /// Current position inside the media, in seconds.
    fn position(&self) -> f64;
    fn seek(&mut self, secs: f64) -> anyhow::Result<()>;
    fn set_playing(&mut self, playing: bool) -> anyhow::Result<()>;
}

struct Slot {
    source: Box<dyn PlayableSource>,
    playing: bool,
}

/// Sources keyed by the clip instance they play for.
#[derive(Default)]
pub struct SourcePool {
    slots: HashMap<Uuid, Slot>,
}

impl SourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, instance_id: Uuid, source: Box<dyn PlayableSource>) {
        tracing::debug!(%instance_id, "source attached");
        self.slots.insert(
            instance_id,
            Slot {
                source,
                playing: false,
            },
        );
    }

    pub fn detach(&mut self, instance_id: Uuid) -> Option<Box<dyn PlayableSource>> {
        self.slots.remove(&instance_id).map(|s| s.source)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bring every attached source in line with the frame: active sources
    /// follow the transport state and are seeked when drifted past the
    /// tolerance; sources whose clip left the active set are paused.
    /// Source failures are logged and skipped, never propagated.
    pub fn reconcile(&mut self, frame: &Frame) {
        for (instance_id, slot) in self.slots.iter_mut() {
            let expected = frame
                .layers
                .iter()
                .find(|l| l.clip.instance_id == *instance_id)
                .and_then(|l| l.source_offset);

            match expected {
                Some(offset) => {
                    let expected_secs = offset.as_secs();
                    let drift = (slot.source.position() - expected_secs).abs();
                    if drift > DRIFT_TOLERANCE_SECS {
                        tracing::debug!(%instance_id, drift, expected_secs, "correcting drift");
                        if let Err(err) = slot.source.seek(expected_secs) {
                            tracing::warn!(%instance_id, %err, "seek failed");
                        }
                    }
                    if slot.playing != frame.is_playing {
                        if let Err(err) = slot.source.set_playing(frame.is_playing) {
                            tracing::warn!(%instance_id, %err, "transport change failed");
                        } else {
                            slot.playing = frame.is_playing;
                        }
                    }
                }
                None => {
                    if slot.playing {
                        if let Err(err) = slot.source.set_playing(false) {
                            tracing::warn!(%instance_id, %err, "pause failed");
                        } else {
                            slot.playing = false;
                        }
                    }
                }
            }
        }
    }
}

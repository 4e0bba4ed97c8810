//! Drag interaction state machine.
//!
//! A drag is exclusive: pointer-down captures the original clip and the
//! pre-drag model, every pointer-move recomputes the candidate clip from
//! that fixed capture (never incrementally from the previous frame), and
//! pointer-up commits the whole gesture as one history entry. During a drag
//! the trims clamp at the minimum duration instead of rejecting, so the
//! preview follows the pointer smoothly.

use crate::snapping::{collect_snap_points, find_snap_point};
use crate::types::{Clip, Time, Timeline, MIN_CLIP_LEN};
use uuid::Uuid;

/// How far a dragged edge reaches before it sticks to a neighbor's edge.
pub const SNAP_THRESHOLD: Time = Time(200_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    TrimIn,
    TrimOut,
}

/// What `begin` captured; handed back by `take` on release.
#[derive(Debug)]
pub struct DragCapture {
    pub kind: DragKind,
    pub instance_id: Uuid,
    pub before: Timeline,
}

#[derive(Debug, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        kind: DragKind,
        instance_id: Uuid,
        /// Pointer position (in timeline time) at pointer-down.
        origin: Time,
        /// The clip as it was at pointer-down; candidates derive from this.
        original: Clip,
        /// Model snapshot at pointer-down, for cancel and snap points.
        before: Timeline,
        /// Snap points of every other clip, collected once at pointer-down.
        snap_points: Vec<Time>,
    },
}

impl DragState {
    pub fn new() -> Self {
        Self::Idle
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    pub fn instance_id(&self) -> Option<Uuid> {
        match self {
            DragState::Dragging { instance_id, .. } => Some(*instance_id),
            DragState::Idle => None,
        }
    }

    /// Pointer-down. Refused while another drag is active or when the clip
    /// does not exist.
    pub fn begin(
        &mut self,
        timeline: &Timeline,
        kind: DragKind,
        instance_id: Uuid,
        origin: Time,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(original) = timeline.find_clip(instance_id) else {
            return false;
        };
        tracing::debug!(?kind, %instance_id, origin = %origin, "drag started");
        *self = DragState::Dragging {
            kind,
            instance_id,
            origin,
            original: original.clone(),
            before: timeline.clone(),
            snap_points: collect_snap_points(timeline, Some(instance_id)),
        };
        true
    }

    /// Pointer-move. Recomputes the candidate from the captured original and
    /// writes it into the live model. Returns false when idle.
    pub fn update(
        &self,
        timeline: &mut Timeline,
        pointer: Time,
        source_limit: Option<Time>,
    ) -> bool {
        let DragState::Dragging {
            kind,
            instance_id,
            origin,
            original,
            snap_points,
            ..
        } = self
        else {
            return false;
        };

        let delta = pointer - *origin;
        let candidate = candidate_clip(original, *kind, delta, source_limit, snap_points);
        if let Some(clip) = timeline.find_clip_mut(*instance_id) {
            *clip = candidate;
        }
        timeline.resort_track_of(*instance_id);
        true
    }

    /// Pointer-up. Resets to idle and hands the capture to the caller, who
    /// commits the live model to history (or restores `before` to cancel).
    pub fn take(&mut self) -> Option<DragCapture> {
        match std::mem::take(self) {
            DragState::Dragging {
                kind,
                instance_id,
                before,
                ..
            } => {
                tracing::debug!(?kind, %instance_id, "drag finished");
                Some(DragCapture {
                    kind,
                    instance_id,
                    before,
                })
            }
            DragState::Idle => None,
        }
    }
}

fn candidate_clip(
    original: &Clip,
    kind: DragKind,
    delta: Time,
    source_limit: Option<Time>,
    snap_points: &[Time],
) -> Clip {
    let mut clip = original.clone();
    match kind {
        DragKind::Move => {
            let base = (original.start + delta).max(Time::ZERO);
            clip.start = snap_move(base, original.duration(), snap_points).max(Time::ZERO);
        }
        DragKind::TrimIn => {
            let lo = (original.trim_in - original.start).max(Time::ZERO);
            let hi = source_limit
                .unwrap_or(Time(i64::MAX))
                .min(original.trim_out - MIN_CLIP_LEN);
            let target = (original.trim_in + delta).clamp(lo, hi);
            clip.trim_in = target;
            clip.start = original.start + (target - original.trim_in);
        }
        DragKind::TrimOut => {
            let lo = original.trim_in + MIN_CLIP_LEN;
            let hi = source_limit.unwrap_or(Time(i64::MAX));
            clip.trim_out = (original.trim_out + delta).clamp(lo, hi);
        }
    }
    clip
}

/// Snap either edge of a moved clip; the start edge wins when both stick.
fn snap_move(start: Time, duration: Time, snap_points: &[Time]) -> Time {
    let snapped_start = find_snap_point(start, snap_points, SNAP_THRESHOLD);
    if snapped_start != start {
        return snapped_start;
    }
    let snapped_end = find_snap_point(start + duration, snap_points, SNAP_THRESHOLD);
    if snapped_end != start + duration {
        return snapped_end - duration;
    }
    start
}

//! Model-level clip mutations.
//!
//! These implement the geometry rules and return typed errors; the engine
//! wraps each one in a history-routed commit and downgrades every error to a
//! silent no-op. Tracks are re-sorted by start after any mutation that moves
//! a clip, so track order stays the scan order for playback.

use crate::error::{EditError, Result};
use crate::types::*;
use uuid::Uuid;

impl Track {
    fn resort(&mut self) {
        self.clips.sort_by_key(|c| c.start);
    }
}

impl Timeline {
    /// Place an asset-backed clip spanning the asset's full duration.
    /// Returns the new clip's instance id.
    pub(crate) fn place_clip(
        &mut self,
        asset: &Asset,
        track_id: Uuid,
        start: Time,
    ) -> Result<Uuid> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(EditError::TrackNotFound(track_id))?;

        if !track.kind.accepts(asset.kind) {
            return Err(EditError::IncompatibleAsset {
                asset: asset.kind,
                track: track.kind,
            });
        }
        if asset.duration == Time::ZERO {
            return Err(EditError::UnresolvedAsset(asset.id));
        }
        if asset.duration < MIN_CLIP_LEN {
            return Err(EditError::BelowMinDuration);
        }

        let clip = Clip {
            id: Uuid::new_v4(),
            instance_id: Uuid::new_v4(),
            track_id,
            start: start.max(Time::ZERO),
            trim_in: Time::ZERO,
            trim_out: asset.duration,
            effects: vec![],
            transition_in: None,
            transition_out: None,
            content: ClipContent::Asset { asset_id: asset.id },
        };
        let instance_id = clip.instance_id;
        track.clips.push(clip);
        track.resort();
        Ok(instance_id)
    }

    /// Create a synthetic text clip on the text track with default styling.
    pub(crate) fn add_text_clip(
        &mut self,
        text: String,
        start: Time,
        duration: Time,
        transition_in: Option<Transition>,
        transition_out: Option<Transition>,
    ) -> Result<Uuid> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.kind == TrackKind::Text)
            .ok_or(EditError::TrackNotFound(Uuid::nil()))?;

        if duration < MIN_CLIP_LEN {
            return Err(EditError::BelowMinDuration);
        }

        let clip = Clip {
            id: Uuid::new_v4(),
            instance_id: Uuid::new_v4(),
            track_id: track.id,
            start: start.max(Time::ZERO),
            trim_in: Time::ZERO,
            trim_out: duration,
            effects: vec![],
            transition_in,
            transition_out,
            content: ClipContent::Text {
                text,
                style: TextStyle::default(),
            },
        };
        let instance_id = clip.instance_id;
        track.clips.push(clip);
        track.resort();
        Ok(instance_id)
    }

    /// Move a clip to a new timeline position, clamped to zero. Trim and
    /// duration are untouched; overlap with siblings is permitted.
    pub(crate) fn move_clip(&mut self, instance_id: Uuid, new_start: Time) -> Result<()> {
        let (track_idx, clip_idx) = self
            .find_clip_location(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        let track = &mut self.tracks[track_idx];
        track.clips[clip_idx].start = new_start.max(Time::ZERO);
        track.resort();
        Ok(())
    }

    /// Trim the in-point by `delta`, shifting `start` the same amount so the
    /// clip's end on the timeline stays fixed. `source_limit` is the asset
    /// duration for asset-backed clips, `None` for text.
    pub(crate) fn trim_clip_in(
        &mut self,
        instance_id: Uuid,
        delta: Time,
        source_limit: Option<Time>,
    ) -> Result<()> {
        let (track_idx, clip_idx) = self
            .find_clip_location(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        let track = &mut self.tracks[track_idx];
        let clip = &mut track.clips[clip_idx];

        // Lower bound keeps start non-negative after the matching shift.
        let lo = (clip.trim_in - clip.start).max(Time::ZERO);
        let hi = source_limit.unwrap_or(Time(i64::MAX));
        let target = (clip.trim_in + delta).clamp(lo, hi);

        if clip.trim_out - target < MIN_CLIP_LEN {
            return Err(EditError::BelowMinDuration);
        }

        let shift = target - clip.trim_in;
        clip.trim_in = target;
        clip.start = clip.start + shift;
        track.resort();
        Ok(())
    }

    /// Trim the out-point by `delta`; `start` is untouched. The out-point is
    /// clamped to the source limit before the minimum-duration check.
    pub(crate) fn trim_clip_out(
        &mut self,
        instance_id: Uuid,
        delta: Time,
        source_limit: Option<Time>,
    ) -> Result<()> {
        let clip = self
            .find_clip_mut(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;

        let mut target = clip.trim_out + delta;
        if let Some(limit) = source_limit {
            target = target.min(limit);
        }
        if target - clip.trim_in < MIN_CLIP_LEN {
            return Err(EditError::BelowMinDuration);
        }
        clip.trim_out = target;
        Ok(())
    }

    /// Split a clip strictly inside its interval. The original is truncated
    /// in place and keeps its identity; the right half is a fresh instance
    /// starting at `at`. Only the left half keeps the intro transition and
    /// only the right half keeps the outro. Returns the right half's
    /// instance id.
    pub(crate) fn split_clip(&mut self, instance_id: Uuid, at: Time) -> Result<Uuid> {
        let (track_idx, clip_idx) = self
            .find_clip_location(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        let track = &mut self.tracks[track_idx];
        let clip = &track.clips[clip_idx];

        if at <= clip.start || at >= clip.end() {
            return Err(EditError::OutsideClipBounds);
        }
        let left_duration = at - clip.start;
        let right_duration = clip.end() - at;
        if left_duration < MIN_CLIP_LEN || right_duration < MIN_CLIP_LEN {
            return Err(EditError::BelowMinDuration);
        }

        let split_source = clip.trim_in + left_duration;
        let mut right = clip.clone();
        right.instance_id = Uuid::new_v4();
        right.start = at;
        right.trim_in = split_source;
        right.transition_in = None;

        let left = &mut track.clips[clip_idx];
        left.trim_out = split_source;
        left.transition_out = None;

        let right_instance = right.instance_id;
        track.clips.insert(clip_idx + 1, right);
        track.resort();
        Ok(right_instance)
    }

    /// Duplicate a clip directly abutting the original (copy starts where
    /// the source ends). Returns the copy's instance id.
    pub(crate) fn duplicate_clip(&mut self, instance_id: Uuid) -> Result<Uuid> {
        let (track_idx, clip_idx) = self
            .find_clip_location(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        let track = &mut self.tracks[track_idx];

        let mut copy = track.clips[clip_idx].clone();
        copy.instance_id = Uuid::new_v4();
        copy.start = track.clips[clip_idx].end();

        let copy_instance = copy.instance_id;
        track.clips.insert(clip_idx + 1, copy);
        track.resort();
        Ok(copy_instance)
    }

    /// Remove a clip. Returns the removed record.
    pub(crate) fn delete_clip(&mut self, instance_id: Uuid) -> Result<Clip> {
        let (track_idx, clip_idx) = self
            .find_clip_location(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        Ok(self.tracks[track_idx].clips.remove(clip_idx))
    }

    /// Apply or update an effect. One instance per kind: re-applying a kind
    /// replaces the value and keeps the original effect id.
    pub(crate) fn set_effect(
        &mut self,
        instance_id: Uuid,
        kind: EffectKind,
        value: f64,
    ) -> Result<()> {
        let clip = self
            .find_clip_mut(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        if let Some(effect) = clip.effects.iter_mut().find(|e| e.kind == kind) {
            effect.value = value;
        } else {
            clip.effects.push(Effect {
                id: Uuid::new_v4(),
                kind,
                value,
            });
        }
        Ok(())
    }

    pub(crate) fn clear_effect(&mut self, instance_id: Uuid, kind: EffectKind) -> Result<()> {
        let clip = self
            .find_clip_mut(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        clip.effects.retain(|e| e.kind != kind);
        Ok(())
    }

    /// Set or clear the transition on one edge of a clip.
    pub(crate) fn set_transition(
        &mut self,
        instance_id: Uuid,
        edge: TransitionEdge,
        transition: Option<Transition>,
    ) -> Result<()> {
        let clip = self
            .find_clip_mut(instance_id)
            .ok_or(EditError::ClipNotFound(instance_id))?;
        match edge {
            TransitionEdge::Intro => clip.transition_in = transition,
            TransitionEdge::Outro => clip.transition_out = transition,
        }
        Ok(())
    }

    fn find_clip_location(&self, instance_id: Uuid) -> Option<(usize, usize)> {
        for (ti, track) in self.tracks.iter().enumerate() {
            for (ci, clip) in track.clips.iter().enumerate() {
                if clip.instance_id == instance_id {
                    return Some((ti, ci));
                }
            }
        }
        None
    }

    pub(crate) fn find_clip_mut(&mut self, instance_id: Uuid) -> Option<&mut Clip> {
        self.tracks
            .iter_mut()
            .flat_map(|t| t.clips.iter_mut())
            .find(|c| c.instance_id == instance_id)
    }

    pub(crate) fn resort_track_of(&mut self, instance_id: Uuid) {
        if let Some((track_idx, _)) = self.find_clip_location(instance_id) {
            self.tracks[track_idx].resort();
        }
    }
}

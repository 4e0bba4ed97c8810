//! Playback transport and per-tick frame resolution.
//!
//! A two-state machine (paused/playing) owns the single authoritative
//! playhead. The host calls `tick` from its redraw callback with the
//! measured wall-clock delta; the scheduler advances the playhead, resolves
//! the active clip per track, and hands back a declarative [`Frame`] for the
//! renderer while reconciling attached media sources.

use crate::source::SourcePool;
use montage_core::compositor::{resolve, ResolvedStyle};
use montage_core::types::{Clip, Time, Timeline, TrackKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Playheads this close to the end restart from zero when playback begins.
pub const END_EPSILON: Time = Time(1_000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    #[default]
    Paused,
    Playing,
}

/// The transport state machine. Owns nothing but the clock.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playback {
    state: PlayState,
    current_time: Time,
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    /// Start or pause. Starting from (or past) the end rewinds to zero
    /// first.
    pub fn toggle_play(&mut self, total: Time) {
        match self.state {
            PlayState::Playing => {
                self.state = PlayState::Paused;
                tracing::debug!(time = %self.current_time, "playback paused");
            }
            PlayState::Paused => {
                if self.current_time >= total - END_EPSILON {
                    self.current_time = Time::ZERO;
                }
                self.state = PlayState::Playing;
                tracing::debug!(time = %self.current_time, "playback started");
            }
        }
    }

    /// Jump the playhead. Always forces a pause, superseding any in-flight
    /// playback for the next tick.
    pub fn scrub(&mut self, t: Time) {
        self.state = PlayState::Paused;
        self.current_time = t.max(Time::ZERO);
        tracing::debug!(time = %self.current_time, "scrubbed");
    }

    /// Advance by the measured wall-clock delta. Reaching the end clamps the
    /// playhead to the total duration and pauses.
    pub fn advance(&mut self, dt: Time, total: Time) {
        if self.state != PlayState::Playing {
            return;
        }
        self.current_time = self.current_time + dt.max(Time::ZERO);
        if self.current_time >= total {
            self.current_time = total;
            self.state = PlayState::Paused;
            tracing::debug!(time = %self.current_time, "playback reached end");
        }
    }
}

/// One visible/audible clip in a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveLayer {
    pub track_id: Uuid,
    pub track_kind: TrackKind,
    pub clip: Clip,
    /// Asset-backed clips: the position inside the source the media element
    /// should be at. Text clips carry none.
    pub source_offset: Option<Time>,
    pub style: ResolvedStyle,
}

/// Declarative rendering state for one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub current_time: Time,
    pub is_playing: bool,
    pub layers: Vec<ActiveLayer>,
}

/// Resolve the active clips at `now`. Video tracks surface at most one clip
/// (first in start order wins when siblings overlap); audio and text tracks
/// surface every clip whose interval contains `now`.
pub fn build_frame(timeline: &Timeline, now: Time, is_playing: bool) -> Frame {
    let mut layers = Vec::new();

    for track in timeline.tracks() {
        let active = track.clips().iter().filter(|c| c.contains(now));
        let selected: Vec<&Clip> = match track.kind {
            TrackKind::Video => active.take(1).collect(),
            TrackKind::Audio | TrackKind::Text => active.collect(),
        };
        for clip in selected {
            let source_offset = clip
                .asset_id()
                .map(|_| now - clip.start + clip.trim_in);
            layers.push(ActiveLayer {
                track_id: track.id,
                track_kind: track.kind,
                clip: clip.clone(),
                source_offset,
                style: resolve(clip, now),
            });
        }
    }

    Frame {
        current_time: now,
        is_playing,
        layers,
    }
}

/// Transport plus source reconciliation, driven once per redraw.
#[derive(Default)]
pub struct Scheduler {
    playback: Playback,
    pool: SourcePool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn pool_mut(&mut self) -> &mut SourcePool {
        &mut self.pool
    }

    pub fn toggle_play(&mut self, timeline: &Timeline) {
        self.playback.toggle_play(timeline.total_duration());
    }

    pub fn scrub(&mut self, t: Time) {
        self.playback.scrub(t);
    }

    /// Advance the clock by `dt`, resolve the frame, and bring sources in
    /// line with it.
    pub fn tick(&mut self, dt: Time, timeline: &Timeline) -> Frame {
        self.playback.advance(dt, timeline.total_duration());
        let frame = build_frame(
            timeline,
            self.playback.current_time(),
            self.playback.is_playing(),
        );
        self.pool.reconcile(&frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_core::types::{AssetKind, SourceHandle, TextStyle, TransitionKind};
    use montage_core::{Engine, Transition, TransitionEdge};

    fn engine_with_clips() -> Engine {
        let mut engine = Engine::new();
        let video = engine.register_asset(
            AssetKind::Video,
            "a.mp4",
            SourceHandle("blob:a".to_string()),
        );
        engine.resolve_asset(video, Some(Time::from_secs(10.0)));
        let audio = engine.register_asset(
            AssetKind::Audio,
            "a.mp3",
            SourceHandle("blob:b".to_string()),
        );
        engine.resolve_asset(audio, Some(Time::from_secs(10.0)));

        let video_track = engine
            .timeline()
            .track_of_kind(TrackKind::Video)
            .unwrap()
            .id;
        let audio_track = engine
            .timeline()
            .track_of_kind(TrackKind::Audio)
            .unwrap()
            .id;
        engine.place_clip(video, video_track, Time::ZERO);
        engine.place_clip(audio, audio_track, Time::ZERO);
        engine
    }

    // -----------------------------------------------------------------------
    // transport state machine
    // -----------------------------------------------------------------------

    #[test]
    fn initial_state_is_paused_at_zero() {
        let pb = Playback::new();
        assert!(!pb.is_playing());
        assert_eq!(pb.current_time(), Time::ZERO);
    }

    #[test]
    fn plays_to_end_clamps_and_pauses() {
        let total = Time::from_secs(20.0);
        let mut pb = Playback::new();
        pb.scrub(Time::from_secs(18.0));
        pb.toggle_play(total);
        assert!(pb.is_playing());

        pb.advance(Time::from_secs(1.0), total);
        assert_eq!(pb.current_time(), Time::from_secs(19.0));
        assert!(pb.is_playing());

        pb.advance(Time::from_secs(1.5), total);
        assert_eq!(pb.current_time(), total);
        assert!(!pb.is_playing());

        // Further ticks leave the clock parked at the end.
        pb.advance(Time::from_secs(1.0), total);
        assert_eq!(pb.current_time(), total);
    }

    #[test]
    fn toggle_at_end_rewinds_first() {
        let total = Time::from_secs(20.0);
        let mut pb = Playback::new();
        pb.scrub(total);
        pb.toggle_play(total);
        assert!(pb.is_playing());
        assert_eq!(pb.current_time(), Time::ZERO);
    }

    #[test]
    fn scrub_interrupts_playback_and_resume_continues() {
        let total = Time::from_secs(20.0);
        let mut pb = Playback::new();
        pb.toggle_play(total);
        pb.advance(Time::from_secs(2.0), total);

        pb.scrub(Time::from_secs(5.0));
        assert!(!pb.is_playing());
        assert_eq!(pb.current_time(), Time::from_secs(5.0));

        pb.toggle_play(total);
        pb.advance(Time::from_secs(1.0), total);
        assert_eq!(pb.current_time(), Time::from_secs(6.0));
    }

    #[test]
    fn scrub_clamps_negative_to_zero() {
        let mut pb = Playback::new();
        pb.scrub(Time::from_secs(-3.0));
        assert_eq!(pb.current_time(), Time::ZERO);
    }

    #[test]
    fn advance_ignores_negative_delta() {
        let total = Time::from_secs(20.0);
        let mut pb = Playback::new();
        pb.toggle_play(total);
        pb.advance(Time::from_secs(2.0), total);
        pb.advance(Time::from_secs(-5.0), total);
        assert_eq!(pb.current_time(), Time::from_secs(2.0));
    }

    #[test]
    fn advance_while_paused_does_nothing() {
        let mut pb = Playback::new();
        pb.advance(Time::from_secs(2.0), Time::from_secs(20.0));
        assert_eq!(pb.current_time(), Time::ZERO);
    }

    // -----------------------------------------------------------------------
    // frame resolution
    // -----------------------------------------------------------------------

    #[test]
    fn frame_carries_active_clips_with_offsets() {
        let engine = engine_with_clips();
        let frame = build_frame(engine.timeline(), Time::from_secs(5.0), true);

        assert_eq!(frame.layers.len(), 2);
        assert!(frame.is_playing);
        for layer in &frame.layers {
            assert_eq!(layer.source_offset, Some(Time::from_secs(5.0)));
        }
    }

    #[test]
    fn offset_accounts_for_trim_and_position() {
        let mut engine = engine_with_clips();
        let instance = engine
            .timeline()
            .track_of_kind(TrackKind::Video)
            .unwrap()
            .clips()[0]
            .instance_id;
        engine.trim_in(instance, Time::from_secs(2.0));
        engine.move_clip(instance, Time::from_secs(4.0));
        // Clip occupies [4, 12) playing source [2, 10).

        let frame = build_frame(engine.timeline(), Time::from_secs(6.0), false);
        let layer = frame
            .layers
            .iter()
            .find(|l| l.track_kind == TrackKind::Video)
            .unwrap();
        assert_eq!(layer.source_offset, Some(Time::from_secs(4.0)));
    }

    #[test]
    fn video_track_surfaces_single_clip_on_overlap() {
        let mut engine = engine_with_clips();
        let video_track = engine
            .timeline()
            .track_of_kind(TrackKind::Video)
            .unwrap()
            .id;
        let asset = engine.register_asset(
            AssetKind::Video,
            "b.mp4",
            SourceHandle("blob:c".to_string()),
        );
        engine.resolve_asset(asset, Some(Time::from_secs(10.0)));
        engine.place_clip(asset, video_track, Time::from_secs(3.0));

        // Both video clips cover t=5; the earlier-starting one wins.
        let frame = build_frame(engine.timeline(), Time::from_secs(5.0), false);
        let video_layers: Vec<_> = frame
            .layers
            .iter()
            .filter(|l| l.track_kind == TrackKind::Video)
            .collect();
        assert_eq!(video_layers.len(), 1);
        assert_eq!(video_layers[0].clip.start, Time::ZERO);
    }

    #[test]
    fn text_clips_surface_with_style() {
        let mut engine = engine_with_clips();
        engine.add_text_clip(
            "Hello",
            Time::from_secs(1.0),
            Time::from_secs(4.0),
            Some(Transition {
                kind: TransitionKind::FadeIn,
                duration: Time::from_secs(2.0),
            }),
            None,
        );

        let frame = build_frame(engine.timeline(), Time::from_secs(2.0), false);
        let text_layer = frame
            .layers
            .iter()
            .find(|l| l.track_kind == TrackKind::Text)
            .unwrap();
        assert_eq!(text_layer.source_offset, None);
        assert_eq!(text_layer.style.anchor, Some(TextStyle::default().position));
        // Halfway through the fade-in window.
        assert!((text_layer.style.opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_instant_yields_no_layers() {
        let engine = engine_with_clips();
        let frame = build_frame(engine.timeline(), Time::from_secs(15.0), false);
        assert!(frame.layers.is_empty());
    }

    #[test]
    fn outro_transition_resolves_in_frame() {
        let mut engine = engine_with_clips();
        let instance = engine
            .timeline()
            .track_of_kind(TrackKind::Video)
            .unwrap()
            .clips()[0]
            .instance_id;
        engine.set_transition(
            instance,
            TransitionEdge::Outro,
            Some(Transition {
                kind: TransitionKind::FadeOut,
                duration: Time::from_secs(2.0),
            }),
        );

        let frame = build_frame(engine.timeline(), Time::from_secs(9.0), false);
        let layer = frame
            .layers
            .iter()
            .find(|l| l.track_kind == TrackKind::Video)
            .unwrap();
        assert!((layer.style.opacity - 0.5).abs() < 1e-9);
    }

    // -----------------------------------------------------------------------
    // scheduler tick
    // -----------------------------------------------------------------------

    #[test]
    fn tick_advances_and_resolves() {
        let engine = engine_with_clips();
        let mut scheduler = Scheduler::new();
        scheduler.toggle_play(engine.timeline());

        let frame = scheduler.tick(Time::from_secs(0.5), engine.timeline());
        assert_eq!(frame.current_time, Time::from_secs(0.5));
        assert!(frame.is_playing);
        assert_eq!(frame.layers.len(), 2);
    }

    #[test]
    fn tick_runs_out_and_pauses() {
        let engine = engine_with_clips();
        let mut scheduler = Scheduler::new();
        scheduler.scrub(Time::from_secs(19.0));
        scheduler.toggle_play(engine.timeline());

        let frame = scheduler.tick(Time::from_secs(2.0), engine.timeline());
        assert_eq!(frame.current_time, Time::from_secs(20.0));
        assert!(!frame.is_playing);
    }

    #[test]
    fn frame_serializes_for_the_renderer() {
        let engine = engine_with_clips();
        let frame = build_frame(engine.timeline(), Time::from_secs(5.0), true);
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"is_playing\":true"));
    }
}

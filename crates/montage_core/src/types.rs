use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Timeline instants and durations in integer microseconds.
///
/// Integer arithmetic keeps structural equality exact: trimming a clip by a
/// delta and back restores the original representation bit for bit, which the
/// snapshot history relies on.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Time(pub i64);

impl Time {
    pub const ZERO: Self = Self(0);

    pub fn from_secs(s: f64) -> Self {
        Self((s * 1_000_000.0).round() as i64)
    }

    pub fn as_secs(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self(self.0.clamp(lo.0, hi.0))
    }
}

impl Add for Time {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Time {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Time {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_us = self.0.unsigned_abs();
        let total_ms = total_us / 1_000;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let mins = total_secs / 60 % 60;
        let hours = total_secs / 3600;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

/// Shortest clip the editor will create or keep after a trim.
pub const MIN_CLIP_LEN: Time = Time(1_000_000);

/// An empty timeline still presents this much ruler.
pub const MIN_TIMELINE_VIEW: Time = Time(20_000_000);

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AssetKind {
    Video,
    Audio,
    Image,
}

/// Opaque reference to an external, already-decoded media source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceHandle(pub String);

/// Immutable ingested media record. `duration == 0` means the duration has
/// not resolved (or never will); such assets cannot be placed on a track.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: Uuid,
    pub kind: AssetKind,
    pub display_name: String,
    pub source: SourceHandle,
    pub duration: Time,
}

// ---------------------------------------------------------------------------
// Effects and transitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EffectKind {
    Brightness,
    Contrast,
    Grayscale,
}

impl EffectKind {
    pub fn css_name(&self) -> &'static str {
        match self {
            EffectKind::Brightness => "brightness",
            EffectKind::Contrast => "contrast",
            EffectKind::Grayscale => "grayscale",
        }
    }

    /// The percentage value at which the effect is a visual no-op.
    pub fn neutral_value(&self) -> f64 {
        match self {
            EffectKind::Brightness | EffectKind::Contrast => 100.0,
            EffectKind::Grayscale => 0.0,
        }
    }
}

/// A single filter applied to a clip. At most one per kind per clip;
/// re-applying a kind replaces the value in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    pub id: Uuid,
    pub kind: EffectKind,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransitionKind {
    FadeIn,
    FadeOut,
    WipeLeft,
    WipeRight,
}

/// A time-windowed visual effect at one edge of a clip.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    pub duration: Time,
}

/// Which end of a clip a transition sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEdge {
    Intro,
    Outro,
}

// ---------------------------------------------------------------------------
// Clips
// ---------------------------------------------------------------------------

/// Styling for synthetic text clips. Position is in percent of the frame,
/// rendered with a centered anchor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextStyle {
    pub font_size: u32,
    pub color: String,
    pub background: String,
    pub position: [f64; 2],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 5,
            color: "#ffffff".to_string(),
            background: "rgba(0,0,0,0.5)".to_string(),
            position: [50.0, 50.0],
        }
    }
}

/// What a clip plays back: a window into an ingested asset, or synthetic text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ClipContent {
    Asset { asset_id: Uuid },
    Text { text: String, style: TextStyle },
}

/// A time-bounded placement on a track.
///
/// `instance_id` is the sole identity used for lookup, selection, and
/// editing; `id` is the creation-time identifier and survives split and
/// duplicate for traceability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub instance_id: Uuid,
    pub track_id: Uuid,
    /// Position on the timeline. Always >= 0.
    pub start: Time,
    /// In-point of the source window.
    pub trim_in: Time,
    /// Out-point of the source window. `trim_out - trim_in` is the duration.
    pub trim_out: Time,
    pub effects: Vec<Effect>,
    pub transition_in: Option<Transition>,
    pub transition_out: Option<Transition>,
    pub content: ClipContent,
}

impl Clip {
    pub fn duration(&self) -> Time {
        self.trim_out - self.trim_in
    }

    pub fn end(&self) -> Time {
        self.start + self.duration()
    }

    /// Half-open containment: `[start, end)`.
    pub fn contains(&self, t: Time) -> bool {
        self.start <= t && t < self.end()
    }

    pub fn asset_id(&self) -> Option<Uuid> {
        match &self.content {
            ClipContent::Asset { asset_id } => Some(*asset_id),
            ClipContent::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, ClipContent::Text { .. })
    }

    pub fn effect(&self, kind: EffectKind) -> Option<&Effect> {
        self.effects.iter().find(|e| e.kind == kind)
    }
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
    Text,
}

impl TrackKind {
    /// Video tracks take video and still images; audio tracks take audio.
    /// Text tracks hold only synthetic clips and accept no asset at all.
    pub fn accepts(&self, kind: AssetKind) -> bool {
        matches!(
            (self, kind),
            (TrackKind::Video, AssetKind::Video)
                | (TrackKind::Video, AssetKind::Image)
                | (TrackKind::Audio, AssetKind::Audio)
        )
    }
}

/// An ordered lane of clips of a single kind. Clips are kept sorted by
/// `start`; overlapping siblings are permitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub kind: TrackKind,
    pub(crate) clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            clips: Vec::new(),
        }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// The track/clip graph. Pure data; all mutation goes through the clip
/// editor so that every change is versioned by the history manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub(crate) tracks: Vec<Track>,
}

impl Timeline {
    pub fn new() -> Self {
        Self { tracks: Vec::new() }
    }

    /// The lanes a fresh editing session starts from: one video, one audio,
    /// one text track.
    pub fn with_standard_tracks() -> Self {
        Self {
            tracks: vec![
                Track::new(TrackKind::Video),
                Track::new(TrackKind::Audio),
                Track::new(TrackKind::Text),
            ],
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn track_of_kind(&self, kind: TrackKind) -> Option<&Track> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn find_clip(&self, instance_id: Uuid) -> Option<&Clip> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .find(|c| c.instance_id == instance_id)
    }

    /// Latest clip end across all tracks, floored at [`MIN_TIMELINE_VIEW`]
    /// so an empty timeline still has a usable ruler.
    pub fn total_duration(&self) -> Time {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.end())
            .max()
            .unwrap_or(Time::ZERO)
            .max(MIN_TIMELINE_VIEW)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Effects and transition resolution.
//!
//! `resolve` is a pure function of (clip, time) to the visual parameters a
//! renderer needs: a filter chain, an opacity, a reveal rectangle for wipes,
//! and an anchor for text clips. The transition windows sit at opposite ends
//! of the clip; fade kinds drive opacity and wipe kinds drive the rectangle,
//! with the edge deciding reveal versus conceal. When a clip is shorter than
//! the sum of its transition durations the windows overlap and the outro is
//! applied on top.

use crate::types::{Clip, ClipContent, Time, Transition, TransitionKind};
use serde::{Deserialize, Serialize};

/// Horizontal insets as fractions of the clip's frame, `0.0` = no conceal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClipRect {
    pub inset_left: f64,
    pub inset_right: f64,
}

impl ClipRect {
    pub const FULL: Self = Self {
        inset_left: 0.0,
        inset_right: 0.0,
    };

    pub fn is_full(&self) -> bool {
        self.inset_left == 0.0 && self.inset_right == 0.0
    }
}

/// Resolved visual parameters for one clip at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedStyle {
    /// CSS-equivalent filter chain, effects in insertion order. Empty when
    /// the clip carries no effects.
    pub filter: String,
    pub opacity: f64,
    pub clip_rect: ClipRect,
    /// Text clips: position anchor in percent of the frame.
    pub anchor: Option<[f64; 2]>,
}

/// Progress of a transition window, clamped to `[0, 1]`. A degenerate
/// zero-length window is always complete.
pub fn progress(now: Time, window_start: Time, duration: Time) -> f64 {
    if duration <= Time::ZERO {
        return 1.0;
    }
    ((now - window_start).as_secs() / duration.as_secs()).clamp(0.0, 1.0)
}

pub fn resolve(clip: &Clip, now: Time) -> ResolvedStyle {
    let mut style = ResolvedStyle {
        filter: filter_chain(clip),
        opacity: 1.0,
        clip_rect: ClipRect::FULL,
        anchor: match &clip.content {
            ClipContent::Text { style, .. } => Some(style.position),
            ClipContent::Asset { .. } => None,
        },
    };

    if let Some(t) = clip.transition_in {
        apply_intro(&mut style, t, clip, now);
    }
    if let Some(t) = clip.transition_out {
        apply_outro(&mut style, t, clip, now);
    }
    style
}

fn filter_chain(clip: &Clip) -> String {
    clip.effects
        .iter()
        .map(|e| format!("{}({}%)", e.kind.css_name(), e.value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn apply_intro(style: &mut ResolvedStyle, t: Transition, clip: &Clip, now: Time) {
    let window_end = clip.start + t.duration;
    if now < clip.start || now >= window_end {
        return;
    }
    let p = progress(now, clip.start, t.duration);
    match t.kind {
        TransitionKind::FadeIn | TransitionKind::FadeOut => style.opacity = p,
        TransitionKind::WipeLeft => style.clip_rect.inset_right = 1.0 - p,
        TransitionKind::WipeRight => style.clip_rect.inset_left = 1.0 - p,
    }
}

fn apply_outro(style: &mut ResolvedStyle, t: Transition, clip: &Clip, now: Time) {
    let window_start = clip.end() - t.duration;
    if now < window_start || now >= clip.end() {
        return;
    }
    let p = progress(now, window_start, t.duration);
    match t.kind {
        TransitionKind::FadeIn | TransitionKind::FadeOut => style.opacity = 1.0 - p,
        TransitionKind::WipeLeft => style.clip_rect.inset_left = p,
        TransitionKind::WipeRight => style.clip_rect.inset_right = p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use uuid::Uuid;

    fn clip_at(start: f64, duration: f64) -> Clip {
        Clip {
            id: Uuid::new_v4(),
            instance_id: Uuid::new_v4(),
            track_id: Uuid::new_v4(),
            start: Time::from_secs(start),
            trim_in: Time::ZERO,
            trim_out: Time::from_secs(duration),
            effects: vec![],
            transition_in: None,
            transition_out: None,
            content: ClipContent::Asset {
                asset_id: Uuid::new_v4(),
            },
        }
    }

    fn fade(kind: TransitionKind, secs: f64) -> Transition {
        Transition {
            kind,
            duration: Time::from_secs(secs),
        }
    }

    #[test]
    fn bare_clip_resolves_to_identity() {
        let clip = clip_at(0.0, 10.0);
        let style = resolve(&clip, Time::from_secs(5.0));
        assert_eq!(style.filter, "");
        assert_eq!(style.opacity, 1.0);
        assert!(style.clip_rect.is_full());
        assert_eq!(style.anchor, None);
    }

    #[test]
    fn filter_chain_in_insertion_order() {
        let mut clip = clip_at(0.0, 10.0);
        clip.effects.push(Effect {
            id: Uuid::new_v4(),
            kind: EffectKind::Brightness,
            value: 120.0,
        });
        clip.effects.push(Effect {
            id: Uuid::new_v4(),
            kind: EffectKind::Grayscale,
            value: 50.0,
        });
        let style = resolve(&clip, Time::from_secs(5.0));
        assert_eq!(style.filter, "brightness(120%) grayscale(50%)");
    }

    #[test]
    fn fade_in_ramps_opacity() {
        let mut clip = clip_at(2.0, 10.0);
        clip.transition_in = Some(fade(TransitionKind::FadeIn, 2.0));

        assert_eq!(resolve(&clip, Time::from_secs(2.0)).opacity, 0.0);
        assert!((resolve(&clip, Time::from_secs(3.0)).opacity - 0.5).abs() < 1e-9);
        // Past the window the clip is fully opaque again.
        assert_eq!(resolve(&clip, Time::from_secs(4.0)).opacity, 1.0);
        assert_eq!(resolve(&clip, Time::from_secs(8.0)).opacity, 1.0);
    }

    #[test]
    fn fade_out_ramps_down_in_final_window() {
        let mut clip = clip_at(0.0, 10.0);
        clip.transition_out = Some(fade(TransitionKind::FadeOut, 2.0));

        assert_eq!(resolve(&clip, Time::from_secs(7.0)).opacity, 1.0);
        assert_eq!(resolve(&clip, Time::from_secs(8.0)).opacity, 1.0 - 0.0);
        assert!((resolve(&clip, Time::from_secs(9.0)).opacity - 0.5).abs() < 1e-9);
        assert!((resolve(&clip, Time::from_secs(9.9)).opacity - 0.05).abs() < 1e-9);
    }

    #[test]
    fn wipe_left_intro_reveals_left_to_right() {
        let mut clip = clip_at(0.0, 10.0);
        clip.transition_in = Some(fade(TransitionKind::WipeLeft, 4.0));

        let style = resolve(&clip, Time::from_secs(1.0));
        assert_eq!(style.clip_rect.inset_left, 0.0);
        assert!((style.clip_rect.inset_right - 0.75).abs() < 1e-9);
        assert_eq!(style.opacity, 1.0);

        assert!(resolve(&clip, Time::from_secs(4.0)).clip_rect.is_full());
    }

    #[test]
    fn wipe_right_intro_reveals_right_to_left() {
        let mut clip = clip_at(0.0, 10.0);
        clip.transition_in = Some(fade(TransitionKind::WipeRight, 4.0));

        let style = resolve(&clip, Time::from_secs(3.0));
        assert!((style.clip_rect.inset_left - 0.25).abs() < 1e-9);
        assert_eq!(style.clip_rect.inset_right, 0.0);
    }

    #[test]
    fn wipe_outro_conceals() {
        let mut clip = clip_at(0.0, 10.0);
        clip.transition_out = Some(fade(TransitionKind::WipeLeft, 2.0));

        let style = resolve(&clip, Time::from_secs(9.0));
        assert!((style.clip_rect.inset_left - 0.5).abs() < 1e-9);
        assert_eq!(style.clip_rect.inset_right, 0.0);

        // Before the window: untouched.
        assert!(resolve(&clip, Time::from_secs(5.0)).clip_rect.is_full());
    }

    #[test]
    fn intro_and_outro_do_not_interact_on_long_clip() {
        let mut clip = clip_at(0.0, 10.0);
        clip.transition_in = Some(fade(TransitionKind::FadeIn, 1.0));
        clip.transition_out = Some(fade(TransitionKind::FadeOut, 1.0));

        assert!((resolve(&clip, Time::from_secs(0.5)).opacity - 0.5).abs() < 1e-9);
        assert_eq!(resolve(&clip, Time::from_secs(5.0)).opacity, 1.0);
        assert!((resolve(&clip, Time::from_secs(9.5)).opacity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn progress_is_clamped() {
        let start = Time::from_secs(5.0);
        let dur = Time::from_secs(2.0);
        assert_eq!(progress(Time::from_secs(4.0), start, dur), 0.0);
        assert!((progress(Time::from_secs(5.5), start, dur) - 0.25).abs() < 1e-9);
        assert_eq!(progress(Time::from_secs(10.0), start, dur), 1.0);
    }

    #[test]
    fn zero_duration_window_is_complete() {
        assert_eq!(progress(Time::from_secs(1.0), Time::ZERO, Time::ZERO), 1.0);
    }

    #[test]
    fn text_clip_exposes_anchor() {
        let clip = Clip {
            content: ClipContent::Text {
                text: "Title".into(),
                style: TextStyle {
                    position: [25.0, 75.0],
                    ..TextStyle::default()
                },
            },
            ..clip_at(0.0, 5.0)
        };
        let style = resolve(&clip, Time::from_secs(1.0));
        assert_eq!(style.anchor, Some([25.0, 75.0]));
    }

    #[test]
    fn outro_window_is_exclusive_of_clip_end() {
        let mut clip = clip_at(0.0, 10.0);
        clip.transition_out = Some(fade(TransitionKind::FadeOut, 2.0));
        // At the exact end of the clip the window no longer applies.
        assert_eq!(resolve(&clip, Time::from_secs(10.0)).opacity, 1.0);
    }
}

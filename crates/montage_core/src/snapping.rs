//! Edge snapping for drag interactions.

use crate::types::{Time, Timeline};
use uuid::Uuid;

/// Find the nearest snap point within the threshold.
/// Returns the snapped position if within threshold, otherwise the original.
pub fn find_snap_point(position: Time, snap_points: &[Time], threshold: Time) -> Time {
    let mut best = position;
    let mut best_dist = threshold.0 + 1;

    for &point in snap_points {
        let dist = (position.0 - point.0).abs();
        if dist < best_dist {
            best = point;
            best_dist = dist;
        }
    }

    if best_dist <= threshold.0 {
        best
    } else {
        position
    }
}

/// Collect all snap points from a timeline: clip edges across every track,
/// plus zero. The dragged clip's own edges are excluded.
pub fn collect_snap_points(timeline: &Timeline, exclude_instance: Option<Uuid>) -> Vec<Time> {
    let mut points = vec![Time::ZERO];

    for track in timeline.tracks() {
        for clip in track.clips() {
            if Some(clip.instance_id) == exclude_instance {
                continue;
            }
            points.push(clip.start);
            points.push(clip.end());
        }
    }

    points.sort();
    points.dedup();
    points
}

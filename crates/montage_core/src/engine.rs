//! The public editing surface.
//!
//! `Engine` owns the registry, the live timeline, the snapshot history, the
//! selection, and the drag machine. Every mutation is applied to a scratch
//! clone and committed through the history; a mutation the model refuses is
//! downgraded to a silent no-op (the contract of every operation here is
//! "always succeeds, may be a no-op"). Each method returns whether the model
//! actually changed.

use crate::assets::AssetRegistry;
use crate::drag::{DragKind, DragState};
use crate::error::EditError;
use crate::history::{History, DEFAULT_HISTORY_DEPTH};
use crate::types::*;
use uuid::Uuid;

pub struct Engine {
    registry: AssetRegistry,
    timeline: Timeline,
    history: History,
    selection: Option<Uuid>,
    drag: DragState,
}

impl Engine {
    pub fn new() -> Self {
        let timeline = Timeline::with_standard_tracks();
        Self {
            history: History::new(timeline.clone(), DEFAULT_HISTORY_DEPTH),
            timeline,
            registry: AssetRegistry::new(),
            selection: None,
            drag: DragState::new(),
        }
    }

    // -- read surface --------------------------------------------------------

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selection
    }

    /// The full record of the selected clip, for the inspector.
    pub fn selected_clip(&self) -> Option<&Clip> {
        self.selection.and_then(|id| self.timeline.find_clip(id))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // -- assets --------------------------------------------------------------

    pub fn register_asset(
        &mut self,
        kind: AssetKind,
        display_name: impl Into<String>,
        source: SourceHandle,
    ) -> Uuid {
        self.registry.register(kind, display_name, source)
    }

    pub fn resolve_asset(&mut self, id: Uuid, duration: Option<Time>) {
        self.registry.complete_resolution(id, duration);
    }

    // -- selection -----------------------------------------------------------

    /// Select a clip (or clear with `None`). Selecting an unknown instance
    /// clears the selection.
    pub fn select(&mut self, instance_id: Option<Uuid>) {
        self.selection = instance_id.filter(|id| self.timeline.find_clip(*id).is_some());
    }

    // -- clip operations -----------------------------------------------------

    pub fn place_clip(&mut self, asset_id: Uuid, track_id: Uuid, start: Time) -> bool {
        let Some(asset) = self.registry.get(asset_id).cloned() else {
            return self.reject("place_clip", EditError::AssetNotFound(asset_id));
        };
        let mut next = self.timeline.clone();
        match next.place_clip(&asset, track_id, start) {
            Ok(_) => self.apply("place_clip", next),
            Err(e) => self.reject("place_clip", e),
        }
    }

    /// Create a text clip and select it.
    pub fn add_text_clip(
        &mut self,
        text: impl Into<String>,
        start: Time,
        duration: Time,
        transition_in: Option<Transition>,
        transition_out: Option<Transition>,
    ) -> bool {
        let mut next = self.timeline.clone();
        match next.add_text_clip(text.into(), start, duration, transition_in, transition_out) {
            Ok(instance_id) => {
                let applied = self.apply("add_text_clip", next);
                if applied {
                    self.selection = Some(instance_id);
                }
                applied
            }
            Err(e) => self.reject("add_text_clip", e),
        }
    }

    pub fn move_clip(&mut self, instance_id: Uuid, new_start: Time) -> bool {
        let mut next = self.timeline.clone();
        match next.move_clip(instance_id, new_start) {
            Ok(()) => self.apply("move_clip", next),
            Err(e) => self.reject("move_clip", e),
        }
    }

    pub fn trim_in(&mut self, instance_id: Uuid, delta: Time) -> bool {
        let limit = self.source_limit(instance_id);
        let mut next = self.timeline.clone();
        match next.trim_clip_in(instance_id, delta, limit) {
            Ok(()) => self.apply("trim_in", next),
            Err(e) => self.reject("trim_in", e),
        }
    }

    pub fn trim_out(&mut self, instance_id: Uuid, delta: Time) -> bool {
        let limit = self.source_limit(instance_id);
        let mut next = self.timeline.clone();
        match next.trim_clip_out(instance_id, delta, limit) {
            Ok(()) => self.apply("trim_out", next),
            Err(e) => self.reject("trim_out", e),
        }
    }

    pub fn split_clip(&mut self, instance_id: Uuid, at: Time) -> bool {
        let mut next = self.timeline.clone();
        match next.split_clip(instance_id, at) {
            Ok(_) => self.apply("split_clip", next),
            Err(e) => self.reject("split_clip", e),
        }
    }

    pub fn duplicate_clip(&mut self, instance_id: Uuid) -> bool {
        let mut next = self.timeline.clone();
        match next.duplicate_clip(instance_id) {
            Ok(_) => self.apply("duplicate_clip", next),
            Err(e) => self.reject("duplicate_clip", e),
        }
    }

    pub fn delete_clip(&mut self, instance_id: Uuid) -> bool {
        let mut next = self.timeline.clone();
        match next.delete_clip(instance_id) {
            Ok(_) => {
                let applied = self.apply("delete_clip", next);
                if applied && self.selection == Some(instance_id) {
                    self.selection = None;
                }
                applied
            }
            Err(e) => self.reject("delete_clip", e),
        }
    }

    pub fn set_effect(&mut self, instance_id: Uuid, kind: EffectKind, value: f64) -> bool {
        let mut next = self.timeline.clone();
        match next.set_effect(instance_id, kind, value) {
            Ok(()) => self.apply("set_effect", next),
            Err(e) => self.reject("set_effect", e),
        }
    }

    pub fn clear_effect(&mut self, instance_id: Uuid, kind: EffectKind) -> bool {
        let mut next = self.timeline.clone();
        match next.clear_effect(instance_id, kind) {
            Ok(()) => self.apply("clear_effect", next),
            Err(e) => self.reject("clear_effect", e),
        }
    }

    pub fn set_transition(
        &mut self,
        instance_id: Uuid,
        edge: TransitionEdge,
        transition: Option<Transition>,
    ) -> bool {
        let mut next = self.timeline.clone();
        match next.set_transition(instance_id, edge, transition) {
            Ok(()) => self.apply("set_transition", next),
            Err(e) => self.reject("set_transition", e),
        }
    }

    // -- keyboard conveniences ----------------------------------------------

    pub fn delete_selected(&mut self) -> bool {
        match self.selection {
            Some(id) => self.delete_clip(id),
            None => false,
        }
    }

    pub fn duplicate_selected(&mut self) -> bool {
        match self.selection {
            Some(id) => self.duplicate_clip(id),
            None => false,
        }
    }

    // -- history -------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let snapshot = self.history.undo().cloned();
        match snapshot {
            Some(s) => {
                self.timeline = s;
                self.prune_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let snapshot = self.history.redo().cloned();
        match snapshot {
            Some(s) => {
                self.timeline = s;
                self.prune_selection();
                true
            }
            None => false,
        }
    }

    // -- drag ----------------------------------------------------------------

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Pointer-down on a clip. Selects it and opens the drag.
    pub fn begin_drag(&mut self, kind: DragKind, instance_id: Uuid, pointer: Time) -> bool {
        let started = self.drag.begin(&self.timeline, kind, instance_id, pointer);
        if started {
            self.selection = Some(instance_id);
        }
        started
    }

    /// Pointer-move. Updates the live model only; no history entry.
    pub fn update_drag(&mut self, pointer: Time) -> bool {
        let limit = self
            .drag
            .instance_id()
            .and_then(|id| self.source_limit(id));
        self.drag.update(&mut self.timeline, pointer, limit)
    }

    /// Pointer-up. Commits the whole gesture as at most one history entry.
    pub fn end_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(_) => self.history.record(self.timeline.clone()),
            None => false,
        }
    }

    /// Abort the gesture and restore the pre-drag model. No history entry.
    pub fn cancel_drag(&mut self) -> bool {
        match self.drag.take() {
            Some(capture) => {
                self.timeline = capture.before;
                true
            }
            None => false,
        }
    }

    // -- internals -----------------------------------------------------------

    fn apply(&mut self, op: &str, next: Timeline) -> bool {
        let changed = self.history.record(next.clone());
        if changed {
            self.timeline = next;
            tracing::debug!(op, "edit applied");
        }
        changed
    }

    fn reject(&self, op: &str, err: EditError) -> bool {
        tracing::debug!(op, error = %err, "edit rejected");
        false
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selection {
            if self.timeline.find_clip(id).is_none() {
                self.selection = None;
            }
        }
    }

    /// Upper trim bound: the asset duration for asset-backed clips, none for
    /// text.
    fn source_limit(&self, instance_id: Uuid) -> Option<Time> {
        self.timeline
            .find_clip(instance_id)
            .and_then(|c| c.asset_id())
            .and_then(|asset_id| self.registry.duration_of(asset_id))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

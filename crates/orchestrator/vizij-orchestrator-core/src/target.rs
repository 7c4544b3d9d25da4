//! Render targets and their registry.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use vizij_binding::BindingContext;

/// An external consumer that turns engine state into pixels.
///
/// Targets never call back into the binding graph while advancing; the
/// orchestrator sequences them around notification delivery.
pub trait RenderTarget {
    /// Advance the target's animation state by `dt` seconds. Returns whether
    /// anything moved.
    fn advance(&mut self, dt: f32) -> bool;

    /// Whether the target wants [`RenderTarget::prepare_render`] this frame.
    fn needs_redraw(&self) -> bool {
        true
    }

    /// Prepare drawing from current state. Runs after notifications for the
    /// frame have been delivered.
    fn prepare_render(&mut self, ctx: &BindingContext);

    /// Name used in logs.
    fn label(&self) -> &str {
        "target"
    }
}

/// How a target's advance phase is driven.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpdateMode {
    /// Advanced by the orchestrator every frame.
    #[default]
    Auto,
    /// Ticked by the host, which reports ticks through
    /// [`crate::Orchestrator::notify_manual_tick`] or
    /// [`crate::Orchestrator::advance_manual`].
    Manual,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(pub u32);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target#{}", self.0)
    }
}

pub(crate) struct TargetEntry {
    pub target: Box<dyn RenderTarget>,
    pub mode: UpdateMode,
}

impl fmt::Debug for TargetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetEntry")
            .field("label", &self.target.label())
            .field("mode", &self.mode)
            .finish()
    }
}

/// Targets in registration order.
#[derive(Debug, Default)]
pub(crate) struct TargetRegistry {
    entries: IndexMap<TargetId, TargetEntry>,
    next_id: u32,
}

impl TargetRegistry {
    pub fn insert(&mut self, target: Box<dyn RenderTarget>, mode: UpdateMode) -> TargetId {
        let id = TargetId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.insert(id, TargetEntry { target, mode });
        id
    }

    pub fn remove(&mut self, id: TargetId) -> Option<TargetEntry> {
        self.entries.shift_remove(&id)
    }

    pub fn get_mut(&mut self, id: TargetId) -> Option<&mut TargetEntry> {
        self.entries.get_mut(&id)
    }

    pub fn get(&self, id: TargetId) -> Option<&TargetEntry> {
        self.entries.get(&id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&TargetId, &mut TargetEntry)> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn ids(&self) -> Vec<TargetId> {
        self.entries.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

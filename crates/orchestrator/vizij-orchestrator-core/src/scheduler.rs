//! Frame phases.
//!
//! A frame runs in two scheduler ticks:
//!   tick 1: Advance (auto targets) -> Notify (capture + flush)
//!   tick 2: RenderPrepare (every target that wants a redraw)
//!
//! Notify only polls the callback hub when something advanced or a manual
//! target reported a tick. Render-prepare runs regardless, so resizes and
//! re-registrations are serviced on idle frames too.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::target::UpdateMode;
use crate::Orchestrator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Advance,
    Notify,
    RenderPrepare,
}

impl Phase {
    /// Execution order within a frame.
    pub const ORDER: [Phase; 3] = [Phase::Advance, Phase::Notify, Phase::RenderPrepare];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Advance => "advance",
            Phase::Notify => "notify",
            Phase::RenderPrepare => "render_prepare",
        }
    }
}

/// Outcome of the first tick of a frame ([`Orchestrator::update`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub epoch: u64,
    /// Auto targets whose advance reported movement.
    pub advanced_targets: usize,
    /// Manual ticks reported since the previous notify phase.
    pub manual_ticks: u32,
    /// Whether the capture step found changed properties.
    pub captured: bool,
    /// Callbacks invoked by the flush step.
    pub notified: usize,
    pub advance_ms: f32,
    pub notify_ms: f32,
}

impl UpdateReport {
    /// Whether the notify phase had a reason to poll.
    pub fn ran_notify(&self) -> bool {
        self.advanced_targets > 0 || self.manual_ticks > 0
    }
}

fn elapsed_ms(start: Option<Instant>) -> f32 {
    start.map_or(0.0, |s| s.elapsed().as_secs_f32() * 1000.0)
}

/// Advance every auto target. Returns how many reported movement.
pub fn run_advance(orchestrator: &mut Orchestrator, dt: f32) -> usize {
    let mut advanced = 0;
    for (id, entry) in orchestrator.targets.iter_mut() {
        if entry.mode != UpdateMode::Auto {
            continue;
        }
        if entry.target.advance(dt) {
            advanced += 1;
        } else {
            log::trace!("{id} ({}) idle", entry.target.label());
        }
    }
    advanced
}

/// Capture and flush when the advance phase (or a manual tick) may have
/// changed engine state. Returns `(captured, callbacks fired)`.
pub fn run_notify(orchestrator: &mut Orchestrator, advanced: bool) -> (bool, usize) {
    if !advanced {
        return (false, 0);
    }
    let binding = &mut orchestrator.binding;
    if binding.capture_changes() {
        (true, binding.flush_captured())
    } else {
        (false, 0)
    }
}

/// Prepare rendering for every target that wants a redraw. Returns how
/// many were prepared.
pub fn run_render_prepare(orchestrator: &mut Orchestrator) -> usize {
    let every_frame = orchestrator.config.render_every_frame;
    let binding = &orchestrator.binding;
    let mut rendered = 0;
    for (_, entry) in orchestrator.targets.iter_mut() {
        if every_frame || entry.target.needs_redraw() {
            entry.target.prepare_render(binding);
            rendered += 1;
        }
    }
    rendered
}

/// First scheduler tick: advance, then notify.
pub fn run_update(orchestrator: &mut Orchestrator, dt: f32) -> UpdateReport {
    let timed = orchestrator.config.diagnostics.enabled;
    orchestrator.epoch = orchestrator.epoch.wrapping_add(1);

    let start = timed.then(Instant::now);
    let advanced_targets = run_advance(orchestrator, dt);
    let advance_ms = elapsed_ms(start);

    let manual_ticks = std::mem::take(&mut orchestrator.pending_manual_ticks);
    let start = timed.then(Instant::now);
    let (captured, notified) =
        run_notify(orchestrator, advanced_targets > 0 || manual_ticks > 0);
    let notify_ms = elapsed_ms(start);

    UpdateReport {
        epoch: orchestrator.epoch,
        advanced_targets,
        manual_ticks,
        captured,
        notified,
        advance_ms,
        notify_ms,
    }
}

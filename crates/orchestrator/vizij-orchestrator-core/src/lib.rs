//! vizij-orchestrator
//!
//! Per-frame scheduler for view-model binding. One `Orchestrator` owns the
//! [`BindingContext`] and the registered render targets and runs every frame
//! in a fixed order:
//!
//! 1. advance auto-updating targets,
//! 2. capture changed properties and flush their callbacks,
//! 3. prepare rendering.
//!
//! Steps 1 and 2 form the first scheduler tick ([`Orchestrator::update`]),
//! step 3 the later one ([`Orchestrator::render`]). [`Orchestrator::step`]
//! runs both. The [`global`] module offers a per-thread singleton with an
//! explicit install/teardown lifecycle.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod global;
pub mod scheduler;
pub mod target;

use std::rc::Rc;
use std::time::Instant;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use vizij_binding::BindingContext;
use vizij_native::NativeEngine;

pub use crate::config::OrchestratorConfig;
pub use crate::diagnostics::DiagnosticsCfg;
pub use crate::error::OrchestratorError;
pub use crate::scheduler::{Phase, UpdateReport};
pub use crate::target::{RenderTarget, TargetId, UpdateMode};

use crate::target::TargetRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorFrame {
    pub epoch: u64,
    pub dt: f32,
    /// Whether any auto target advanced.
    pub advanced: bool,
    pub advanced_targets: usize,
    pub manual_ticks: u32,
    pub captured: bool,
    /// Change callbacks invoked during the notify phase.
    pub notified: usize,
    /// Targets whose render-prepare ran.
    pub rendered: usize,
    pub timings_ms: HashMap<String, f32>,
}

#[derive(Debug)]
pub struct Orchestrator {
    pub epoch: u64,
    pub(crate) config: OrchestratorConfig,
    pub(crate) binding: BindingContext,
    pub(crate) targets: TargetRegistry,
    /// Manual ticks reported since the last notify phase.
    pub(crate) pending_manual_ticks: u32,
}

impl Orchestrator {
    pub fn new(engine: Rc<dyn NativeEngine>) -> Self {
        Self::with_config(engine, OrchestratorConfig::default())
    }

    pub fn with_config(engine: Rc<dyn NativeEngine>, config: OrchestratorConfig) -> Self {
        Self {
            epoch: 0,
            binding: BindingContext::with_config(engine, config.binding.clone()),
            config,
            targets: TargetRegistry::default(),
            pending_manual_ticks: 0,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn binding(&self) -> &BindingContext {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut BindingContext {
        &mut self.binding
    }

    /// Register a render target.
    pub fn add_target<T: RenderTarget + 'static>(&mut self, target: T, mode: UpdateMode) -> TargetId {
        self.add_boxed_target(Box::new(target), mode)
    }

    pub fn add_boxed_target(&mut self, target: Box<dyn RenderTarget>, mode: UpdateMode) -> TargetId {
        let id = self.targets.insert(target, mode);
        log::debug!("registered {id} ({mode:?})");
        id
    }

    pub fn remove_target(&mut self, id: TargetId) -> Option<Box<dyn RenderTarget>> {
        let entry = self.targets.remove(id)?;
        log::debug!("removed {id}");
        Some(entry.target)
    }

    pub fn target_mut(&mut self, id: TargetId) -> Option<&mut (dyn RenderTarget + 'static)> {
        self.targets.get_mut(id).map(|entry| entry.target.as_mut())
    }

    pub fn target_ids(&self) -> Vec<TargetId> {
        self.targets.ids()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn update_mode(&self, id: TargetId) -> Option<UpdateMode> {
        self.targets.get(id).map(|entry| entry.mode)
    }

    pub fn set_update_mode(&mut self, id: TargetId, mode: UpdateMode) -> Result<(), OrchestratorError> {
        let entry = self
            .targets
            .get_mut(id)
            .ok_or(OrchestratorError::UnknownTarget(id))?;
        entry.mode = mode;
        Ok(())
    }

    /// Record that the host ticked a manual target, so the next notify phase
    /// polls for changes.
    pub fn notify_manual_tick(&mut self) {
        self.pending_manual_ticks = self.pending_manual_ticks.saturating_add(1);
    }

    /// Advance a manual target on the host's behalf and record the tick.
    pub fn advance_manual(&mut self, id: TargetId, dt: f32) -> Result<bool, OrchestratorError> {
        let entry = self
            .targets
            .get_mut(id)
            .ok_or(OrchestratorError::UnknownTarget(id))?;
        if entry.mode != UpdateMode::Manual {
            return Err(OrchestratorError::NotManual(id));
        }
        let moved = entry.target.advance(dt);
        self.notify_manual_tick();
        Ok(moved)
    }

    /// First scheduler tick of a frame: advance, then notify.
    pub fn update(&mut self, dt: f32) -> UpdateReport {
        crate::scheduler::run_update(self, dt)
    }

    /// Later scheduler tick: render-prepare. Returns how many targets were
    /// prepared.
    pub fn render(&mut self) -> usize {
        crate::scheduler::run_render_prepare(self)
    }

    /// Run a whole frame and report it.
    pub fn step(&mut self, dt: f32) -> OrchestratorFrame {
        let timed = self.config.diagnostics.enabled;
        let start = timed.then(Instant::now);

        let update = self.update(dt);
        let render_start = timed.then(Instant::now);
        let rendered = self.render();

        let mut timings_ms = HashMap::new();
        if let (Some(start), Some(render_start)) = (start, render_start) {
            timings_ms.insert(
                format!("{}_ms", Phase::Advance.as_str()),
                update.advance_ms,
            );
            timings_ms.insert(format!("{}_ms", Phase::Notify.as_str()), update.notify_ms);
            timings_ms.insert(
                format!("{}_ms", Phase::RenderPrepare.as_str()),
                render_start.elapsed().as_secs_f32() * 1000.0,
            );
            timings_ms.insert(
                "total_ms".to_string(),
                start.elapsed().as_secs_f32() * 1000.0,
            );
        }

        let frame = OrchestratorFrame {
            epoch: update.epoch,
            dt,
            advanced: update.advanced_targets > 0,
            advanced_targets: update.advanced_targets,
            manual_ticks: update.manual_ticks,
            captured: update.captured,
            notified: update.notified,
            rendered,
            timings_ms,
        };
        if self.config.diagnostics.log_frames {
            log::trace!(
                "frame {}: advanced {} notified {} rendered {}",
                frame.epoch,
                frame.advanced_targets,
                frame.notified,
                frame.rendered
            );
        }
        frame
    }

    /// Drop every target and binding wrapper. The orchestrator can be used
    /// again afterwards, starting from epoch 0.
    pub fn reset(&mut self) {
        self.targets.clear();
        self.binding.reset();
        self.epoch = 0;
        self.pending_manual_ticks = 0;
    }
}

//! Per-thread orchestrator singleton.
//!
//! Hosts that drive a single render loop install one orchestrator up front
//! and reach it from anywhere on the same thread. Nothing is created lazily
//! except through [`with_or_init`], and [`teardown`] drops everything so a
//! later install starts clean.

use std::cell::RefCell;

use crate::error::OrchestratorError;
use crate::Orchestrator;

thread_local! {
    static ORCHESTRATOR: RefCell<Option<Orchestrator>> = const { RefCell::new(None) };
}

/// Install `orchestrator` for this thread, returning the one it replaced.
pub fn install(orchestrator: Orchestrator) -> Result<Option<Orchestrator>, OrchestratorError> {
    ORCHESTRATOR.with(|cell| {
        let mut slot = cell.try_borrow_mut().map_err(|_| {
            log::warn!("install called while the orchestrator is borrowed");
            OrchestratorError::Reentrant
        })?;
        Ok(slot.replace(orchestrator))
    })
}

pub fn is_installed() -> bool {
    ORCHESTRATOR.with(|cell| cell.try_borrow().map(|slot| slot.is_some()).unwrap_or(true))
}

/// Run `f` against the installed orchestrator. Returns `None` when nothing
/// is installed or when called from inside another `with`.
pub fn with<R>(f: impl FnOnce(&mut Orchestrator) -> R) -> Option<R> {
    ORCHESTRATOR.with(|cell| {
        let Ok(mut slot) = cell.try_borrow_mut() else {
            log::warn!("orchestrator accessed re-entrantly; ignoring");
            return None;
        };
        slot.as_mut().map(f)
    })
}

/// Like [`with`], installing `init()` first if nothing is installed.
pub fn with_or_init<R>(
    init: impl FnOnce() -> Orchestrator,
    f: impl FnOnce(&mut Orchestrator) -> R,
) -> Result<R, OrchestratorError> {
    ORCHESTRATOR.with(|cell| {
        let mut slot = cell.try_borrow_mut().map_err(|_| {
            log::warn!("orchestrator accessed re-entrantly; ignoring");
            OrchestratorError::Reentrant
        })?;
        let orchestrator = slot.get_or_insert_with(init);
        Ok(f(orchestrator))
    })
}

/// Remove and drop the installed orchestrator. Returns whether one was
/// installed.
pub fn teardown() -> bool {
    let taken = ORCHESTRATOR.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => slot.take(),
        Err(_) => {
            log::warn!("teardown called while the orchestrator is borrowed");
            None
        }
    });
    // Dropping releases native references, which may call back into the
    // engine; keep that outside the borrow.
    match taken {
        Some(orchestrator) => {
            drop(orchestrator);
            log::debug!("orchestrator torn down");
            true
        }
        None => false,
    }
}

//! Native handles and the reference guard that owns them.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::engine::NativeEngine;

/// Opaque, non-owning identifier for engine-side state.
///
/// Handles are plain values: copying one does not take a native reference.
/// Ownership of a reference is expressed by [`NativeRef`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NativeHandle(pub u64);

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns exactly one native reference on a handle.
///
/// `NativeRef` is move-only. Dropping it releases the reference, so every
/// release path (explicit dispose, teardown, stale cleanup) goes through the
/// same destructor and a handle is never released twice by the same owner.
pub struct NativeRef {
    handle: NativeHandle,
    engine: Rc<dyn NativeEngine>,
}

impl NativeRef {
    /// Take ownership of a reference the engine already counted for us, e.g. a
    /// handle returned by [`NativeEngine::property`].
    pub fn adopt(engine: &Rc<dyn NativeEngine>, handle: NativeHandle) -> Self {
        Self {
            handle,
            engine: Rc::clone(engine),
        }
    }

    /// Take a fresh reference on `handle`.
    pub fn retain(engine: &Rc<dyn NativeEngine>, handle: NativeHandle) -> Self {
        engine.retain(handle);
        Self::adopt(engine, handle)
    }

    #[inline]
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    #[inline]
    pub fn engine(&self) -> &Rc<dyn NativeEngine> {
        &self.engine
    }
}

impl Drop for NativeRef {
    fn drop(&mut self) {
        self.engine.release(self.handle);
    }
}

impl fmt::Debug for NativeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeRef").field(&self.handle).finish()
    }
}

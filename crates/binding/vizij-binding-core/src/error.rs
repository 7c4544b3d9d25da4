use thiserror::Error;

use vizij_native::{NativeHandle, PropertyKind};

use crate::ids::{InstanceId, PropertyId};

/// Binding failures. None of these abort the host: the context logs them,
/// records them in [`crate::Diagnostics`] and reports "absent" to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("'{segment}' not found while resolving '{path}'")]
    NotFound { path: String, segment: String },
    #[error("view model '{0}' is not declared by the engine")]
    UnknownViewModel(String),
    #[error("'{path}' is a {actual} property, not {expected}")]
    KindMismatch {
        path: String,
        expected: PropertyKind,
        actual: PropertyKind,
    },
    #[error("native handle {0} is not alive")]
    DeadHandle(NativeHandle),
    #[error("instance {0:?} has been disposed")]
    DisposedInstance(InstanceId),
    #[error("property {0:?} has been disposed")]
    DisposedProperty(PropertyId),
    #[error("{op}: index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },
    #[error("{op} rejected by the native engine: {detail}")]
    Rejected { op: &'static str, detail: String },
    #[error("value does not fit property: {0}")]
    InvalidValue(String),
    #[error("stale native handle {0} dropped from the callback registry")]
    StaleHandle(NativeHandle),
    #[error("{0} is already disposed")]
    AlreadyDisposed(String),
}

impl BindingError {
    /// Housekeeping events that are expected during normal operation and are
    /// only logged at debug level.
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            BindingError::StaleHandle(_) | BindingError::AlreadyDisposed(_)
        )
    }
}

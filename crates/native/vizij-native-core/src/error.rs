use thiserror::Error;

use crate::kind::PropertyKind;

/// Errors produced while loading a view-model file into [`crate::MemoryEngine`].
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("view-model file parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate view model '{0}'")]
    DuplicateViewModel(String),
    #[error("view model '{view_model}' declares '{property}' twice")]
    DuplicateProperty { view_model: String, property: String },
    #[error("property '{view_model}.{property}' references unknown view model '{target}'")]
    UnknownViewModel {
        view_model: String,
        property: String,
        target: String,
    },
    #[error("{kind} property '{view_model}.{property}' must name a view model")]
    MissingViewModel {
        view_model: String,
        property: String,
        kind: PropertyKind,
    },
    #[error("enum property '{view_model}.{property}' references unknown enum '{name}'")]
    UnknownEnum {
        view_model: String,
        property: String,
        name: String,
    },
    #[error("default for '{view_model}.{property}' does not fit a {kind} property")]
    BadDefault {
        view_model: String,
        property: String,
        kind: PropertyKind,
    },
    #[error("nested view models recurse through '{0}'")]
    Recursive(String),
}

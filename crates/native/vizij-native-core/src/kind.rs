use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared kind of a view-model property.
///
/// The set is closed: every native handle maps to exactly one of these, and the
/// binding layer picks the wrapper behaviour by matching on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyKind {
    Number,
    Boolean,
    String,
    Color,
    Enum,
    Trigger,
    List,
    Image,
    Artboard,
    /// Nested view-model instance slot.
    ViewModel,
}

impl PropertyKind {
    /// Kinds that carry a [`crate::PropertyValue`] readable through
    /// [`crate::NativeEngine::value`].
    pub fn has_value(self) -> bool {
        !matches!(self, PropertyKind::List | PropertyKind::ViewModel)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKind::Number => "number",
            PropertyKind::Boolean => "boolean",
            PropertyKind::String => "string",
            PropertyKind::Color => "color",
            PropertyKind::Enum => "enum",
            PropertyKind::Trigger => "trigger",
            PropertyKind::List => "list",
            PropertyKind::Image => "image",
            PropertyKind::Artboard => "artboard",
            PropertyKind::ViewModel => "viewModel",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! The native engine contract.
//!
//! Every call is cheap and synchronous. Functions documented as "+1" return a
//! handle with one native reference already taken on behalf of the caller; the
//! caller must hand it to [`crate::NativeRef::adopt`] (or release it) exactly
//! once.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handle::NativeHandle;
use crate::kind::PropertyKind;
use crate::value::PropertyValue;

/// Name and kind of one property declared by a view model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub kind: PropertyKind,
}

/// Enum metadata shared at file level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

pub trait NativeEngine: fmt::Debug {
    /// Whether the engine still holds the object behind `handle`.
    fn is_alive(&self, handle: NativeHandle) -> bool;

    fn retain(&self, handle: NativeHandle);
    fn release(&self, handle: NativeHandle);

    /// Resolve a named property of an instance. +1
    fn property(&self, instance: NativeHandle, name: &str) -> Option<NativeHandle>;
    fn property_kind(&self, property: NativeHandle) -> Option<PropertyKind>;

    /// Resolve the instance currently held by a nested view-model slot. +1
    fn instance_property(&self, instance: NativeHandle, name: &str) -> Option<NativeHandle>;
    fn view_model_name(&self, instance: NativeHandle) -> Option<String>;

    /// Create a fresh instance of a view model with default values. +1
    fn create_instance(&self, view_model: &str) -> Option<NativeHandle>;
    fn properties(&self, instance: NativeHandle) -> Vec<PropertyDescriptor>;

    fn value(&self, property: NativeHandle) -> Option<PropertyValue>;
    /// Returns `false` when the value's kind does not match the property.
    fn set_value(&self, property: NativeHandle, value: PropertyValue) -> bool;
    fn fire_trigger(&self, property: NativeHandle) -> bool;

    fn has_changed(&self, property: NativeHandle) -> bool;
    fn clear_changed(&self, property: NativeHandle);

    /// Name of the file-level enum an enum property uses, if any.
    fn enum_type(&self, property: NativeHandle) -> Option<String>;
    /// Value domain read directly from an enum property.
    fn enum_values(&self, property: NativeHandle) -> Vec<String>;
    fn file_enums(&self) -> Vec<EnumDefinition>;

    /// Swap the instance held by a nested slot. Fails, leaving the slot
    /// untouched, when the slot is missing or the view models differ.
    fn replace_instance(
        &self,
        instance: NativeHandle,
        name: &str,
        replacement: NativeHandle,
    ) -> bool;

    fn list_len(&self, list: NativeHandle) -> usize;
    /// +1
    fn list_item(&self, list: NativeHandle, index: usize) -> Option<NativeHandle>;
    fn list_insert(&self, list: NativeHandle, index: usize, item: NativeHandle) -> bool;
    fn list_remove_at(&self, list: NativeHandle, index: usize) -> bool;
    fn list_swap(&self, list: NativeHandle, a: usize, b: usize) -> bool;
}

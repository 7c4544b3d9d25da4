//! View-model file schema.
//!
//! A file declares shared enums and a set of view models. JSON form:
//!
//! ```json
//! {
//!   "enums": [{ "name": "Theme", "values": ["light", "dark"] }],
//!   "viewModels": [
//!     { "name": "Stats", "properties": [
//!         { "name": "Score", "kind": "number", "default": 0 },
//!         { "name": "Mode", "kind": "enum", "enumType": "Theme" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! `viewModel` and `list` properties name the view model of the nested
//! instance / list elements. Enum properties either reference a file-level enum
//! through `enumType` or carry private `values`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::SchemaError;
use crate::kind::PropertyKind;
use crate::value::{AssetRef, Color, PropertyValue};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModelFile {
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default)]
    pub view_models: Vec<ViewModelDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewModelDef {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl ViewModelFile {
    pub fn from_json_str(s: &str) -> Result<Self, SchemaError> {
        let file: ViewModelFile = serde_json::from_str(s)?;
        file.validate()?;
        Ok(file)
    }

    pub fn view_model(&self, name: &str) -> Option<&ViewModelDef> {
        self.view_models.iter().find(|vm| vm.name == name)
    }

    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|e| e.name == name)
    }

    /// Check references, duplicate names, defaults, and that nested slots do
    /// not recurse (each nested slot is instantiated eagerly).
    pub fn validate(&self) -> Result<(), SchemaError> {
        for (i, vm) in self.view_models.iter().enumerate() {
            if self.view_models[..i].iter().any(|o| o.name == vm.name) {
                return Err(SchemaError::DuplicateViewModel(vm.name.clone()));
            }
            for (j, prop) in vm.properties.iter().enumerate() {
                if vm.properties[..j].iter().any(|o| o.name == prop.name) {
                    return Err(SchemaError::DuplicateProperty {
                        view_model: vm.name.clone(),
                        property: prop.name.clone(),
                    });
                }
                self.validate_property(vm, prop)?;
            }
        }
        for vm in &self.view_models {
            let mut stack = Vec::new();
            self.check_recursion(&vm.name, &mut stack)?;
        }
        Ok(())
    }

    fn validate_property(&self, vm: &ViewModelDef, prop: &PropertyDef) -> Result<(), SchemaError> {
        match prop.kind {
            PropertyKind::ViewModel | PropertyKind::List => {
                let target = prop
                    .view_model
                    .as_ref()
                    .ok_or_else(|| SchemaError::MissingViewModel {
                        view_model: vm.name.clone(),
                        property: prop.name.clone(),
                        kind: prop.kind,
                    })?;
                if self.view_model(target).is_none() {
                    return Err(SchemaError::UnknownViewModel {
                        view_model: vm.name.clone(),
                        property: prop.name.clone(),
                        target: target.clone(),
                    });
                }
            }
            PropertyKind::Enum => {
                if let Some(name) = &prop.enum_type {
                    if self.enum_def(name).is_none() {
                        return Err(SchemaError::UnknownEnum {
                            view_model: vm.name.clone(),
                            property: prop.name.clone(),
                            name: name.clone(),
                        });
                    }
                }
            }
            _ => {}
        }
        self.initial_value(vm, prop).map(|_| ())
    }

    fn check_recursion<'a>(
        &'a self,
        name: &'a str,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), SchemaError> {
        if stack.contains(&name) {
            return Err(SchemaError::Recursive(name.to_string()));
        }
        stack.push(name);
        if let Some(vm) = self.view_model(name) {
            for prop in &vm.properties {
                if prop.kind == PropertyKind::ViewModel {
                    if let Some(target) = &prop.view_model {
                        self.check_recursion(target, stack)?;
                    }
                }
            }
        }
        stack.pop();
        Ok(())
    }

    /// Value domain of an enum property: the referenced file enum, else the
    /// property's private values.
    pub fn enum_values_for(&self, prop: &PropertyDef) -> Vec<String> {
        if let Some(def) = prop.enum_type.as_deref().and_then(|n| self.enum_def(n)) {
            return def.values.clone();
        }
        prop.values.clone().unwrap_or_default()
    }

    /// Initial native value of a property, applying its JSON default.
    pub fn initial_value(
        &self,
        vm: &ViewModelDef,
        prop: &PropertyDef,
    ) -> Result<Option<PropertyValue>, SchemaError> {
        let bad = || SchemaError::BadDefault {
            view_model: vm.name.clone(),
            property: prop.name.clone(),
            kind: prop.kind,
        };
        let base = PropertyValue::default_for(prop.kind);
        let Some(default) = prop.default.as_ref() else {
            return Ok(base);
        };
        if default.is_null() {
            return Ok(base);
        }
        let value = match prop.kind {
            PropertyKind::Number => PropertyValue::Number(default.as_f64().ok_or_else(bad)? as f32),
            PropertyKind::Boolean => PropertyValue::Boolean(default.as_bool().ok_or_else(bad)?),
            PropertyKind::String => {
                PropertyValue::String(default.as_str().ok_or_else(bad)?.to_string())
            }
            PropertyKind::Color => PropertyValue::Color(parse_color(default).ok_or_else(bad)?),
            PropertyKind::Enum => {
                let domain = self.enum_values_for(prop);
                let index = match default {
                    JsonValue::String(s) => domain.iter().position(|v| v == s),
                    JsonValue::Number(n) => n
                        .as_u64()
                        .map(|i| i as usize)
                        .filter(|i| *i < domain.len()),
                    _ => None,
                };
                PropertyValue::Enum(index.ok_or_else(bad)? as u32)
            }
            PropertyKind::Image => {
                PropertyValue::Image(Some(AssetRef(default.as_u64().ok_or_else(bad)? as u32)))
            }
            PropertyKind::Artboard => {
                PropertyValue::Artboard(Some(AssetRef(default.as_u64().ok_or_else(bad)? as u32)))
            }
            PropertyKind::Trigger | PropertyKind::List | PropertyKind::ViewModel => {
                return Err(bad())
            }
        };
        Ok(Some(value))
    }
}

/// Accepts `"#RRGGBB"`, `"#AARRGGBB"` or a packed ARGB integer.
fn parse_color(v: &JsonValue) -> Option<Color> {
    match v {
        JsonValue::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(Color),
        JsonValue::String(s) => {
            let hex = s.strip_prefix('#')?;
            let raw = u32::from_str_radix(hex, 16).ok()?;
            match hex.len() {
                6 => Some(Color(0xFF00_0000 | raw)),
                8 => Some(Color(raw)),
                _ => None,
            }
        }
        _ => None,
    }
}

//! MemoryEngine: an in-memory native engine built from a [`ViewModelFile`].
//!
//! Instances and their properties live in one handle space. Nested view-model
//! slots are instantiated eagerly; lists start empty. Every effective value
//! change raises the property's changed flag, whether it came from the host
//! ([`NativeEngine::set_value`]) or from the engine side ([`MemoryEngine::write`]).
//!
//! Reference counts only track references handed out across the boundary;
//! the engine's own ownership of nested objects is not counted.

use std::cell::RefCell;

use hashbrown::HashMap;
use indexmap::IndexMap;

use crate::engine::{EnumDefinition, NativeEngine, PropertyDescriptor};
use crate::error::SchemaError;
use crate::handle::NativeHandle;
use crate::kind::PropertyKind;
use crate::schema::ViewModelFile;
use crate::value::PropertyValue;

#[derive(Debug)]
struct InstanceObject {
    view_model: String,
    properties: IndexMap<String, NativeHandle>,
}

#[derive(Debug)]
enum Slot {
    Value(PropertyValue),
    Instance(Option<NativeHandle>),
    List(Vec<NativeHandle>),
}

#[derive(Debug)]
struct PropertyObject {
    kind: PropertyKind,
    slot: Slot,
    changed: bool,
    enum_type: Option<String>,
    enum_values: Vec<String>,
    /// Declared view model of a nested slot or of list elements.
    element_view_model: Option<String>,
}

#[derive(Debug)]
enum Object {
    Instance(InstanceObject),
    Property(PropertyObject),
}

#[derive(Debug, Default)]
struct MemoryState {
    objects: HashMap<NativeHandle, Object>,
    refs: HashMap<NativeHandle, u32>,
    next_handle: u64,
    over_releases: u32,
}

impl MemoryState {
    fn alloc(&mut self, object: Object) -> NativeHandle {
        self.next_handle += 1;
        let handle = NativeHandle(self.next_handle);
        self.objects.insert(handle, object);
        handle
    }

    fn instance(&self, handle: NativeHandle) -> Option<&InstanceObject> {
        match self.objects.get(&handle) {
            Some(Object::Instance(inst)) => Some(inst),
            _ => None,
        }
    }

    fn prop(&self, handle: NativeHandle) -> Option<&PropertyObject> {
        match self.objects.get(&handle) {
            Some(Object::Property(p)) => Some(p),
            _ => None,
        }
    }

    fn prop_mut(&mut self, handle: NativeHandle) -> Option<&mut PropertyObject> {
        match self.objects.get_mut(&handle) {
            Some(Object::Property(p)) => Some(p),
            _ => None,
        }
    }

    fn named_prop(&self, instance: NativeHandle, name: &str) -> Option<NativeHandle> {
        self.instance(instance)?.properties.get(name).copied()
    }

    fn retain(&mut self, handle: NativeHandle) {
        *self.refs.entry(handle).or_insert(0) += 1;
    }

    fn is_instance_of(&self, handle: NativeHandle, view_model: Option<&str>) -> bool {
        match (self.instance(handle), view_model) {
            (Some(inst), Some(vm)) => inst.view_model == vm,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }
}

#[derive(Debug)]
pub struct MemoryEngine {
    file: ViewModelFile,
    state: RefCell<MemoryState>,
}

impl MemoryEngine {
    pub fn new(file: ViewModelFile) -> Result<Self, SchemaError> {
        file.validate()?;
        Ok(Self {
            file,
            state: RefCell::new(MemoryState::default()),
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self, SchemaError> {
        Self::new(ViewModelFile::from_json_str(s)?)
    }

    pub fn file(&self) -> &ViewModelFile {
        &self.file
    }

    /// Build an instance (and its nested slots) without taking a reference.
    fn instantiate(&self, state: &mut MemoryState, view_model: &str) -> Option<NativeHandle> {
        let def = self.file.view_model(view_model)?;
        let mut properties = IndexMap::with_capacity(def.properties.len());
        for prop in &def.properties {
            let slot = match prop.kind {
                PropertyKind::ViewModel => {
                    let nested = prop
                        .view_model
                        .as_deref()
                        .and_then(|vm| self.instantiate(state, vm));
                    Slot::Instance(nested)
                }
                PropertyKind::List => Slot::List(Vec::new()),
                _ => match self.file.initial_value(def, prop) {
                    Ok(Some(v)) => Slot::Value(v),
                    _ => continue,
                },
            };
            let enum_values = if prop.kind == PropertyKind::Enum {
                self.file.enum_values_for(prop)
            } else {
                Vec::new()
            };
            let handle = state.alloc(Object::Property(PropertyObject {
                kind: prop.kind,
                slot,
                changed: false,
                enum_type: prop.enum_type.clone(),
                enum_values,
                element_view_model: prop.view_model.clone(),
            }));
            properties.insert(prop.name.clone(), handle);
        }
        Some(state.alloc(Object::Instance(InstanceObject {
            view_model: def.name.clone(),
            properties,
        })))
    }

    /// Resolve `"A/B/Prop"` from an instance without taking a reference. A path
    /// ending at a nested slot resolves to the nested instance.
    pub fn lookup(&self, root: NativeHandle, path: &str) -> Option<NativeHandle> {
        let state = self.state.borrow();
        let mut current = root;
        let mut segments = path.split('/').peekable();
        while let Some(segment) = segments.next() {
            let prop = state.named_prop(current, segment)?;
            let obj = state.prop(prop)?;
            match (&obj.slot, segments.peek().is_some()) {
                (Slot::Instance(Some(child)), _) => current = *child,
                (_, false) => return Some(prop),
                _ => return None,
            }
        }
        Some(current)
    }

    /// Engine-side mutation, as a state machine or script would perform it.
    pub fn write(&self, property: NativeHandle, value: PropertyValue) -> bool {
        self.set_value(property, value)
    }

    /// Drop a native object out from under any wrapper that still points at it.
    /// Outstanding references stay counted so late releases remain balanced.
    pub fn destroy(&self, handle: NativeHandle) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(object) = state.objects.remove(&handle) else {
            return false;
        };
        if let Object::Instance(inst) = object {
            for prop in inst.properties.values() {
                state.objects.remove(prop);
            }
        }
        true
    }

    pub fn ref_count(&self, handle: NativeHandle) -> u32 {
        self.state.borrow().refs.get(&handle).copied().unwrap_or(0)
    }

    /// Sum of all references handed out and not yet released.
    pub fn outstanding_refs(&self) -> u32 {
        self.state.borrow().refs.values().sum()
    }

    /// Number of releases that found no outstanding reference.
    pub fn over_releases(&self) -> u32 {
        self.state.borrow().over_releases
    }

    pub fn changed_flag(&self, property: NativeHandle) -> bool {
        self.state
            .borrow()
            .prop(property)
            .map(|p| p.changed)
            .unwrap_or(false)
    }

    pub fn list_items(&self, list: NativeHandle) -> Vec<NativeHandle> {
        match self.state.borrow().prop(list).map(|p| &p.slot) {
            Some(Slot::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }
}

impl NativeEngine for MemoryEngine {
    fn is_alive(&self, handle: NativeHandle) -> bool {
        self.state.borrow().objects.contains_key(&handle)
    }

    fn retain(&self, handle: NativeHandle) {
        self.state.borrow_mut().retain(handle);
    }

    fn release(&self, handle: NativeHandle) {
        let mut state = self.state.borrow_mut();
        match state.refs.get(&handle).copied().unwrap_or(0) {
            0 => {
                state.over_releases += 1;
                log::error!("native release of {handle} without an outstanding reference");
            }
            1 => {
                state.refs.remove(&handle);
            }
            n => {
                state.refs.insert(handle, n - 1);
            }
        }
    }

    fn property(&self, instance: NativeHandle, name: &str) -> Option<NativeHandle> {
        let mut state = self.state.borrow_mut();
        let handle = state.named_prop(instance, name)?;
        state.retain(handle);
        Some(handle)
    }

    fn property_kind(&self, property: NativeHandle) -> Option<PropertyKind> {
        self.state.borrow().prop(property).map(|p| p.kind)
    }

    fn instance_property(&self, instance: NativeHandle, name: &str) -> Option<NativeHandle> {
        let mut state = self.state.borrow_mut();
        let prop = state.named_prop(instance, name)?;
        let child = match state.prop(prop)?.slot {
            Slot::Instance(Some(child)) => child,
            _ => return None,
        };
        state.retain(child);
        Some(child)
    }

    fn view_model_name(&self, instance: NativeHandle) -> Option<String> {
        self.state
            .borrow()
            .instance(instance)
            .map(|i| i.view_model.clone())
    }

    fn create_instance(&self, view_model: &str) -> Option<NativeHandle> {
        let mut state = self.state.borrow_mut();
        let handle = self.instantiate(&mut state, view_model)?;
        state.retain(handle);
        Some(handle)
    }

    fn properties(&self, instance: NativeHandle) -> Vec<PropertyDescriptor> {
        let state = self.state.borrow();
        let Some(inst) = state.instance(instance) else {
            return Vec::new();
        };
        inst.properties
            .iter()
            .filter_map(|(name, h)| {
                state.prop(*h).map(|p| PropertyDescriptor {
                    name: name.clone(),
                    kind: p.kind,
                })
            })
            .collect()
    }

    fn value(&self, property: NativeHandle) -> Option<PropertyValue> {
        match &self.state.borrow().prop(property)?.slot {
            Slot::Value(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn set_value(&self, property: NativeHandle, value: PropertyValue) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(prop) = state.prop_mut(property) else {
            return false;
        };
        if prop.kind != value.kind() {
            return false;
        }
        if let PropertyValue::Enum(index) = value {
            if index as usize >= prop.enum_values.len() {
                return false;
            }
        }
        match &mut prop.slot {
            Slot::Value(current) => {
                if *current != value {
                    *current = value;
                    prop.changed = true;
                }
                true
            }
            _ => false,
        }
    }

    fn fire_trigger(&self, property: NativeHandle) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(prop) = state.prop_mut(property) else {
            return false;
        };
        match &mut prop.slot {
            Slot::Value(PropertyValue::Trigger(count)) => {
                *count = count.wrapping_add(1);
                prop.changed = true;
                true
            }
            _ => false,
        }
    }

    fn has_changed(&self, property: NativeHandle) -> bool {
        self.changed_flag(property)
    }

    fn clear_changed(&self, property: NativeHandle) {
        if let Some(prop) = self.state.borrow_mut().prop_mut(property) {
            prop.changed = false;
        }
    }

    fn enum_type(&self, property: NativeHandle) -> Option<String> {
        self.state.borrow().prop(property)?.enum_type.clone()
    }

    fn enum_values(&self, property: NativeHandle) -> Vec<String> {
        self.state
            .borrow()
            .prop(property)
            .map(|p| p.enum_values.clone())
            .unwrap_or_default()
    }

    fn file_enums(&self) -> Vec<EnumDefinition> {
        self.file
            .enums
            .iter()
            .map(|e| EnumDefinition {
                name: e.name.clone(),
                values: e.values.clone(),
            })
            .collect()
    }

    fn replace_instance(
        &self,
        instance: NativeHandle,
        name: &str,
        replacement: NativeHandle,
    ) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(prop_handle) = state.named_prop(instance, name) else {
            return false;
        };
        let expected = match state.prop(prop_handle) {
            Some(p) if p.kind == PropertyKind::ViewModel => p.element_view_model.clone(),
            _ => return false,
        };
        if !state.is_instance_of(replacement, expected.as_deref()) {
            return false;
        }
        let Some(prop) = state.prop_mut(prop_handle) else {
            return false;
        };
        prop.slot = Slot::Instance(Some(replacement));
        prop.changed = true;
        true
    }

    fn list_len(&self, list: NativeHandle) -> usize {
        match self.state.borrow().prop(list).map(|p| &p.slot) {
            Some(Slot::List(items)) => items.len(),
            _ => 0,
        }
    }

    fn list_item(&self, list: NativeHandle, index: usize) -> Option<NativeHandle> {
        let mut state = self.state.borrow_mut();
        let item = match &state.prop(list)?.slot {
            Slot::List(items) => *items.get(index)?,
            _ => return None,
        };
        state.retain(item);
        Some(item)
    }

    fn list_insert(&self, list: NativeHandle, index: usize, item: NativeHandle) -> bool {
        let mut state = self.state.borrow_mut();
        let element_vm = match state.prop(list) {
            Some(p) if p.kind == PropertyKind::List => p.element_view_model.clone(),
            _ => return false,
        };
        if !state.is_instance_of(item, element_vm.as_deref()) {
            return false;
        }
        let Some(prop) = state.prop_mut(list) else {
            return false;
        };
        match &mut prop.slot {
            Slot::List(items) if index <= items.len() => {
                items.insert(index, item);
                prop.changed = true;
                true
            }
            _ => false,
        }
    }

    fn list_remove_at(&self, list: NativeHandle, index: usize) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(prop) = state.prop_mut(list) else {
            return false;
        };
        match &mut prop.slot {
            Slot::List(items) if index < items.len() => {
                items.remove(index);
                prop.changed = true;
                true
            }
            _ => false,
        }
    }

    fn list_swap(&self, list: NativeHandle, a: usize, b: usize) -> bool {
        let mut state = self.state.borrow_mut();
        let Some(prop) = state.prop_mut(list) else {
            return false;
        };
        match &mut prop.slot {
            Slot::List(items) if a < items.len() && b < items.len() => {
                if a != b {
                    items.swap(a, b);
                    prop.changed = true;
                }
                true
            }
            _ => false,
        }
    }
}

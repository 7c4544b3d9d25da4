//! `BindingContext`: the service that owns every managed wrapper.

use std::rc::Rc;

use hashbrown::HashMap;

use vizij_native::{NativeEngine, NativeHandle, NativeRef, PropertyDescriptor, PropertyKind};

use crate::arena::Arena;
use crate::config::BindingConfig;
use crate::diagnostics::Diagnostics;
use crate::error::BindingError;
use crate::hub::CallbackHub;
use crate::identity::{IdentityCache, Wrapper};
use crate::ids::{InstanceId, PropertyId, SubscriptionId};
use crate::instance::{InstanceNode, Interest};
use crate::path::{PathCache, PropertyPath};
use crate::property::{
    prop, ListState, Property, PropertyChange, PropertyDetail, PropertyNode, PropertyType,
    Subscriber, ValueType,
};

/// Owns the identity cache, the wrapper arenas, the instance graph and the
/// callback hub for one native engine.
///
/// A context is single-threaded (`!Send`): wrappers hold `Rc` engine
/// references and callbacks are plain `FnMut` closures.
#[derive(Debug)]
pub struct BindingContext {
    pub(crate) engine: Rc<dyn NativeEngine>,
    pub(crate) config: BindingConfig,
    pub(crate) identity: IdentityCache,
    pub(crate) instances: Arena<InstanceId, InstanceNode>,
    pub(crate) properties: Arena<PropertyId, PropertyNode>,
    pub(crate) hub: CallbackHub,
    pub(crate) paths: PathCache,
    /// File-level enum domains, loaded on first enum resolution.
    pub(crate) enums: Option<HashMap<String, Rc<[String]>>>,
    pub(crate) diagnostics: Diagnostics,
    next_subscription: u64,
}

impl BindingContext {
    pub fn new(engine: Rc<dyn NativeEngine>) -> Self {
        Self::with_config(engine, BindingConfig::default())
    }

    pub fn with_config(engine: Rc<dyn NativeEngine>, config: BindingConfig) -> Self {
        Self {
            engine,
            identity: IdentityCache::new(),
            instances: Arena::default(),
            properties: Arena::default(),
            hub: CallbackHub::default(),
            paths: PathCache::new(config.path_cache_capacity),
            enums: None,
            diagnostics: Diagnostics::new(config.diagnostics.clone()),
            config,
            next_subscription: 0,
        }
    }

    pub fn engine(&self) -> &Rc<dyn NativeEngine> {
        &self.engine
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn hub(&self) -> &CallbackHub {
        &self.hub
    }

    pub(crate) fn report(&mut self, err: BindingError) {
        self.diagnostics.record(err);
    }

    // ----- host ownership -----

    /// Wrap an instance handle, taking over one native reference the caller
    /// already holds. Returns the existing wrapper when the handle is known.
    pub fn adopt_instance(&mut self, handle: NativeHandle) -> Option<InstanceId> {
        let native = NativeRef::adopt(&self.engine, handle);
        if !self.engine.is_alive(handle) {
            self.report(BindingError::DeadHandle(handle));
            return None;
        }
        let id = self.wrap_instance(native);
        if let Some(node) = self.instances.get_mut(id) {
            node.host_owned = true;
        }
        Some(id)
    }

    /// Create a fresh native instance of `view_model` and wrap it.
    pub fn create_instance(&mut self, view_model: &str) -> Option<InstanceId> {
        match self.engine.create_instance(view_model) {
            Some(handle) => self.adopt_instance(handle),
            None => {
                self.report(BindingError::UnknownViewModel(view_model.to_string()));
                None
            }
        }
    }

    /// Mark an instance reached through navigation as host-owned, so it
    /// outlives its parents.
    pub fn retain_instance(&mut self, id: InstanceId) -> bool {
        match self.instances.get_mut(id) {
            Some(node) => {
                node.host_owned = true;
                true
            }
            None => {
                self.report(BindingError::DisposedInstance(id));
                false
            }
        }
    }

    /// Drop host ownership. An instance that is then unreachable from any
    /// live parent is disposed.
    pub fn release_instance(&mut self, id: InstanceId) -> bool {
        let orphaned = match self.instances.get_mut(id) {
            Some(node) => {
                node.host_owned = false;
                node.parents.is_empty()
            }
            None => {
                self.report(BindingError::DisposedInstance(id));
                return false;
            }
        };
        if orphaned {
            self.dispose_instance(id);
        }
        true
    }

    pub(crate) fn cached_instance(&mut self, handle: NativeHandle) -> Option<InstanceId> {
        match self.identity.lookup(handle)? {
            Wrapper::Instance(id) if self.instances.contains(id) => Some(id),
            stale => {
                self.identity.remove_if(handle, stale);
                None
            }
        }
    }

    pub(crate) fn cached_property(&mut self, handle: NativeHandle) -> Option<PropertyId> {
        match self.identity.lookup(handle)? {
            Wrapper::Property(id) if self.properties.contains(id) => Some(id),
            stale => {
                self.identity.remove_if(handle, stale);
                None
            }
        }
    }

    /// Return the wrapper for `native`'s handle, creating one if needed. A
    /// duplicate reference is released when the handle is already wrapped.
    pub(crate) fn wrap_instance(&mut self, native: NativeRef) -> InstanceId {
        let handle = native.handle();
        if let Some(existing) = self.cached_instance(handle) {
            return existing;
        }
        let view_model = self.engine.view_model_name(handle).unwrap_or_default();
        let id = self.instances.insert(InstanceNode::new(native, view_model));
        self.identity.register(handle, Wrapper::Instance(id));
        log::trace!("wrapped instance {handle} as {id:?}");
        id
    }

    // ----- navigation -----

    pub(crate) fn parse_path(&mut self, path: &str) -> Option<PropertyPath> {
        match self.paths.resolve(path) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn require_instance(&mut self, id: InstanceId) -> Option<&mut InstanceNode> {
        if !self.instances.contains(id) {
            self.report(BindingError::DisposedInstance(id));
            return None;
        }
        self.instances.get_mut(id)
    }

    /// Resolve a nested instance. Every segment names a view-model slot.
    pub fn instance_child(&mut self, instance: InstanceId, path: &str) -> Option<InstanceId> {
        let parsed = self.parse_path(path)?;
        self.require_instance(instance)?;
        let mut current = instance;
        for segment in parsed.segments() {
            current = self.child(current, segment, path)?;
        }
        Some(current)
    }

    /// One navigation hop. Materializes the child wrapper and its parent link
    /// on first use.
    pub(crate) fn child(
        &mut self,
        parent: InstanceId,
        name: &str,
        path: &str,
    ) -> Option<InstanceId> {
        let node = self.require_instance(parent)?;
        let parent_handle = node.handle;
        let cached = node.children.get(name).copied();
        if let Some(cached) = cached {
            if self.instances.contains(cached) {
                return Some(cached);
            }
            if let Some(node) = self.instances.get_mut(parent) {
                node.children.remove(name);
            }
        }
        let Some(raw) = self.engine.instance_property(parent_handle, name) else {
            self.report(BindingError::NotFound {
                path: path.to_string(),
                segment: name.to_string(),
            });
            return None;
        };
        let child = self.wrap_instance(NativeRef::adopt(&self.engine, raw));
        if let Some(node) = self.instances.get_mut(parent) {
            node.children.insert(name.to_string(), child);
        }
        self.link(parent, child);
        Some(child)
    }

    // ----- properties -----

    /// Resolve a property by slash path and expected kind.
    pub fn property<T: PropertyType>(
        &mut self,
        instance: InstanceId,
        path: &str,
    ) -> Option<Property<T>> {
        let parsed = self.parse_path(path)?;
        self.require_instance(instance)?;
        let mut owner = instance;
        for segment in parsed.parents() {
            owner = self.child(owner, segment, path)?;
        }
        self.resolve_property(owner, parsed.leaf(), path, Some(T::KIND))
            .map(Property::from_id)
    }

    /// Resolve a property of any kind. For data-driven hosts (inspectors,
    /// replays) that learn kinds at runtime through [`Self::property_kind`].
    pub fn property_id(&mut self, instance: InstanceId, path: &str) -> Option<PropertyId> {
        let parsed = self.parse_path(path)?;
        self.require_instance(instance)?;
        let mut owner = instance;
        for segment in parsed.parents() {
            owner = self.child(owner, segment, path)?;
        }
        self.resolve_property(owner, parsed.leaf(), path, None)
    }

    /// Reinterpret an untyped id as a typed handle after checking its kind.
    pub fn typed<T: PropertyType>(&self, id: PropertyId) -> Option<Property<T>> {
        (self.properties.get(id)?.kind == T::KIND).then(|| Property::from_id(id))
    }

    fn resolve_property(
        &mut self,
        owner: InstanceId,
        name: &str,
        path: &str,
        expected: Option<PropertyKind>,
    ) -> Option<PropertyId> {
        let node = self.require_instance(owner)?;
        let owner_handle = node.handle;
        let cached = node.properties.get(name).copied();
        if let Some(id) = cached {
            if let Some(kind) = self.properties.get(id).map(|p| p.kind) {
                return self.check_kind(id, kind, expected, path);
            }
        }

        let Some(raw) = self.engine.property(owner_handle, name) else {
            self.report(BindingError::NotFound {
                path: path.to_string(),
                segment: name.to_string(),
            });
            return None;
        };
        let native = NativeRef::adopt(&self.engine, raw);

        if let Some(existing) = self.cached_property(raw) {
            drop(native);
            let kind = self.properties.get(existing).map(|p| p.kind)?;
            if let Some(node) = self.instances.get_mut(owner) {
                node.properties.insert(name.to_string(), existing);
            }
            return self.check_kind(existing, kind, expected, path);
        }

        let Some(actual) = self.engine.property_kind(raw) else {
            self.report(BindingError::DeadHandle(raw));
            return None;
        };
        if let Some(expected) = expected.filter(|e| *e != actual) {
            self.report(BindingError::KindMismatch {
                path: path.to_string(),
                expected,
                actual,
            });
            return None;
        }

        let detail = self.build_detail(actual, raw);
        let id = self
            .properties
            .insert(PropertyNode::new(native, actual, name, owner, detail));
        self.identity.register(raw, Wrapper::Property(id));
        if let Some(node) = self.instances.get_mut(owner) {
            node.properties.insert(name.to_string(), id);
        }
        log::trace!("wrapped {actual} property '{path}' ({raw}) as {id:?}");
        Some(id)
    }

    fn check_kind(
        &mut self,
        id: PropertyId,
        actual: PropertyKind,
        expected: Option<PropertyKind>,
        path: &str,
    ) -> Option<PropertyId> {
        match expected {
            Some(expected) if expected != actual => {
                self.report(BindingError::KindMismatch {
                    path: path.to_string(),
                    expected,
                    actual,
                });
                None
            }
            _ => Some(id),
        }
    }

    fn build_detail(&mut self, kind: PropertyKind, handle: NativeHandle) -> PropertyDetail {
        match kind {
            PropertyKind::Enum => PropertyDetail::Enum {
                domain: self.enum_domain(handle),
            },
            PropertyKind::List => PropertyDetail::List(ListState::default()),
            _ => PropertyDetail::Plain,
        }
    }

    /// Enum properties backed by a file-level enum share one domain.
    fn enum_domain(&mut self, handle: NativeHandle) -> Rc<[String]> {
        if let Some(name) = self.engine.enum_type(handle) {
            let engine = &self.engine;
            let enums = self.enums.get_or_insert_with(|| {
                engine
                    .file_enums()
                    .into_iter()
                    .map(|def| (def.name, Rc::<[String]>::from(def.values)))
                    .collect()
            });
            if let Some(domain) = enums.get(&name) {
                return Rc::clone(domain);
            }
            log::debug!("enum type '{name}' missing from file enums, reading property domain");
        }
        Rc::from(self.engine.enum_values(handle))
    }

    pub(crate) fn require_property(&mut self, id: PropertyId) -> Option<&mut PropertyNode> {
        if !self.properties.contains(id) {
            self.report(BindingError::DisposedProperty(id));
            return None;
        }
        self.properties.get_mut(id)
    }

    // ----- values -----

    /// Current value, read from the engine. `None` once the property is
    /// disposed or its native object is gone.
    pub fn value<T: ValueType>(&self, property: Property<T>) -> Option<T::Value> {
        let node = self.properties.get(property.id())?;
        let raw = self.engine.value(node.handle)?;
        T::decode(raw, node.detail.domain())
    }

    pub fn set_value<T: ValueType>(&mut self, property: Property<T>, value: T::Value) -> bool {
        let Some(node) = self.require_property(property.id()) else {
            return false;
        };
        let handle = node.handle;
        let Some(raw) = T::encode(value, node.detail.domain()) else {
            let err = BindingError::InvalidValue(format!(
                "'{}' does not accept this {} value",
                node.name,
                T::KIND
            ));
            self.report(err);
            return false;
        };
        if self.engine.set_value(handle, raw) {
            true
        } else {
            self.report(BindingError::Rejected {
                op: "set_value",
                detail: format!("{handle}"),
            });
            false
        }
    }

    pub fn fire(&mut self, trigger: Property<prop::Trigger>) -> bool {
        let Some(handle) = self.require_property(trigger.id()).map(|n| n.handle) else {
            return false;
        };
        if self.engine.fire_trigger(handle) {
            true
        } else {
            self.report(BindingError::Rejected {
                op: "fire",
                detail: format!("{handle}"),
            });
            false
        }
    }

    /// Value domain of an enum property.
    pub fn enum_values(&self, property: Property<prop::Enum>) -> Option<Rc<[String]>> {
        match &self.properties.get(property.id())?.detail {
            PropertyDetail::Enum { domain } => Some(Rc::clone(domain)),
            _ => None,
        }
    }

    pub fn enum_index(&self, property: Property<prop::Enum>) -> Option<u32> {
        let node = self.properties.get(property.id())?;
        match self.engine.value(node.handle)? {
            vizij_native::PropertyValue::Enum(i) => Some(i),
            _ => None,
        }
    }

    pub fn set_enum_index(&mut self, property: Property<prop::Enum>, index: u32) -> bool {
        let Some(node) = self.require_property(property.id()) else {
            return false;
        };
        let handle = node.handle;
        let len = node.detail.domain().len();
        if index as usize >= len {
            self.report(BindingError::IndexOutOfRange {
                op: "set_enum_index",
                index: index as usize,
                len,
            });
            return false;
        }
        if self
            .engine
            .set_value(handle, vizij_native::PropertyValue::Enum(index))
        {
            true
        } else {
            self.report(BindingError::Rejected {
                op: "set_enum_index",
                detail: format!("{handle}"),
            });
            false
        }
    }

    // ----- subscriptions -----

    /// Register a change callback. The first subscriber registers the
    /// property with the callback hub and marks its instance chain interested.
    pub fn subscribe<T, F>(&mut self, property: Property<T>, callback: F) -> Option<SubscriptionId>
    where
        T: PropertyType,
        F: FnMut(&mut BindingContext, &PropertyChange) + 'static,
    {
        self.subscribe_id(property.id(), callback)
    }

    /// Untyped form of [`Self::subscribe`].
    pub fn subscribe_id<F>(&mut self, property: PropertyId, callback: F) -> Option<SubscriptionId>
    where
        F: FnMut(&mut BindingContext, &PropertyChange) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        let node = self.require_property(property)?;
        node.subscribers.push(Subscriber {
            id,
            callback: Some(Box::new(callback)),
        });
        let first = node.subscribers.len() == 1;
        let (handle, owner) = (node.handle, node.owner);
        self.next_subscription += 1;
        if first {
            self.hub.register(handle);
            self.register_interest(owner, handle);
        }
        Some(id)
    }

    pub fn unsubscribe<T>(&mut self, property: Property<T>, subscription: SubscriptionId) -> bool {
        let Some(node) = self.properties.get_mut(property.id()) else {
            return false;
        };
        let Some(pos) = node.subscribers.iter().position(|s| s.id == subscription) else {
            return false;
        };
        node.subscribers.remove(pos);
        if node.subscribers.is_empty() {
            self.release_subscription(property.id());
        }
        true
    }

    /// Remove every callback on a property. Returns how many were removed.
    pub fn unsubscribe_all<T>(&mut self, property: Property<T>) -> usize {
        let Some(node) = self.properties.get_mut(property.id()) else {
            return 0;
        };
        let removed = std::mem::take(&mut node.subscribers).len();
        if removed > 0 {
            self.release_subscription(property.id());
        }
        removed
    }

    pub fn subscriber_count<T>(&self, property: Property<T>) -> usize {
        self.properties
            .get(property.id())
            .map_or(0, |n| n.subscribers.len())
    }

    fn release_subscription(&mut self, id: PropertyId) {
        let Some(node) = self.properties.get(id) else {
            return;
        };
        let (handle, owner) = (node.handle, node.owner);
        self.hub.unregister(handle);
        self.hub.captured.shift_remove(&id);
        self.unregister_interest(owner, handle);
    }

    // ----- inspection -----

    pub fn is_alive(&self, instance: InstanceId) -> bool {
        self.instances.contains(instance)
    }

    pub fn is_property_alive(&self, property: PropertyId) -> bool {
        self.properties.contains(property)
    }

    pub fn interest(&self, instance: InstanceId) -> Option<Interest> {
        self.instances.get(instance).map(InstanceNode::interest)
    }

    pub fn is_interested(&self, instance: InstanceId) -> bool {
        self.instances
            .get(instance)
            .is_some_and(InstanceNode::is_interested)
    }

    /// Live parents, one entry per relationship.
    pub fn parents(&self, instance: InstanceId) -> Vec<InstanceId> {
        self.instances.get(instance).map_or_else(Vec::new, |node| {
            node.parents
                .iter()
                .copied()
                .filter(|p| self.instances.contains(*p))
                .collect()
        })
    }

    pub fn is_host_owned(&self, instance: InstanceId) -> bool {
        self.instances.get(instance).is_some_and(|n| n.host_owned)
    }

    pub fn view_model_name(&self, instance: InstanceId) -> Option<&str> {
        self.instances.get(instance).map(|n| n.view_model.as_str())
    }

    pub fn instance_handle(&self, instance: InstanceId) -> Option<NativeHandle> {
        self.instances.get(instance).map(|n| n.handle)
    }

    pub fn property_handle(&self, property: PropertyId) -> Option<NativeHandle> {
        self.properties.get(property).map(|n| n.handle)
    }

    pub fn property_name(&self, property: PropertyId) -> Option<&str> {
        self.properties.get(property).map(|n| &*n.name)
    }

    pub fn property_kind(&self, property: PropertyId) -> Option<PropertyKind> {
        self.properties.get(property).map(|n| n.kind)
    }

    pub fn property_owner(&self, property: PropertyId) -> Option<InstanceId> {
        self.properties.get(property).map(|n| n.owner)
    }

    /// Declared properties of an instance, straight from the engine.
    pub fn describe(&self, instance: InstanceId) -> Vec<PropertyDescriptor> {
        self.instances
            .get(instance)
            .map_or_else(Vec::new, |n| self.engine.properties(n.handle))
    }

    /// Validated identity-cache lookup.
    pub fn lookup(&self, handle: NativeHandle) -> Option<Wrapper> {
        match self.identity.lookup(handle)? {
            Wrapper::Instance(id) if self.instances.contains(id) => Some(Wrapper::Instance(id)),
            Wrapper::Property(id) if self.properties.contains(id) => Some(Wrapper::Property(id)),
            _ => None,
        }
    }

    /// Number of properties registered with the callback hub.
    pub fn registered_count(&self) -> usize {
        self.hub.len()
    }

    /// Number of identity-cache entries.
    pub fn cached_wrappers(&self) -> usize {
        self.identity.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn path_cache(&self) -> &PathCache {
        &self.paths
    }
}

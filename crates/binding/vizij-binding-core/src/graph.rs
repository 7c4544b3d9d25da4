//! Instance graph maintenance: parent links, interest propagation, slot
//! replacement and disposal.
//!
//! Parents own children (slot and list edges, resolved through the parent's
//! caches). Children point back with weak links: plain ids that stop
//! resolving once the parent is disposed.
//!
//! Interest only moves on transitions. When an instance flips between quiet
//! and interested it bumps or drops the counter of every parent, which may
//! flip them in turn. Each flip is O(depth), not O(subtree).

use vizij_native::NativeHandle;

use crate::context::BindingContext;
use crate::error::BindingError;
use crate::identity::Wrapper;
use crate::ids::{InstanceId, PropertyId};
use crate::property::PropertyDetail;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Delta {
    Gain,
    Lose,
}

impl BindingContext {
    /// Record one `parent → child` relationship.
    pub(crate) fn link(&mut self, parent: InstanceId, child: InstanceId) {
        let Some(node) = self.instances.get_mut(child) else {
            return;
        };
        node.parents.push(parent);
        if node.is_interested() {
            self.propagate(parent, Delta::Gain);
        }
    }

    /// Remove one `parent → child` relationship.
    pub(crate) fn unlink(&mut self, parent: InstanceId, child: InstanceId) {
        let Some(node) = self.instances.get_mut(child) else {
            return;
        };
        let Some(pos) = node.parents.iter().position(|p| *p == parent) else {
            return;
        };
        node.parents.remove(pos);
        if node.is_interested() {
            self.propagate(parent, Delta::Lose);
        }
    }

    /// Unlink, then dispose the child if it is left unreachable and not
    /// host-owned.
    pub(crate) fn detach(&mut self, parent: InstanceId, child: InstanceId) {
        self.unlink(parent, child);
        if self.is_orphan(child) {
            self.dispose_instance(child);
        }
    }

    pub(crate) fn register_interest(&mut self, owner: InstanceId, handle: NativeHandle) {
        let Some(node) = self.instances.get_mut(owner) else {
            return;
        };
        let was = node.is_interested();
        if !node.subscribed.insert(handle) || was {
            return;
        }
        let parents = node.parents.clone();
        for parent in parents {
            self.propagate(parent, Delta::Gain);
        }
    }

    pub(crate) fn unregister_interest(&mut self, owner: InstanceId, handle: NativeHandle) {
        let Some(node) = self.instances.get_mut(owner) else {
            return;
        };
        if !node.subscribed.remove(&handle) || node.is_interested() {
            return;
        }
        let parents = node.parents.clone();
        for parent in parents {
            self.propagate(parent, Delta::Lose);
        }
    }

    fn propagate(&mut self, start: InstanceId, delta: Delta) {
        let mut pending = vec![start];
        while let Some(id) = pending.pop() {
            let Some(node) = self.instances.get_mut(id) else {
                continue;
            };
            let was = node.is_interested();
            match delta {
                Delta::Gain => node.interested_children += 1,
                Delta::Lose => match node.interested_children.checked_sub(1) {
                    Some(n) => node.interested_children = n,
                    None => {
                        log::error!("interest underflow on {id:?}");
                        continue;
                    }
                },
            }
            if was != node.is_interested() {
                pending.extend(node.parents.iter().copied());
            }
        }
    }

    /// Swap the instance held by the nested slot at `path`.
    ///
    /// The engine validates the swap. On rejection nothing changes and `false`
    /// is returned. On success `replacement` gains a link to the slot's owner,
    /// carrying its interest up the new chain, and the old child loses its
    /// link. An old child left unreachable and not host-owned is disposed.
    pub fn replace_child(
        &mut self,
        instance: InstanceId,
        path: &str,
        replacement: InstanceId,
    ) -> bool {
        let Some(parsed) = self.parse_path(path) else {
            return false;
        };
        let Some(replacement_handle) = self.instances.get(replacement).map(|n| n.handle) else {
            self.report(BindingError::DisposedInstance(replacement));
            return false;
        };
        if !self.instances.contains(instance) {
            self.report(BindingError::DisposedInstance(instance));
            return false;
        }
        let mut parent = instance;
        for segment in parsed.parents() {
            match self.child(parent, segment, path) {
                Some(next) => parent = next,
                None => return false,
            }
        }
        let Some(parent_handle) = self.instances.get(parent).map(|n| n.handle) else {
            return false;
        };
        let slot = parsed.leaf();
        if !self
            .engine
            .replace_instance(parent_handle, slot, replacement_handle)
        {
            let view_model = self.view_model_name(replacement).unwrap_or("?").to_string();
            self.report(BindingError::Rejected {
                op: "replace_child",
                detail: format!("'{path}' cannot hold a '{view_model}' instance"),
            });
            return false;
        }

        let old = self
            .instances
            .get_mut(parent)
            .and_then(|node| node.children.insert(slot.to_string(), replacement));
        if old == Some(replacement) {
            return true;
        }
        self.link(parent, replacement);
        if let Some(old) = old {
            self.detach(parent, old);
        }
        log::debug!("replaced '{path}' with {replacement:?}");
        true
    }

    /// Dispose an instance wrapper and everything it exclusively owns.
    ///
    /// Detaches from parents (dropping their interest), unregisters and
    /// releases owned properties, unlinks children (disposing the ones that
    /// end up unreachable and not host-owned), releases the native reference
    /// and finally drops the identity entry. A second call is a no-op that
    /// returns `false`.
    pub fn dispose_instance(&mut self, id: InstanceId) -> bool {
        if !self.instances.contains(id) {
            self.report(BindingError::AlreadyDisposed(format!("{id:?}")));
            return false;
        }
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(mut node) = self.instances.remove(id) else {
                continue;
            };

            if node.is_interested() {
                for parent in &node.parents {
                    self.propagate(*parent, Delta::Lose);
                }
            }
            for parent in std::mem::take(&mut node.parents) {
                self.forget_child(parent, id);
            }

            let mut children: Vec<InstanceId> = node.children.values().copied().collect();
            for (_, property) in node.properties.drain() {
                if let Some(items) = self.drop_property(property) {
                    children.extend(items);
                }
            }

            for child in &children {
                if let Some(c) = self.instances.get_mut(*child) {
                    c.parents.retain(|p| *p != id);
                }
            }
            for child in children {
                if self.is_orphan(child) && !pending.contains(&child) {
                    pending.push(child);
                }
            }

            let handle = node.handle;
            drop(node.native.take());
            self.identity.remove_if(handle, Wrapper::Instance(id));
            log::trace!("disposed instance {id:?} ({handle})");
        }
        true
    }

    /// Dispose a single property wrapper. Callbacks are dropped and the native
    /// reference released. The next lookup creates a fresh wrapper.
    pub fn dispose_property<T>(&mut self, property: crate::Property<T>) -> bool {
        if !self.properties.contains(property.id()) {
            self.report(BindingError::AlreadyDisposed(format!("{:?}", property.id())));
            return false;
        }
        let owner = self.properties.get(property.id()).map(|n| n.owner);
        let items = self.drop_property(property.id());
        if let Some(owner) = owner {
            if let Some(node) = self.instances.get_mut(owner) {
                node.properties.retain(|_, p| *p != property.id());
            }
            for item in items.unwrap_or_default() {
                self.detach(owner, item);
            }
        }
        true
    }

    /// Remove a property wrapper from the arena, the hub and the identity
    /// cache, releasing its native reference. Returns the list mirror of a
    /// list property so the caller can fix the element links.
    pub(crate) fn drop_property(&mut self, id: PropertyId) -> Option<Vec<InstanceId>> {
        let mut node = self.properties.remove(id)?;
        if !node.subscribers.is_empty() {
            self.hub.unregister(node.handle);
            self.unregister_interest(node.owner, node.handle);
        }
        self.hub.captured.shift_remove(&id);
        drop(node.native.take());
        self.identity.remove_if(node.handle, Wrapper::Property(id));
        match node.detail {
            PropertyDetail::List(list) => Some(list.items),
            _ => None,
        }
    }

    /// Drop every edge from `parent` to a child that is being disposed.
    fn forget_child(&mut self, parent: InstanceId, child: InstanceId) {
        let Some(node) = self.instances.get_mut(parent) else {
            return;
        };
        node.children.retain(|_, c| *c != child);
        let owned: Vec<PropertyId> = node.properties.values().copied().collect();
        for property in owned {
            if let Some(p) = self.properties.get_mut(property) {
                if let PropertyDetail::List(list) = &mut p.detail {
                    let before = list.items.len();
                    list.items.retain(|i| *i != child);
                    if list.items.len() != before {
                        list.synced = false;
                    }
                }
            }
        }
    }

    fn is_orphan(&self, id: InstanceId) -> bool {
        self.instances.get(id).is_some_and(|node| {
            !node.host_owned && !node.parents.iter().any(|p| self.instances.contains(*p))
        })
    }

    /// Dispose every wrapper and empty the hub and identity cache. The
    /// context stays usable.
    pub fn reset(&mut self) {
        let properties = self.properties.len();
        let instances = self.instances.len();
        self.hub.clear();
        self.properties.clear();
        self.instances.clear();
        self.identity.clear();
        self.paths.clear();
        self.enums = None;
        log::debug!("binding context reset ({instances} instances, {properties} properties)");
    }
}

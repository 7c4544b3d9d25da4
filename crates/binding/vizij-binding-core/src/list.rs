//! List properties.
//!
//! A list property keeps a mirror of managed element wrappers in native order.
//! Each membership is a parent link from the element to the list's owning
//! instance, so a subscription inside an element marks the owner interested.
//! Removing an element unlinks it. A host-owned element stays alive and can be
//! inserted elsewhere; one that is left unreachable otherwise is disposed.

use vizij_native::NativeRef;

use crate::context::BindingContext;
use crate::error::BindingError;
use crate::ids::{InstanceId, PropertyId};
use crate::property::{prop, Property, PropertyDetail};

impl BindingContext {
    /// Rebuild the mirror from the engine when it is marked stale, the native
    /// list changed, or its length no longer matches.
    ///
    /// The native changed flag of a registered list belongs to the capture
    /// pass and is left set. An unregistered list has no other reader, so the
    /// flag is consumed here.
    pub(crate) fn sync_list(&mut self, id: PropertyId) -> Option<InstanceId> {
        let node = self.require_property(id)?;
        let (handle, owner) = (node.handle, node.owner);
        let PropertyDetail::List(list) = &node.detail else {
            return None;
        };
        let (synced, mirrored) = (list.synced, list.items.len());
        let native_len = self.engine.list_len(handle);
        let changed = self.engine.has_changed(handle);
        if changed && !self.hub.is_registered(handle) {
            self.engine.clear_changed(handle);
        }
        if synced && !changed && mirrored == native_len {
            return Some(owner);
        }

        let mut fresh = Vec::with_capacity(native_len);
        for index in 0..native_len {
            if let Some(raw) = self.engine.list_item(handle, index) {
                fresh.push(self.wrap_instance(NativeRef::adopt(&self.engine, raw)));
            }
        }
        let old = match self.properties.get_mut(id).map(|n| &mut n.detail) {
            Some(PropertyDetail::List(list)) => {
                list.synced = true;
                std::mem::replace(&mut list.items, fresh.clone())
            }
            _ => return None,
        };

        let mut added = fresh;
        let mut removed = Vec::new();
        for item in old {
            match added.iter().position(|i| *i == item) {
                Some(pos) => {
                    added.swap_remove(pos);
                }
                None => removed.push(item),
            }
        }
        for item in added {
            self.link(owner, item);
        }
        for item in removed {
            self.detach(owner, item);
        }
        log::trace!("list {id:?} resynced from the engine");
        Some(owner)
    }

    fn list_items_ref(&self, id: PropertyId) -> &[InstanceId] {
        match self.properties.get(id).map(|n| &n.detail) {
            Some(PropertyDetail::List(list)) => &list.items,
            _ => &[],
        }
    }

    fn list_items_mut(&mut self, id: PropertyId) -> Option<&mut Vec<InstanceId>> {
        match self.properties.get_mut(id).map(|n| &mut n.detail) {
            Some(PropertyDetail::List(list)) => Some(&mut list.items),
            _ => None,
        }
    }

    pub fn list_len(&mut self, list: Property<prop::List>) -> usize {
        match self.sync_list(list.id()) {
            Some(_) => self.list_items_ref(list.id()).len(),
            None => 0,
        }
    }

    pub fn list_get(&mut self, list: Property<prop::List>, index: usize) -> Option<InstanceId> {
        self.sync_list(list.id())?;
        let items = self.list_items_ref(list.id());
        let (item, len) = (items.get(index).copied(), items.len());
        if item.is_none() {
            self.report(BindingError::IndexOutOfRange {
                op: "list_get",
                index,
                len,
            });
        }
        item
    }

    pub fn list_items(&mut self, list: Property<prop::List>) -> Vec<InstanceId> {
        match self.sync_list(list.id()) {
            Some(_) => self.list_items_ref(list.id()).to_vec(),
            None => Vec::new(),
        }
    }

    pub fn list_add(&mut self, list: Property<prop::List>, item: InstanceId) -> bool {
        let len = self.list_len(list);
        self.list_insert(list, len, item)
    }

    pub fn list_insert(
        &mut self,
        list: Property<prop::List>,
        index: usize,
        item: InstanceId,
    ) -> bool {
        let Some(owner) = self.sync_list(list.id()) else {
            return false;
        };
        let Some(item_handle) = self.instances.get(item).map(|n| n.handle) else {
            self.report(BindingError::DisposedInstance(item));
            return false;
        };
        let len = self.list_items_ref(list.id()).len();
        if index > len {
            self.report(BindingError::IndexOutOfRange {
                op: "list_insert",
                index,
                len,
            });
            return false;
        }
        let Some(handle) = self.property_handle(list.id()) else {
            return false;
        };
        if !self.engine.list_insert(handle, index, item_handle) {
            let view_model = self.view_model_name(item).unwrap_or("?").to_string();
            self.report(BindingError::Rejected {
                op: "list_insert",
                detail: format!("list does not accept a '{view_model}' instance"),
            });
            return false;
        }
        if let Some(items) = self.list_items_mut(list.id()) {
            items.insert(index, item);
        }
        self.link(owner, item);
        true
    }

    /// Remove the first occurrence of `item`.
    pub fn list_remove(&mut self, list: Property<prop::List>, item: InstanceId) -> bool {
        if self.sync_list(list.id()).is_none() {
            return false;
        }
        let position = self.list_items_ref(list.id()).iter().position(|i| *i == item);
        match position {
            Some(index) => self.list_remove_at(list, index),
            None => false,
        }
    }

    pub fn list_remove_at(&mut self, list: Property<prop::List>, index: usize) -> bool {
        let Some(owner) = self.sync_list(list.id()) else {
            return false;
        };
        let len = self.list_items_ref(list.id()).len();
        if index >= len {
            self.report(BindingError::IndexOutOfRange {
                op: "list_remove_at",
                index,
                len,
            });
            return false;
        }
        let Some(handle) = self.property_handle(list.id()) else {
            return false;
        };
        if !self.engine.list_remove_at(handle, index) {
            self.report(BindingError::Rejected {
                op: "list_remove_at",
                detail: format!("index {index}"),
            });
            return false;
        }
        let removed = self.list_items_mut(list.id()).map(|items| items.remove(index));
        if let Some(item) = removed {
            self.detach(owner, item);
        }
        true
    }

    pub fn list_swap(&mut self, list: Property<prop::List>, a: usize, b: usize) -> bool {
        if self.sync_list(list.id()).is_none() {
            return false;
        }
        let len = self.list_items_ref(list.id()).len();
        if let Some(&index) = [a, b].iter().find(|i| **i >= len) {
            self.report(BindingError::IndexOutOfRange {
                op: "list_swap",
                index,
                len,
            });
            return false;
        }
        let Some(handle) = self.property_handle(list.id()) else {
            return false;
        };
        if !self.engine.list_swap(handle, a, b) {
            self.report(BindingError::Rejected {
                op: "list_swap",
                detail: format!("{a} <-> {b}"),
            });
            return false;
        }
        if let Some(items) = self.list_items_mut(list.id()) {
            items.swap(a, b);
        }
        true
    }
}

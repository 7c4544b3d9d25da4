//! Batched change notification.
//!
//! Subscribed properties are registered by native handle. Each frame the host
//! runs [`BindingContext::capture_changes`] (poll changed flags, collect
//! changed wrappers) and later [`BindingContext::flush_captured`] (invoke
//! callbacks). Splitting the two lets the frame loop collect changes before
//! it renders and deliver them afterwards.

use indexmap::IndexSet;

use vizij_native::NativeHandle;

use crate::context::BindingContext;
use crate::error::BindingError;
use crate::identity::Wrapper;
use crate::ids::{PropertyId, SubscriptionId};
use crate::property::PropertyDetail;

#[derive(Debug, Default)]
pub struct CallbackHub {
    /// Handles of properties with at least one subscriber, in registration
    /// order.
    pub(crate) registered: IndexSet<NativeHandle>,
    /// Wrappers captured as changed and not yet flushed, deduplicated.
    pub(crate) captured: IndexSet<PropertyId>,
}

impl CallbackHub {
    pub fn register(&mut self, handle: NativeHandle) -> bool {
        self.registered.insert(handle)
    }

    pub fn unregister(&mut self, handle: NativeHandle) -> bool {
        self.registered.shift_remove(&handle)
    }

    pub fn is_registered(&self, handle: NativeHandle) -> bool {
        self.registered.contains(&handle)
    }

    pub fn registered(&self) -> impl Iterator<Item = NativeHandle> + '_ {
        self.registered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn captured_len(&self) -> usize {
        self.captured.len()
    }

    pub fn clear(&mut self) {
        self.registered.clear();
        self.captured.clear();
    }
}

impl BindingContext {
    /// Poll every registered property and collect the changed ones, clearing
    /// their native flag. Registry entries whose wrapper is gone, or whose
    /// native object died, are dropped. Returns whether anything is waiting
    /// to be flushed.
    pub fn capture_changes(&mut self) -> bool {
        let mut stale_handles = Vec::new();
        let mut dead_wrappers = Vec::new();
        let mut changed_lists = Vec::new();

        for &handle in self.hub.registered.iter() {
            let id = match self.identity.lookup(handle) {
                Some(Wrapper::Property(id)) if self.properties.contains(id) => id,
                _ => {
                    stale_handles.push(handle);
                    continue;
                }
            };
            if !self.engine.is_alive(handle) {
                dead_wrappers.push((id, handle));
                continue;
            }
            if self.engine.has_changed(handle) {
                self.engine.clear_changed(handle);
                self.hub.captured.insert(id);
                if let Some(node) = self.properties.get(id) {
                    if matches!(node.detail, PropertyDetail::List(_)) {
                        changed_lists.push(id);
                    }
                }
            }
        }

        for handle in stale_handles {
            self.hub.registered.shift_remove(&handle);
            self.report(BindingError::StaleHandle(handle));
        }
        for (id, handle) in dead_wrappers {
            let owner = self.properties.get(id).map(|n| n.owner);
            if let Some(items) = self.drop_property(id) {
                if let Some(owner) = owner {
                    for item in items {
                        self.detach(owner, item);
                    }
                }
            }
            if let Some(node) = owner.and_then(|o| self.instances.get_mut(o)) {
                node.properties.retain(|_, p| *p != id);
            }
            self.report(BindingError::StaleHandle(handle));
        }
        for id in changed_lists {
            // an earlier resync may have disposed the element owning this list
            let Some(node) = self.properties.get_mut(id) else {
                continue;
            };
            if let PropertyDetail::List(list) = &mut node.detail {
                list.synced = false;
            }
            self.sync_list(id);
        }

        !self.hub.captured.is_empty()
    }

    /// Invoke the callbacks of every captured property in capture order and
    /// empty the captured set. Callbacks may freely read, write, subscribe,
    /// unsubscribe or dispose through the context they are handed. Returns
    /// the number of callbacks invoked.
    pub fn flush_captured(&mut self) -> usize {
        let captured = std::mem::take(&mut self.hub.captured);
        let mut fired = 0;
        for id in captured {
            let Some(node) = self.properties.get(id) else {
                continue;
            };
            let change = node.change(id);
            let subscribers: Vec<SubscriptionId> = node.subscribers.iter().map(|s| s.id).collect();
            for subscription in subscribers {
                let callback = self
                    .properties
                    .get_mut(id)
                    .and_then(|n| n.subscriber_mut(subscription))
                    .and_then(|s| s.callback.take());
                let Some(mut callback) = callback else {
                    continue;
                };
                callback(self, &change);
                fired += 1;
                if let Some(slot) = self
                    .properties
                    .get_mut(id)
                    .and_then(|n| n.subscriber_mut(subscription))
                {
                    slot.callback = Some(callback);
                }
            }
        }
        fired
    }

    /// Number of wrappers captured and waiting for [`Self::flush_captured`].
    pub fn pending_changes(&self) -> usize {
        self.hub.captured.len()
    }
}

//! Native handle → managed wrapper map.
//!
//! The cache holds ids, not wrappers: it never keeps a wrapper alive. An entry
//! whose id no longer resolves in the owning arena is treated as absent by the
//! context and overwritten on the next registration.

use hashbrown::HashMap;

use vizij_native::NativeHandle;

use crate::ids::{InstanceId, PropertyId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Wrapper {
    Instance(InstanceId),
    Property(PropertyId),
}

#[derive(Debug, Default)]
pub struct IdentityCache {
    entries: HashMap<NativeHandle, Wrapper>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `handle` to `wrapper`, returning any previous entry.
    pub fn register(&mut self, handle: NativeHandle, wrapper: Wrapper) -> Option<Wrapper> {
        let previous = self.entries.insert(handle, wrapper);
        if let Some(prev) = previous {
            if prev != wrapper {
                log::trace!("identity cache: {handle} rebound from {prev:?} to {wrapper:?}");
            }
        }
        previous
    }

    #[inline]
    pub fn lookup(&self, handle: NativeHandle) -> Option<Wrapper> {
        self.entries.get(&handle).copied()
    }

    pub fn remove(&mut self, handle: NativeHandle) -> Option<Wrapper> {
        self.entries.remove(&handle)
    }

    /// Remove the entry only when it still maps to `wrapper`.
    pub fn remove_if(&mut self, handle: NativeHandle, wrapper: Wrapper) -> bool {
        if self.entries.get(&handle) == Some(&wrapper) {
            self.entries.remove(&handle);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ArenaKey;

    #[test]
    fn remove_if_ignores_rebound_entries() {
        let mut cache = IdentityCache::new();
        let h = NativeHandle(4);
        let first = Wrapper::Instance(InstanceId::from_parts(0, 0));
        let second = Wrapper::Instance(InstanceId::from_parts(0, 1));

        assert_eq!(cache.register(h, first), None);
        assert_eq!(cache.register(h, second), Some(first));
        assert!(!cache.remove_if(h, first));
        assert_eq!(cache.lookup(h), Some(second));
        assert!(cache.remove_if(h, second));
        assert!(cache.is_empty());
    }
}

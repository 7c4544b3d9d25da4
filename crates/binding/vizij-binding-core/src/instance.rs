use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use vizij_native::{NativeHandle, NativeRef};

use crate::ids::{InstanceId, PropertyId};

/// Whether anything is subscribed on an instance or below it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interest {
    Quiet,
    Interested,
}

#[derive(Debug)]
pub(crate) struct InstanceNode {
    pub native: Option<NativeRef>,
    pub handle: NativeHandle,
    pub view_model: String,
    /// Adopted, created or retained by the host. Host-owned instances survive
    /// losing their last parent.
    pub host_owned: bool,
    /// Nested view-model slots resolved so far, by slot name.
    pub children: HashMap<String, InstanceId>,
    /// Property wrappers resolved so far, by property name.
    pub properties: HashMap<String, PropertyId>,
    /// One entry per parent relationship (slot or list membership).
    pub parents: Vec<InstanceId>,
    /// Handles of owned properties that currently have subscribers.
    pub subscribed: HashSet<NativeHandle>,
    /// Number of children currently [`Interest::Interested`].
    pub interested_children: u32,
}

impl InstanceNode {
    pub fn new(native: NativeRef, view_model: String) -> Self {
        Self {
            handle: native.handle(),
            native: Some(native),
            view_model,
            host_owned: false,
            children: HashMap::new(),
            properties: HashMap::new(),
            parents: Vec::new(),
            subscribed: HashSet::new(),
            interested_children: 0,
        }
    }

    #[inline]
    pub fn is_interested(&self) -> bool {
        !self.subscribed.is_empty() || self.interested_children > 0
    }

    pub fn interest(&self) -> Interest {
        if self.is_interested() {
            Interest::Interested
        } else {
            Interest::Quiet
        }
    }
}

//! Identifiers for managed wrappers.
//!
//! Wrapper ids pair a slot index with a generation counter. Once a wrapper is
//! disposed its slot's generation moves on, so every id still pointing at it
//! (a parent link, a host copy, a cached child) reads as dead instead of
//! aliasing whatever reuses the slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Arena key contract shared by [`InstanceId`] and [`PropertyId`].
pub(crate) trait ArenaKey: Copy {
    fn from_parts(idx: u32, generation: u32) -> Self;
    fn idx(self) -> u32;
    fn generation(self) -> u32;
}

macro_rules! wrapper_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            idx: u32,
            generation: u32,
        }

        impl $name {
            /// Raw slot index (for diagnostics only).
            #[inline]
            pub fn index(self) -> u32 {
                self.idx
            }

            #[inline]
            pub fn generation(self) -> u32 {
                self.generation
            }
        }

        impl ArenaKey for $name {
            #[inline]
            fn from_parts(idx: u32, generation: u32) -> Self {
                Self { idx, generation }
            }

            #[inline]
            fn idx(self) -> u32 {
                self.idx
            }

            #[inline]
            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}@gen{})", stringify!($name), self.idx, self.generation)
            }
        }
    };
}

wrapper_id!(
    /// Handle to a managed view-model instance wrapper.
    InstanceId
);

wrapper_id!(
    /// Handle to a managed property wrapper.
    PropertyId
);

/// Identifies one callback registered on a property.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

//! vizij-binding-core
//!
//! Binds a view-model data graph living in a native engine to host code. The
//! [`BindingContext`] service owns everything:
//!
//! - an identity cache guaranteeing one managed wrapper per native handle,
//! - arenas of instance and property wrappers addressed by generational ids,
//! - the instance graph (strong parent → child edges, weak child → parent links)
//!   with incremental "anything subscribed below me" bookkeeping,
//! - the callback hub that captures changed properties and flushes their
//!   callbacks in a later step of the same frame.
//!
//! Host-facing failures (unknown paths, kind mismatches, disposed arguments)
//! never panic: they are logged through `log` and recorded in
//! [`Diagnostics`].

mod arena;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
mod graph;
pub mod hub;
pub mod identity;
pub mod ids;
pub mod instance;
mod list;
pub mod path;
pub mod property;

pub use config::{BindingConfig, DiagnosticsCfg};
pub use context::BindingContext;
pub use diagnostics::Diagnostics;
pub use error::BindingError;
pub use hub::CallbackHub;
pub use identity::{IdentityCache, Wrapper};
pub use ids::{InstanceId, PropertyId, SubscriptionId};
pub use instance::Interest;
pub use path::{PathCache, PropertyPath};
pub use property::{prop, Property, PropertyChange, PropertyType, ValueType};
pub use vizij_native::{
    AssetRef, Color, NativeEngine, NativeHandle, PropertyDescriptor, PropertyKind, PropertyValue,
};

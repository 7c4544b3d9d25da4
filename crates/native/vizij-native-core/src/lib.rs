//! vizij-native-core: the boundary between view-model bindings and the native
//! animation engine.
//!
//! Everything the binding layer knows about engine-side state goes through the
//! [`NativeEngine`] trait: opaque [`NativeHandle`]s, typed [`PropertyValue`]s,
//! "changed" flags and native reference counts. [`NativeRef`] is the only type
//! that ever releases a native reference.
//!
//! [`MemoryEngine`] is an in-memory engine built from a [`ViewModelFile`]. Hosts
//! without a renderer and all tests use it.

pub mod engine;
pub mod error;
pub mod handle;
pub mod kind;
pub mod memory;
pub mod schema;
pub mod value;

pub use engine::{EnumDefinition, NativeEngine, PropertyDescriptor};
pub use error::SchemaError;
pub use handle::{NativeHandle, NativeRef};
pub use kind::PropertyKind;
pub use memory::MemoryEngine;
pub use schema::{EnumDef, PropertyDef, ViewModelDef, ViewModelFile};
pub use value::{AssetRef, Color, PropertyValue};

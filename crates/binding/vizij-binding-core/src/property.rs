//! Property wrappers and their typed host handles.
//!
//! The host holds a [`Property<T>`], a copyable id tagged with a kind marker
//! from [`prop`]. The wrapper itself (native reference, subscribers, kind
//! specific state) lives in the context's property arena.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::rc::Rc;

use vizij_native::{AssetRef, NativeHandle, NativeRef, PropertyKind, PropertyValue};

use crate::context::BindingContext;
use crate::ids::{InstanceId, PropertyId, SubscriptionId};

/// Kind marker for [`Property<T>`].
pub trait PropertyType: 'static {
    const KIND: PropertyKind;
}

/// Markers whose native value can be read (and mostly written) as a host type.
pub trait ValueType: PropertyType {
    type Value;

    /// `domain` is the enum value domain; empty for non-enum kinds.
    fn decode(value: PropertyValue, domain: &[String]) -> Option<Self::Value>;
    fn encode(value: Self::Value, domain: &[String]) -> Option<PropertyValue>;
}

pub mod prop {
    //! Kind markers.

    use super::*;

    macro_rules! marker {
        ($name:ident, $kind:ident) => {
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            pub enum $name {}

            impl PropertyType for $name {
                const KIND: PropertyKind = PropertyKind::$kind;
            }
        };
    }

    marker!(Number, Number);
    marker!(Boolean, Boolean);
    marker!(Text, String);
    marker!(Color, Color);
    marker!(Enum, Enum);
    marker!(Trigger, Trigger);
    marker!(List, List);
    marker!(Image, Image);
    marker!(Artboard, Artboard);

    impl ValueType for Number {
        type Value = f32;
        fn decode(value: PropertyValue, _: &[String]) -> Option<f32> {
            value.as_number()
        }
        fn encode(value: f32, _: &[String]) -> Option<PropertyValue> {
            Some(PropertyValue::Number(value))
        }
    }

    impl ValueType for Boolean {
        type Value = bool;
        fn decode(value: PropertyValue, _: &[String]) -> Option<bool> {
            value.as_bool()
        }
        fn encode(value: bool, _: &[String]) -> Option<PropertyValue> {
            Some(PropertyValue::Boolean(value))
        }
    }

    impl ValueType for Text {
        type Value = String;
        fn decode(value: PropertyValue, _: &[String]) -> Option<String> {
            match value {
                PropertyValue::String(s) => Some(s),
                _ => None,
            }
        }
        fn encode(value: String, _: &[String]) -> Option<PropertyValue> {
            Some(PropertyValue::String(value))
        }
    }

    impl ValueType for Color {
        type Value = vizij_native::Color;
        fn decode(value: PropertyValue, _: &[String]) -> Option<vizij_native::Color> {
            match value {
                PropertyValue::Color(c) => Some(c),
                _ => None,
            }
        }
        fn encode(value: vizij_native::Color, _: &[String]) -> Option<PropertyValue> {
            Some(PropertyValue::Color(value))
        }
    }

    /// Enum values are exchanged by name; indices go through
    /// [`BindingContext::enum_index`].
    impl ValueType for Enum {
        type Value = String;
        fn decode(value: PropertyValue, domain: &[String]) -> Option<String> {
            match value {
                PropertyValue::Enum(i) => domain.get(i as usize).cloned(),
                _ => None,
            }
        }
        fn encode(value: String, domain: &[String]) -> Option<PropertyValue> {
            let index = domain.iter().position(|v| *v == value)?;
            Some(PropertyValue::Enum(index as u32))
        }
    }

    /// Reads the fire count. Triggers are fired, never written.
    impl ValueType for Trigger {
        type Value = u32;
        fn decode(value: PropertyValue, _: &[String]) -> Option<u32> {
            match value {
                PropertyValue::Trigger(n) => Some(n),
                _ => None,
            }
        }
        fn encode(_: u32, _: &[String]) -> Option<PropertyValue> {
            None
        }
    }

    impl ValueType for Image {
        type Value = Option<AssetRef>;
        fn decode(value: PropertyValue, _: &[String]) -> Option<Option<AssetRef>> {
            match value {
                PropertyValue::Image(a) => Some(a),
                _ => None,
            }
        }
        fn encode(value: Option<AssetRef>, _: &[String]) -> Option<PropertyValue> {
            Some(PropertyValue::Image(value))
        }
    }

    impl ValueType for Artboard {
        type Value = Option<AssetRef>;
        fn decode(value: PropertyValue, _: &[String]) -> Option<Option<AssetRef>> {
            match value {
                PropertyValue::Artboard(a) => Some(a),
                _ => None,
            }
        }
        fn encode(value: Option<AssetRef>, _: &[String]) -> Option<PropertyValue> {
            Some(PropertyValue::Artboard(value))
        }
    }
}

/// Typed host handle to a property wrapper.
pub struct Property<T> {
    id: PropertyId,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    pub(crate) fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    #[inline]
    pub fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: PropertyType> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Property<{}>({:?})", T::KIND, self.id)
    }
}

/// Passed to change callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChange {
    pub property: PropertyId,
    pub owner: InstanceId,
    pub kind: PropertyKind,
    pub name: Rc<str>,
}

pub(crate) type Callback = Box<dyn FnMut(&mut BindingContext, &PropertyChange)>;

pub(crate) struct Subscriber {
    pub id: SubscriptionId,
    /// `None` while the callback is running.
    pub callback: Option<Callback>,
}

#[derive(Debug, Default)]
pub(crate) struct ListState {
    /// Managed wrappers for the native list, in native order.
    pub items: Vec<InstanceId>,
    pub synced: bool,
}

/// Kind specific wrapper state.
#[derive(Debug)]
pub(crate) enum PropertyDetail {
    Plain,
    Enum { domain: Rc<[String]> },
    List(ListState),
}

impl PropertyDetail {
    pub fn domain(&self) -> &[String] {
        match self {
            PropertyDetail::Enum { domain } => domain,
            _ => &[],
        }
    }
}

pub(crate) struct PropertyNode {
    pub native: Option<NativeRef>,
    pub handle: NativeHandle,
    pub kind: PropertyKind,
    pub name: Rc<str>,
    pub owner: InstanceId,
    pub subscribers: Vec<Subscriber>,
    pub detail: PropertyDetail,
}

impl PropertyNode {
    pub fn new(
        native: NativeRef,
        kind: PropertyKind,
        name: &str,
        owner: InstanceId,
        detail: PropertyDetail,
    ) -> Self {
        Self {
            handle: native.handle(),
            native: Some(native),
            kind,
            name: Rc::from(name),
            owner,
            subscribers: Vec::new(),
            detail,
        }
    }

    pub fn change(&self, property: PropertyId) -> PropertyChange {
        PropertyChange {
            property,
            owner: self.owner,
            kind: self.kind,
            name: Rc::clone(&self.name),
        }
    }

    pub fn subscriber_mut(&mut self, id: SubscriptionId) -> Option<&mut Subscriber> {
        self.subscribers.iter_mut().find(|s| s.id == id)
    }
}

impl fmt::Debug for PropertyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyNode")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("subscribers", &self.subscribers.len())
            .field("detail", &self.detail)
            .finish()
    }
}

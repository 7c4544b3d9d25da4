//! PropertyValue: values exchanged with the native engine by handle.

use serde::{Deserialize, Serialize};

use crate::kind::PropertyKind;

/// Packed ARGB color, 8 bits per channel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    #[inline]
    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub fn b(self) -> u8 {
        self.0 as u8
    }

    #[inline]
    pub fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Same color with a different alpha channel.
    pub fn with_alpha(self, a: u8) -> Self {
        Color((self.0 & 0x00FF_FFFF) | (a as u32) << 24)
    }
}

/// Reference to an asset (image or artboard) known to the native engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetRef(pub u32);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PropertyValue {
    Number(f32),
    Boolean(bool),
    String(String),
    Color(Color),
    /// Index into the enum's value domain.
    Enum(u32),
    /// Number of times the trigger has fired. Triggers have no persisted value,
    /// only an edge; the counter lets hosts observe the edge.
    Trigger(u32),
    Image(Option<AssetRef>),
    Artboard(Option<AssetRef>),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Number(_) => PropertyKind::Number,
            PropertyValue::Boolean(_) => PropertyKind::Boolean,
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Color(_) => PropertyKind::Color,
            PropertyValue::Enum(_) => PropertyKind::Enum,
            PropertyValue::Trigger(_) => PropertyKind::Trigger,
            PropertyValue::Image(_) => PropertyKind::Image,
            PropertyValue::Artboard(_) => PropertyKind::Artboard,
        }
    }

    /// Zero value for a kind, or `None` for kinds without a value.
    pub fn default_for(kind: PropertyKind) -> Option<Self> {
        let v = match kind {
            PropertyKind::Number => PropertyValue::Number(0.0),
            PropertyKind::Boolean => PropertyValue::Boolean(false),
            PropertyKind::String => PropertyValue::String(String::new()),
            PropertyKind::Color => PropertyValue::Color(Color::BLACK),
            PropertyKind::Enum => PropertyValue::Enum(0),
            PropertyKind::Trigger => PropertyValue::Trigger(0),
            PropertyKind::Image => PropertyValue::Image(None),
            PropertyKind::Artboard => PropertyValue::Artboard(None),
            PropertyKind::List | PropertyKind::ViewModel => return None,
        };
        Some(v)
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

//! Display attributes and series grouping.

use std::collections::HashMap;

use crate::error::Error;

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Create an opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Well-known display attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeId {
    /// Preferred display color.
    ColorHint,
    /// Tooltip text shown on hover.
    ToolTip,
    /// Render the label in italics.
    Italic,
    /// Disabled in the series list.
    Disabled,
}

impl AttributeId {
    fn expected_kind(self) -> &'static str {
        match self {
            Self::ColorHint => "color",
            Self::ToolTip => "text",
            Self::Italic | Self::Disabled => "flag",
        }
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A color value.
    Color(Color),
    /// A text value.
    Text(String),
    /// A boolean flag.
    Flag(bool),
}

impl AttributeValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Color(_) => "color",
            Self::Text(_) => "text",
            Self::Flag(_) => "flag",
        }
    }
}

/// Attribute storage with declared-kind checking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: HashMap<AttributeId, AttributeValue>,
}

impl AttributeMap {
    /// Create an empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, rejecting values of the wrong kind.
    pub fn set(&mut self, id: AttributeId, value: AttributeValue) -> Result<(), Error> {
        if value.kind() != id.expected_kind() {
            return Err(Error::TypeMismatch {
                id,
                expected: id.expected_kind(),
                actual: value.kind(),
            });
        }
        self.entries.insert(id, value);
        Ok(())
    }

    /// Read an attribute.
    pub fn get(&self, id: AttributeId) -> Option<&AttributeValue> {
        self.entries.get(&id)
    }

    /// Check whether no attributes are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Named tag shared by sibling series.
///
/// Carries display metadata only; it has no lifecycle coupling to the
/// chunk data of the series that reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotGroup {
    name: String,
    attributes: AttributeMap,
}

impl PlotGroup {
    /// Create a group with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group attributes.
    pub fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    /// Mutable access to the group attributes.
    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_kind_is_stored() {
        let mut attrs = AttributeMap::new();
        attrs
            .set(AttributeId::ColorHint, AttributeValue::Color(Color::rgb(255, 0, 0)))
            .unwrap();
        assert_eq!(
            attrs.get(AttributeId::ColorHint),
            Some(&AttributeValue::Color(Color::rgb(255, 0, 0)))
        );
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut attrs = AttributeMap::new();
        let err = attrs
            .set(AttributeId::ColorHint, AttributeValue::Flag(true))
            .unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                id: AttributeId::ColorHint,
                expected: "color",
                actual: "flag",
            }
        );
        assert!(attrs.get(AttributeId::ColorHint).is_none());
    }
}

//! The closed color palette.
//!
//! A tile carries at most one [`ColorTag`]. Menus additionally offer the
//! clear sentinel, modelled as [`ColorChoice::Clear`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One of the eight color tags a tile can be marked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColorTag {
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Orange,
    Cyan,
    Lavender,
}

impl ColorTag {
    /// Palette order, as shown in menus and the swap picker.
    pub const ALL: [ColorTag; 8] = [
        ColorTag::Yellow,
        ColorTag::Green,
        ColorTag::Blue,
        ColorTag::Purple,
        ColorTag::Pink,
        ColorTag::Orange,
        ColorTag::Cyan,
        ColorTag::Lavender,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorTag::Yellow => "yellow",
            ColorTag::Green => "green",
            ColorTag::Blue => "blue",
            ColorTag::Purple => "purple",
            ColorTag::Pink => "pink",
            ColorTag::Orange => "orange",
            ColorTag::Cyan => "cyan",
            ColorTag::Lavender => "lavender",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        ColorTag::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Display swatch used by menu borders and picker options.
    pub fn hex(self) -> &'static str {
        match self {
            ColorTag::Yellow => "#f9df6d",
            ColorTag::Green => "#a0c35a",
            ColorTag::Blue => "#b0c4ef",
            ColorTag::Purple => "#ba81c5",
            ColorTag::Pink => "#ffc1cc",
            ColorTag::Orange => "#ffcba4",
            ColorTag::Cyan => "#a4e4ff",
            ColorTag::Lavender => "#d4a4ff",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ColorTag::Yellow => "🟡 Yellow (Easy)",
            ColorTag::Green => "🟢 Green (Medium)",
            ColorTag::Blue => "🔵 Blue (Hard)",
            ColorTag::Purple => "🟣 Purple (Hardest)",
            ColorTag::Pink => "🩷 Light Pink",
            ColorTag::Orange => "🧡 Light Orange",
            ColorTag::Cyan => "🩵 Light Cyan",
            ColorTag::Lavender => "💜 Light Lavender",
        }
    }

    /// Position in [`ColorTag::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// CSS class painted onto a tile for this tag, e.g. `connections-helper-blue`.
    pub fn class_name(self, prefix: &str) -> String {
        format!("{prefix}{}", self.as_str())
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColorTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ColorTag::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown color `{s}`")))
    }
}

/// A menu choice: paint a tag, or clear the tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorChoice {
    Tag(ColorTag),
    Clear,
}

impl ColorChoice {
    /// The nine menu choices: eight tags followed by clear.
    pub const ALL: [ColorChoice; 9] = [
        ColorChoice::Tag(ColorTag::Yellow),
        ColorChoice::Tag(ColorTag::Green),
        ColorChoice::Tag(ColorTag::Blue),
        ColorChoice::Tag(ColorTag::Purple),
        ColorChoice::Tag(ColorTag::Pink),
        ColorChoice::Tag(ColorTag::Orange),
        ColorChoice::Tag(ColorTag::Cyan),
        ColorChoice::Tag(ColorTag::Lavender),
        ColorChoice::Clear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorChoice::Tag(tag) => tag.as_str(),
            ColorChoice::Clear => "clear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s == "clear" {
            return Some(ColorChoice::Clear);
        }
        ColorTag::parse(s).map(ColorChoice::Tag)
    }

    pub fn tag(self) -> Option<ColorTag> {
        match self {
            ColorChoice::Tag(tag) => Some(tag),
            ColorChoice::Clear => None,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            ColorChoice::Tag(tag) => tag.hex(),
            ColorChoice::Clear => "#ffffff",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ColorChoice::Tag(tag) => tag.title(),
            ColorChoice::Clear => "⚪ Clear Color",
        }
    }

    /// Capitalized name used in status messages: `Yellow`, `Clear`.
    pub fn display_name(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<ColorTag> for ColorChoice {
    fn from(tag: ColorTag) -> Self {
        ColorChoice::Tag(tag)
    }
}

impl Serialize for ColorChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColorChoice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ColorChoice::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown color `{s}`")))
    }
}

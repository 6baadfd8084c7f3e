//! Styled text lines used for enchantment descriptions, item names and lore.

use serde::{Deserialize, Serialize};

/// Named chat colours an operator can pick for enchantment names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LoreColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    #[default]
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl LoreColor {
    /// MiniMessage-style tag name of the colour.
    pub fn tag(self) -> &'static str {
        match self {
            LoreColor::Black => "black",
            LoreColor::DarkBlue => "dark_blue",
            LoreColor::DarkGreen => "dark_green",
            LoreColor::DarkAqua => "dark_aqua",
            LoreColor::DarkRed => "dark_red",
            LoreColor::DarkPurple => "dark_purple",
            LoreColor::Gold => "gold",
            LoreColor::Gray => "gray",
            LoreColor::DarkGray => "dark_gray",
            LoreColor::Blue => "blue",
            LoreColor::Green => "green",
            LoreColor::Aqua => "aqua",
            LoreColor::Red => "red",
            LoreColor::LightPurple => "light_purple",
            LoreColor::Yellow => "yellow",
            LoreColor::White => "white",
        }
    }
}

/// A single line of styled text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// Raw text content.
    pub text: String,
    /// Explicit colour, if any.
    pub color: Option<LoreColor>,
    /// Italic decoration. Item names and lore render italic unless disabled.
    pub italic: bool,
}

impl TextLine {
    /// Plain, uncoloured text with the default italic item styling.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
            italic: true,
        }
    }

    /// Apply `color` only when the line has no colour of its own.
    pub fn color_if_absent(mut self, color: LoreColor) -> Self {
        if self.color.is_none() {
            self.color = Some(color);
        }
        self
    }

    /// Set the italic decoration.
    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }
}

//! Palette color tokens shared by groups and day themes.
//!
//! Colors are stored as lowercase tokens (`"pink"`, `"sky"`, ...). Older rows
//! may carry a utility class such as `"bg-green-500"`; the color is read out of
//! it. Unknown tokens never fail to load: they resolve to a fallback color.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A color in the fixed palette. Declaration order is the round-robin order
/// used when assigning colors to new groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum PaletteColor {
    Pink,
    Sky,
    Amber,
    Purple,
    Indigo,
    Teal,
    Cyan,
    Rose,
    Green,
    Red,
    Blue,
}

impl PaletteColor {
    pub const DEFAULT: PaletteColor = PaletteColor::Pink;

    pub const ALL: [PaletteColor; 11] = [
        PaletteColor::Pink,
        PaletteColor::Sky,
        PaletteColor::Amber,
        PaletteColor::Purple,
        PaletteColor::Indigo,
        PaletteColor::Teal,
        PaletteColor::Cyan,
        PaletteColor::Rose,
        PaletteColor::Green,
        PaletteColor::Red,
        PaletteColor::Blue,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Pink => "pink",
            Self::Sky => "sky",
            Self::Amber => "amber",
            Self::Purple => "purple",
            Self::Indigo => "indigo",
            Self::Teal => "teal",
            Self::Cyan => "cyan",
            Self::Rose => "rose",
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
        }
    }

    /// Look up a token, ignoring case and surrounding whitespace. Class forms
    /// like `bg-sky-500` or `sky-100` resolve to their color.
    pub fn from_token(token: &str) -> Option<Self> {
        let token = strip_class(token.trim());
        Self::ALL
            .into_iter()
            .find(|color| color.token().eq_ignore_ascii_case(token))
    }

    /// Look up a token, falling back to [`PaletteColor::DEFAULT`].
    pub fn from_token_or_default(token: &str) -> Self {
        Self::from_token_or(token, Self::DEFAULT)
    }

    pub fn from_token_or(token: &str, fallback: PaletteColor) -> Self {
        Self::from_token(token).unwrap_or_else(|| {
            log::warn!("Unknown palette token '{}', using '{}'", token, fallback);
            fallback
        })
    }
}

/// `bg-green-500` -> `green`. Plain tokens pass through.
fn strip_class(token: &str) -> &str {
    let token = token.strip_prefix("bg-").unwrap_or(token);
    match token.rsplit_once('-') {
        Some((color, shade)) if !shade.is_empty() && shade.bytes().all(|b| b.is_ascii_digit()) => {
            color
        }
        _ => token,
    }
}

impl Default for PaletteColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPaletteColor(pub String);

impl fmt::Display for UnknownPaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown palette color '{}'", self.0)
    }
}

impl std::error::Error for UnknownPaletteColor {}

impl FromStr for PaletteColor {
    type Err = UnknownPaletteColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s).ok_or_else(|| UnknownPaletteColor(s.to_string()))
    }
}

impl From<String> for PaletteColor {
    fn from(value: String) -> Self {
        Self::from_token_or_default(&value)
    }
}

impl From<PaletteColor> for &'static str {
    fn from(value: PaletteColor) -> Self {
        value.token()
    }
}

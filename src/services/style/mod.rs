//! Presentation-neutral styling descriptors.
//!
//! The rendering layer decides what a token like `pink-100` or a four-track
//! grid looks like; this module only decides which token applies.

use std::fmt;

use serde::Serialize;

use crate::models::palette::PaletteColor;

/// A palette color at a given shade, e.g. `sky-400`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorToken {
    pub color: PaletteColor,
    pub shade: u16,
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.color, self.shade)
    }
}

impl Serialize for ColorToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const BACKGROUND_SHADE: u16 = 100;
pub const BORDER_SHADE: u16 = 400;
pub const TEXT_SHADE: u16 = 800;
pub const ACCENT_SHADE: u16 = 500;

/// How a group column (or a themed day) is tinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    pub background: ColorToken,
    pub border: ColorToken,
    pub text: ColorToken,
    /// Badge/header accent.
    pub accent: ColorToken,
}

impl StyleDescriptor {
    pub fn for_color(color: PaletteColor) -> Self {
        let shade = |shade| ColorToken { color, shade };
        Self {
            background: shade(BACKGROUND_SHADE),
            border: shade(BORDER_SHADE),
            text: shade(TEXT_SHADE),
            accent: shade(ACCENT_SHADE),
        }
    }
}

/// Resolve a stored color token. Never fails: unknown tokens get the
/// default palette color.
pub fn resolve_style(token: &str) -> StyleDescriptor {
    StyleDescriptor::for_color(PaletteColor::from_token_or_default(token))
}

/// Fewest tracks a grid can have.
pub const MIN_GRID_TRACKS: usize = 1;
/// Most tracks a grid can have.
pub const MAX_GRID_TRACKS: usize = 4;

/// Column layout for a row of group columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridLayout {
    tracks: usize,
}

impl GridLayout {
    pub fn tracks(&self) -> usize {
        self.tracks
    }

    /// Layout token such as `cols-3`.
    pub fn token(&self) -> String {
        format!("cols-{}", self.tracks)
    }
}

/// Grid for `count` columns, clamped to the supported range.
pub fn select_grid(count: usize) -> GridLayout {
    GridLayout {
        tracks: count.clamp(MIN_GRID_TRACKS, MAX_GRID_TRACKS),
    }
}

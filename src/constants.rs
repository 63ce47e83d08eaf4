//! Shared application-wide constants.
//! Centralizes the color-scheme table and tweakable layout values used
//! across UI rendering and interactions.

use egui::Color32;

/// One color-scheme entry: the fill used for event card slots and the
/// fill used for action card slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    /// Fill color for event card slots.
    pub event: Color32,
    /// Fill color for action card slots.
    pub action: Color32,
}

/// The fixed color-scheme table, selectable from the toolbar.
///
/// The document stores an index into this table, and saved files carry
/// that index, so entries must keep their positions.
pub const COLOR_SCHEMES: [ColorScheme; 6] = [
    ColorScheme {
        event: Color32::from_rgb(0, 191, 255),
        action: Color32::from_rgb(218, 112, 214),
    },
    ColorScheme {
        event: Color32::from_rgb(155, 48, 255),
        action: Color32::from_rgb(159, 182, 205),
    },
    ColorScheme {
        event: Color32::from_rgb(67, 205, 128),
        action: Color32::from_rgb(0, 197, 205),
    },
    ColorScheme {
        event: Color32::from_rgb(255, 215, 0),
        action: Color32::from_rgb(255, 99, 71),
    },
    ColorScheme {
        event: Color32::from_rgb(255, 97, 3),
        action: Color32::from_rgb(142, 56, 142),
    },
    ColorScheme {
        event: Color32::from_rgb(125, 158, 192),
        action: Color32::from_rgb(56, 142, 142),
    },
];

// Card geometry
/// Ideal (unscaled) edge length of a card slot, in points.
pub const CARD_SIZE: f32 = 110.0;
/// Corner radius for card slots and palette entries.
pub const CARD_CORNER_RADIUS: f32 = 8.0;
/// Horizontal space reserved for the arrow between the two slots of a row.
pub const ARROW_WIDTH: f32 = 48.0;
/// Padding inside a pair row around its card slots.
pub const ROW_PADDING: f32 = 10.0;
/// Vertical spacing between pair rows.
pub const ROW_SPACING: f32 = 8.0;

// Palette
/// Ideal (unscaled) edge length of a palette entry.
pub const PALETTE_ICON_SIZE: f32 = 64.0;
/// Vertical spacing between palette entries.
pub const PALETTE_SPACING: f32 = 6.0;

// Responsive scaling
/// Number of rows the canvas aims to keep visible when height-constrained.
pub const IDEAL_VISIBLE_ROWS: f32 = 6.0;
/// Smallest scale factor applied to rows and palette icons.
pub const MIN_SCALE: f32 = 0.35;
/// Largest scale factor applied to rows and palette icons.
pub const MAX_SCALE: f32 = 1.0;

// src/ui/styling/mod.rs
//! Styling system for UI elements
//!
//! - [`colors`] - Color constants and palette management
//! - [`style`] - Style configuration and button variants
//! - [`theme`] - Spacing, corner radii and the theme bundling them

pub mod colors;
pub mod style;
pub mod theme;

pub use colors::{COLOR_ACCENT, COLOR_SURFACE, ColorPalette, TEXT_DIMMED, WHITE};
pub use style::{ButtonVariant, Style};
pub use theme::{BorderRadius, Spacing, Theme};

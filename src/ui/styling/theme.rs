// src/ui/styling/theme.rs
//! Theme shared by the card, the picker overlay and the weekday flyout
//!
//! A [`Theme`] is copied into every widget the card builds, so changing the
//! card theme restyles all of them on the next layout.

use super::colors::ColorPalette;

/// Gaps between and inside controls, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacing {
    /// Gap between neighbouring controls and row padding
    pub gap: u32,
    /// Padding inside the time picker overlay
    pub modal_padding: u32,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            gap: 8,
            modal_padding: 12,
        }
    }
}

/// Corner radii, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderRadius {
    pub checkbox: u32,
    /// Buttons, triggers, rows and the flyout
    pub control: u32,
    /// Time picker content panel
    pub modal: u32,
}

impl Default for BorderRadius {
    fn default() -> Self {
        Self {
            checkbox: 3,
            control: 8,
            modal: 12,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Theme {
    pub palette: ColorPalette,
    pub spacing: Spacing,
    pub border_radius: BorderRadius,
}

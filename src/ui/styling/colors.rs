// src/ui/styling/colors.rs
//! Color definitions and palette management
//!
//! Colors follow the dashboard card look: blue-grey surfaces, a blue accent
//! and white text. All values are RGB565.
//!
//! To convert from 8-bit RGB: R>>3, G>>2, B>>3

use embedded_graphics::pixelcolor::Rgb565;

// ============================================================================
// Base Colors
// ============================================================================

/// Card background - near black
pub const COLOR_BACKGROUND: Rgb565 = Rgb565::new(0x1c >> 3, 0x1c >> 2, 0x1c >> 3);

/// Control and panel surface - blue grey (#37474f)
pub const COLOR_SURFACE: Rgb565 = Rgb565::new(0x37 >> 3, 0x47 >> 2, 0x4f >> 3);

/// Border/stroke color - medium grey (#555555)
pub const COLOR_STROKE: Rgb565 = Rgb565::new(0x55 >> 3, 0x55 >> 2, 0x55 >> 3);

/// Dimmed backdrop behind modal overlays
pub const COLOR_SCRIM: Rgb565 = Rgb565::new(0x0e >> 3, 0x12 >> 2, 0x14 >> 3);

// ============================================================================
// Accent Colors
// ============================================================================

/// Accent blue (#2196f3) - selection band, checked boxes, primary buttons
pub const COLOR_ACCENT: Rgb565 = Rgb565::new(0x21 >> 3, 0x96 >> 2, 0xf3 >> 3);

/// Pressed accent (#1976d2)
pub const COLOR_ACCENT_PRESSED: Rgb565 = Rgb565::new(0x19 >> 3, 0x76 >> 2, 0xd2 >> 3);

/// Muted red for errors and delete actions
pub const COLOR_ERROR: Rgb565 = Rgb565::new(190 >> 3, 95 >> 2, 95 >> 3);

// ============================================================================
// Text Colors
// ============================================================================

/// Pure white - maximum brightness in RGB565
pub const WHITE: Rgb565 = Rgb565::new(31, 63, 31);

/// White at roughly 35% over the surface color, for inactive wheel rows
pub const TEXT_DIMMED: Rgb565 = Rgb565::new(0x7d >> 3, 0x87 >> 2, 0x8c >> 3);

// ============================================================================
// Color Palette
// ============================================================================

/// A cohesive color palette for consistent widget theming.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorPalette {
    /// Accent color for selection and primary actions
    pub primary: Rgb565,

    /// Accent color while pressed
    pub primary_pressed: Rgb565,

    /// Main background color
    pub background: Rgb565,

    /// Surface color for controls, panels and overlays
    pub surface: Rgb565,

    /// Backdrop drawn behind modal overlays
    pub scrim: Rgb565,

    /// Error and destructive action color
    pub error: Rgb565,

    /// Primary text color - high contrast
    pub text_primary: Rgb565,

    /// Secondary text color - labels and inactive rows
    pub text_secondary: Rgb565,

    /// Border color for separators and outlines
    pub border: Rgb565,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorPalette {
    /// Dark dashboard palette
    pub fn dark() -> Self {
        Self {
            primary: COLOR_ACCENT,
            primary_pressed: COLOR_ACCENT_PRESSED,
            background: COLOR_BACKGROUND,
            surface: COLOR_SURFACE,
            scrim: COLOR_SCRIM,
            error: COLOR_ERROR,
            text_primary: WHITE,
            text_secondary: TEXT_DIMMED,
            border: COLOR_STROKE,
        }
    }
}

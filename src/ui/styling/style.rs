// src/ui/styling/style.rs
//! Fill, text and outline colors for a single control
//!
//! [`ButtonVariant`] maps a palette onto the three button looks the card
//! uses; [`Style::panel`] is the outlined surface behind rows, the flyout and
//! the picker content.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder};

use super::colors::{ColorPalette, WHITE};

#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub background_color: Option<Rgb565>,
    /// Text color, white when unset
    pub foreground_color: Option<Rgb565>,
    pub border_color: Option<Rgb565>,
    /// Stroke width in pixels, 0 draws no outline
    pub border_width: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background_color: None,
            foreground_color: Some(WHITE),
            border_color: None,
            border_width: 0,
        }
    }
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surface fill with a 1px outline in the palette border color.
    pub fn panel(palette: &ColorPalette) -> Self {
        Self::new()
            .with_background(palette.surface)
            .with_foreground(palette.text_primary)
            .with_border(palette.border, 1)
    }

    pub fn with_background(mut self, color: Rgb565) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_foreground(mut self, color: Rgb565) -> Self {
        self.foreground_color = Some(color);
        self
    }

    pub fn with_border(mut self, color: Rgb565, width: u32) -> Self {
        self.border_color = Some(color);
        self.border_width = width;
        self
    }

    pub fn to_primitive_style(&self) -> PrimitiveStyle<Rgb565> {
        let mut builder = PrimitiveStyleBuilder::new();

        if let Some(bg) = self.background_color {
            builder = builder.fill_color(bg);
        }

        if let Some(border) = self.border_color
            && self.border_width > 0
        {
            builder = builder.stroke_color(border).stroke_width(self.border_width);
        }

        builder.build()
    }
}

/// Button looks used by the card and its widgets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ButtonVariant {
    /// Accent fill: OK, Save, Add
    Primary,
    /// Outlined surface: Cancel, Edit, triggers
    Outline,
    /// Outlined surface with error-colored text: Delete
    Danger,
}

impl ButtonVariant {
    pub fn to_style(&self, palette: &ColorPalette) -> Style {
        match self {
            ButtonVariant::Primary => Style::new()
                .with_background(palette.primary)
                .with_foreground(WHITE)
                .with_border(palette.primary, 1),
            ButtonVariant::Outline => Style::panel(palette),
            ButtonVariant::Danger => Style::panel(palette).with_foreground(palette.error),
        }
    }
}

// src/ui/components/button.rs
//! Button component with various styles and states

use crate::ui::core::{Action, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::{ButtonVariant, ColorPalette, Style};
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoTextStyle, iso_8859_1::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};

/// Button state
#[derive(Debug, Clone, Copy, PartialEq)]
enum ButtonState {
    Normal,
    Pressed,
    Disabled,
}

/// Button component with label and action
///
/// Triggers its action immediately on press, shows a darker fill while the
/// pointer stays over it and returns to normal on release.
///
/// # Examples
/// ```ignore
/// let ok = Button::new(
///     Rectangle::new(Point::new(150, 300), Size::new(80, 40)),
///     "OK",
///     Action::Confirm,
/// )
/// .with_variant(ButtonVariant::Primary);
/// ```
pub struct Button {
    bounds: Rectangle,
    label: heapless::String<32>,
    action: Action,
    state: ButtonState,
    variant: ButtonVariant,
    palette: ColorPalette,
    border_radius: u32,
    dirty: bool,
}

impl Button {
    /// Create a new button. Labels longer than 32 bytes are truncated.
    pub fn new(bounds: Rectangle, label: &str, action: Action) -> Self {
        let mut button = Self {
            bounds,
            label: heapless::String::new(),
            action,
            state: ButtonState::Normal,
            variant: ButtonVariant::Outline,
            palette: ColorPalette::default(),
            border_radius: 8,
            dirty: true,
        };
        button.set_label(label);
        button
    }

    pub fn with_variant(mut self, variant: ButtonVariant) -> Self {
        self.variant = variant;
        self.dirty = true;
        self
    }

    pub fn with_palette(mut self, palette: ColorPalette) -> Self {
        self.palette = palette;
        self.dirty = true;
        self
    }

    /// Set the border radius for rounded corners. Default is 8 pixels.
    pub fn with_border_radius(mut self, radius: u32) -> Self {
        self.border_radius = radius;
        self.dirty = true;
        self
    }

    /// Replace the label, truncating at a character boundary if it does not fit.
    pub fn set_label(&mut self, label: &str) {
        let mut text = heapless::String::<32>::new();
        for ch in label.chars() {
            if text.push(ch).is_err() {
                break;
            }
        }
        if self.label != text {
            self.label = text;
            self.dirty = true;
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Disabled buttons don't respond to touch and are rendered dimmed.
    pub fn set_enabled(&mut self, enabled: bool) {
        let new_state = if enabled {
            ButtonState::Normal
        } else {
            ButtonState::Disabled
        };

        if self.state != new_state {
            self.state = new_state;
            self.dirty = true;
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.state, ButtonState::Disabled)
    }

    pub fn action(&self) -> Action {
        self.action
    }

    fn get_style(&self) -> Style {
        let base_style = self.variant.to_style(&self.palette);

        match self.state {
            ButtonState::Normal => base_style,
            ButtonState::Pressed => match self.variant {
                ButtonVariant::Primary => base_style.with_background(self.palette.primary_pressed),
                ButtonVariant::Outline | ButtonVariant::Danger => {
                    base_style.with_border(self.palette.primary, 1)
                }
            },
            ButtonState::Disabled => base_style
                .with_background(self.palette.surface)
                .with_foreground(self.palette.text_secondary),
        }
    }
}

impl Drawable for Button {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let style = self.get_style();

        let corner_radius = Size::new(self.border_radius, self.border_radius);
        RoundedRectangle::with_equal_corners(self.bounds, corner_radius)
            .into_styled(style.to_primitive_style())
            .draw(display)?;

        let text_color = style.foreground_color.unwrap_or(Rgb565::WHITE);
        let character_style = MonoTextStyle::new(&FONT_6X10, text_color);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();

        Text::with_text_style(&self.label, self.bounds.center(), character_style, text_style)
            .draw(display)?;

        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.bounds
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Touchable for Button {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        if !self.is_enabled() {
            return TouchResult::NotHandled;
        }

        match event {
            TouchEvent::Press(point) if self.contains_point(point) => {
                self.state = ButtonState::Pressed;
                self.dirty = true;

                // Trigger action immediately on press
                TouchResult::Action(self.action)
            }
            TouchEvent::Drag(point) if self.state == ButtonState::Pressed => {
                if !self.contains_point(point) {
                    self.state = ButtonState::Normal;
                    self.dirty = true;
                }
                TouchResult::Handled
            }
            TouchEvent::Release(_) if self.state == ButtonState::Pressed => {
                self.state = ButtonState::Normal;
                self.dirty = true;
                TouchResult::Handled
            }
            _ => TouchResult::NotHandled,
        }
    }
}

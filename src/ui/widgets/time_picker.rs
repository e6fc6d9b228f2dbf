// src/ui/widgets/time_picker.rs
//! Modal hour/minute picker
//!
//! Closed, the picker is a compact `HH:MM` button. Pressing it opens a modal
//! overlay with an hour wheel, a minute wheel and Cancel / OK buttons. Only OK
//! changes the committed value; Cancel and presses outside the overlay
//! content throw the session away.

use embassy_time::Instant;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use embedded_layout::align::{Align, horizontal, vertical};
use log::{debug, warn};

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::model::TimeOfDay;
use crate::ui::components::Button;
use crate::ui::core::{Action, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::{ButtonVariant, Style, Theme};
use crate::ui::widgets::wheel::WheelPicker;

const WHEEL_WIDTH: u32 = 72;
const SEPARATOR_WIDTH: u32 = 24;
const BUTTON_HEIGHT: u32 = 40;

/// State that only exists while the overlay is open.
struct PickerSession {
    content: Rectangle,
    hours: WheelPicker,
    minutes: WheelPicker,
    cancel: Button,
    confirm: Button,
    /// Waiting for the first `update` to position the wheels
    layout_pending: bool,
}

impl PickerSession {
    fn draft(&self) -> TimeOfDay {
        TimeOfDay::new(self.hours.value() as u8, self.minutes.value() as u8)
            .unwrap_or(TimeOfDay::MIDNIGHT)
    }
}

pub struct TimePicker {
    trigger: Button,
    value: TimeOfDay,
    session: Option<PickerSession>,
    /// Area covered by the modal scrim
    viewport: Rectangle,
    config: WidgetConfig,
    theme: Theme,
    dirty: bool,
}

impl TimePicker {
    /// Create a closed picker showing `00:00`.
    ///
    /// The wheel configuration is checked here so a bad config never gets as
    /// far as an open overlay.
    pub fn new(
        trigger_bounds: Rectangle,
        viewport: Rectangle,
        config: WidgetConfig,
    ) -> Result<Self, WidgetError> {
        config.validate()?;
        config.validate_rows(60)?;

        let value = TimeOfDay::MIDNIGHT;
        let trigger = Button::new(trigger_bounds, &value.to_label(), Action::OpenTimePicker);

        Ok(Self {
            trigger,
            value,
            session: None,
            viewport,
            config,
            theme: Theme::default(),
            dirty: true,
        })
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.trigger = self.trigger.with_palette(theme.palette);
        self.theme = theme;
        self
    }

    /// Committed value.
    pub fn value(&self) -> TimeOfDay {
        self.value
    }

    /// Replace the committed value from the host. Does not touch an open session.
    pub fn set_value(&mut self, value: TimeOfDay) {
        if self.value != value {
            self.value = value;
            self.trigger.set_label(&value.to_label());
            self.dirty = true;
        }
    }

    /// Accept an `HH:MM` string from the host; malformed input shows `00:00`.
    pub fn set_value_str(&mut self, text: &str) {
        self.set_value(TimeOfDay::parse_lossy(text));
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Values currently snapped in the open wheels.
    pub fn draft(&self) -> Option<TimeOfDay> {
        self.session.as_ref().map(PickerSession::draft)
    }

    /// Bounds of the overlay content panel while open.
    pub fn content_bounds(&self) -> Option<Rectangle> {
        self.session.as_ref().map(|s| s.content)
    }

    /// Hour and minute wheels while open.
    pub fn wheels(&self) -> Option<(&WheelPicker, &WheelPicker)> {
        self.session.as_ref().map(|s| (&s.hours, &s.minutes))
    }

    /// Cancel and OK button bounds while open.
    pub fn button_bounds(&self) -> Option<(Rectangle, Rectangle)> {
        self.session
            .as_ref()
            .map(|s| (s.cancel.bounds(), s.confirm.bounds()))
    }

    /// Open the overlay with both wheels seeded from the committed value.
    ///
    /// The wheels are positioned on the next [`Self::update`].
    pub fn open(&mut self) -> Result<(), WidgetError> {
        let pad = self.theme.spacing.modal_padding;
        let gap = self.theme.spacing.gap;
        let window = self.config.wheel_window_height();

        let width = 2 * pad + 2 * WHEEL_WIDTH + SEPARATOR_WIDTH;
        let height = 3 * pad + window + BUTTON_HEIGHT;
        let content = Rectangle::new(Point::zero(), Size::new(width, height)).align_to(
            &self.viewport,
            horizontal::Center,
            vertical::Center,
        );

        let wheels_origin = content.top_left + Point::new(pad as i32, pad as i32);
        let mut hours = WheelPicker::new(wheels_origin, WHEEL_WIDTH, 24, &self.config)?;
        let mut minutes = WheelPicker::new(
            wheels_origin + Point::new((WHEEL_WIDTH + SEPARATOR_WIDTH) as i32, 0),
            WHEEL_WIDTH,
            60,
            &self.config,
        )?;
        hours.set_initial(self.value.hour() as i32);
        minutes.set_initial(self.value.minute() as i32);

        let labels = self.config.locale.labels();
        let button_y = wheels_origin.y + (window + pad) as i32;
        let button_width = (width - 2 * pad - gap) / 2;
        let button_size = Size::new(button_width, BUTTON_HEIGHT);

        let cancel = Button::new(
            Rectangle::new(Point::new(wheels_origin.x, button_y), button_size),
            labels.cancel,
            Action::Dismiss,
        )
        .with_palette(self.theme.palette)
        .with_border_radius(self.theme.border_radius.control);
        let confirm = Button::new(
            Rectangle::new(
                Point::new(wheels_origin.x + (button_width + gap) as i32, button_y),
                button_size,
            ),
            labels.confirm,
            Action::Confirm,
        )
        .with_variant(ButtonVariant::Primary)
        .with_palette(self.theme.palette)
        .with_border_radius(self.theme.border_radius.control);

        self.session = Some(PickerSession {
            content,
            hours,
            minutes,
            cancel,
            confirm,
            layout_pending: true,
        });
        self.dirty = true;
        debug!("Time picker opened at {}", self.value);
        Ok(())
    }

    /// Close without touching the committed value.
    pub fn cancel(&mut self) {
        if self.session.take().is_some() {
            self.dirty = true;
            debug!("Time picker cancelled, keeping {}", self.value);
        }
    }

    /// Commit the snapped wheel values and close.
    ///
    /// Returns `None` if the picker was not open.
    pub fn confirm(&mut self) -> Option<TimeOfDay> {
        let session = self.session.take()?;
        let value = session.draft();
        self.set_value(value);
        self.dirty = true;
        debug!("Time picker confirmed {}", value);
        Some(value)
    }

    /// Drive layout, debounce and settle animation of the open wheels.
    pub fn update(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if session.layout_pending {
            session.layout_pending = false;
            session.hours.layout_ready();
            session.minutes.layout_ready();
        }

        let hour = session.hours.update(now);
        let minute = session.minutes.update(now);
        if hour.is_some() || minute.is_some() {
            debug!("Time picker draft is now {}", session.draft());
        }

        if session.hours.is_dirty() || session.minutes.is_dirty() {
            self.dirty = true;
        }
    }

    fn handle_open_touch(&mut self, event: TouchEvent) -> TouchResult {
        let Some(session) = self.session.as_mut() else {
            return TouchResult::NotHandled;
        };

        match event {
            TouchEvent::Press(point) => {
                if !session.content.contains(point.to_point()) {
                    self.cancel();
                    return TouchResult::Handled;
                }
                if let TouchResult::Action(Action::Dismiss) = session.cancel.handle_touch(event) {
                    self.cancel();
                    return TouchResult::Handled;
                }
                if let TouchResult::Action(Action::Confirm) = session.confirm.handle_touch(event) {
                    return match self.confirm() {
                        Some(value) => TouchResult::Action(Action::TimeChanged(value)),
                        None => TouchResult::Handled,
                    };
                }
                session.hours.handle_touch(event);
                session.minutes.handle_touch(event);
            }
            TouchEvent::Drag(_) | TouchEvent::Release(_) => {
                session.hours.handle_touch(event);
                session.minutes.handle_touch(event);
                session.cancel.handle_touch(event);
                session.confirm.handle_touch(event);
                self.trigger.handle_touch(event);
            }
            TouchEvent::Scroll { .. } => {
                session.hours.handle_touch(event);
                session.minutes.handle_touch(event);
            }
        }

        self.dirty = true;
        // The overlay is modal: nothing behind it sees the event
        TouchResult::Handled
    }
}

impl Drawable for TimePicker {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.trigger.draw(display)?;

        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let palette = &self.theme.palette;

        self.viewport
            .into_styled(PrimitiveStyle::with_fill(palette.scrim))
            .draw(display)?;

        let radius = self.theme.border_radius.modal;
        RoundedRectangle::with_equal_corners(session.content, Size::new(radius, radius))
            .into_styled(Style::panel(palette).to_primitive_style())
            .draw(display)?;

        session.hours.draw(display)?;
        session.minutes.draw(display)?;

        let hours = session.hours.bounds();
        let colon = Point::new(
            hours.top_left.x + (WHEEL_WIDTH + SEPARATOR_WIDTH / 2) as i32,
            hours.center().y,
        );
        Text::with_text_style(
            ":",
            colon,
            MonoTextStyle::new(&FONT_10X20, palette.text_primary),
            TextStyleBuilder::new()
                .alignment(Alignment::Center)
                .baseline(Baseline::Middle)
                .build(),
        )
        .draw(display)?;

        session.cancel.draw(display)?;
        session.confirm.draw(display)?;
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        match self.session {
            Some(_) => self.viewport,
            None => self.trigger.bounds(),
        }
    }

    fn is_dirty(&self) -> bool {
        self.dirty || self.trigger.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.dirty = false;
        self.trigger.mark_clean();
        if let Some(session) = self.session.as_mut() {
            session.hours.mark_clean();
            session.minutes.mark_clean();
            session.cancel.mark_clean();
            session.confirm.mark_clean();
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl Touchable for TimePicker {
    fn contains_point(&self, point: TouchPoint) -> bool {
        match self.session {
            Some(_) => true,
            None => self.trigger.contains_point(point),
        }
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        if self.is_open() {
            return self.handle_open_touch(event);
        }

        match self.trigger.handle_touch(event) {
            TouchResult::Action(Action::OpenTimePicker) => {
                if let Err(e) = self.open() {
                    warn!("Time picker failed to open: {}", e);
                }
                TouchResult::Handled
            }
            other => other,
        }
    }
}

// src/ui/widgets/weekday_selector.rs
//! Dropdown multi-select over the seven weekdays
//!
//! The trigger shows the summary of the current set. Its flyout lists every
//! day with a checkbox, and each press commits immediately: there is no
//! confirm step. The flyout opens towards whichever side of the trigger has
//! room, re-measured on every open.

use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::{MonoTextStyle, iso_8859_1::FONT_6X10};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyleBuilder, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::{debug, warn};

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::model::{Weekday, WeekdaySet};
use crate::summary::{SUMMARY_CAPACITY, summarize};
use crate::ui::core::{Action, Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::pointer::{ListenerId, PointerHub};
use crate::ui::styling::{Style, Theme};

/// Height of one day row in the flyout.
pub const FLYOUT_ROW_HEIGHT: u32 = 32;
const CHECKBOX_SIZE: u32 = 14;

/// Side of the trigger the flyout opens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlyoutDirection {
    Up,
    Down,
}

/// Pick the flyout side for a trigger inside a viewport of the given height.
///
/// Opens upward only when the space below is under `threshold` and the space
/// above is larger than the space below.
pub fn flyout_direction(trigger: Rectangle, viewport_height: u32, threshold: u32) -> FlyoutDirection {
    let top = trigger.top_left.y;
    let bottom = top + trigger.size.height as i32;
    let space_above = top.max(0);
    let space_below = (viewport_height as i32 - bottom).max(0);

    if space_below < threshold as i32 && space_above > space_below {
        FlyoutDirection::Up
    } else {
        FlyoutDirection::Down
    }
}

pub struct WeekdaySelector {
    trigger: Rectangle,
    value: WeekdaySet,
    open: bool,
    direction: FlyoutDirection,
    viewport_height: u32,
    listener: Option<ListenerId>,
    config: WidgetConfig,
    theme: Theme,
    dirty: bool,
}

impl WeekdaySelector {
    pub fn new(trigger: Rectangle, viewport_height: u32, config: WidgetConfig) -> Self {
        Self {
            trigger,
            value: WeekdaySet::EMPTY,
            open: false,
            direction: FlyoutDirection::Down,
            viewport_height,
            listener: None,
            config,
            theme: Theme::default(),
            dirty: true,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn value(&self) -> WeekdaySet {
        self.value
    }

    pub fn set_value(&mut self, value: WeekdaySet) {
        if self.value != value {
            self.value = value;
            self.dirty = true;
        }
    }

    /// Trigger label for the current set.
    pub fn summary(&self) -> heapless::String<SUMMARY_CAPACITY> {
        summarize(self.value, self.config.locale)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn direction(&self) -> FlyoutDirection {
        self.direction
    }

    /// Open (measuring the viewport first) or close the flyout.
    pub fn toggle_open(&mut self, viewport_height: u32) {
        if self.open {
            self.close();
            return;
        }

        self.viewport_height = viewport_height;
        self.direction = flyout_direction(
            self.trigger,
            viewport_height,
            self.config.flyout_threshold_px,
        );
        self.open = true;
        self.dirty = true;
        debug!("Weekday flyout opened {:?}", self.direction);
    }

    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            self.dirty = true;
            debug!("Weekday flyout closed");
        }
    }

    /// Flip one day and return the full updated set.
    ///
    /// Day ids outside 1..=7 are ignored and return `None`.
    pub fn toggle_weekday(&mut self, day: u8) -> Option<WeekdaySet> {
        let Some(weekday) = Weekday::new(day) else {
            warn!("Ignoring toggle of invalid weekday {}", day);
            return None;
        };

        self.value.toggle(weekday);
        self.dirty = true;
        debug!("Weekday {} toggled, set is now {:?}", day, self.value);
        Some(self.value)
    }

    /// Start listening for presses anywhere on screen.
    pub fn attach(&mut self, hub: &mut PointerHub) -> Result<(), WidgetError> {
        if self.listener.is_none() {
            self.listener = Some(hub.subscribe()?);
        }
        Ok(())
    }

    /// Stop listening; the flyout closes with it.
    pub fn detach(&mut self, hub: &mut PointerHub) {
        if let Some(id) = self.listener.take() {
            hub.unsubscribe(id);
        }
        self.close();
    }

    pub fn is_attached(&self) -> bool {
        self.listener.is_some()
    }

    /// Drain the latest screen press and close the flyout if it landed
    /// outside the trigger and flyout. Returns `true` when the flyout closed.
    pub fn process_outside(&mut self, hub: &mut PointerHub) -> bool {
        let Some(id) = self.listener else {
            return false;
        };
        let Some(point) = hub.take(id) else {
            return false;
        };

        if self.open && !self.contains_point(point) {
            debug!("Press outside weekday selector, closing flyout");
            self.close();
            true
        } else {
            false
        }
    }

    /// Flyout rectangle on the side chosen at the last open.
    pub fn flyout_bounds(&self) -> Rectangle {
        let gap = self.config.flyout_gap_px as i32;
        let size = Size::new(self.trigger.size.width, FLYOUT_ROW_HEIGHT * 7);
        let y = match self.direction {
            FlyoutDirection::Down => self.trigger.top_left.y + self.trigger.size.height as i32 + gap,
            FlyoutDirection::Up => self.trigger.top_left.y - gap - size.height as i32,
        };
        Rectangle::new(Point::new(self.trigger.top_left.x, y), size)
    }

    /// Flyout row of one day.
    pub fn row_bounds(&self, weekday: Weekday) -> Rectangle {
        let flyout = self.flyout_bounds();
        Rectangle::new(
            flyout.top_left + Point::new(0, (weekday.index() as u32 * FLYOUT_ROW_HEIGHT) as i32),
            Size::new(flyout.size.width, FLYOUT_ROW_HEIGHT),
        )
    }

    fn row_at(&self, point: TouchPoint) -> Option<Weekday> {
        let flyout = self.flyout_bounds();
        let p = point.to_point();
        if !flyout.contains(p) {
            return None;
        }
        let row = (p.y - flyout.top_left.y) as u32 / FLYOUT_ROW_HEIGHT;
        Weekday::new(row as u8 + 1)
    }

    fn draw_trigger<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let palette = &self.theme.palette;
        let radius = self.theme.border_radius.control;
        let border = if self.open { palette.primary } else { palette.border };

        RoundedRectangle::with_equal_corners(self.trigger, Size::new(radius, radius))
            .into_styled(
                Style::panel(palette)
                    .with_border(border, 1)
                    .to_primitive_style(),
            )
            .draw(display)?;

        let pad = self.theme.spacing.gap as i32;
        let middle = self.trigger.center().y;
        let text = MonoTextStyle::new(&FONT_6X10, palette.text_primary);

        Text::with_baseline(
            &self.summary(),
            Point::new(self.trigger.top_left.x + pad, middle),
            text,
            Baseline::Middle,
        )
        .draw(display)?;

        let caret = if self.open { "^" } else { "v" };
        Text::with_text_style(
            caret,
            Point::new(
                self.trigger.top_left.x + self.trigger.size.width as i32 - pad,
                middle,
            ),
            MonoTextStyle::new(&FONT_6X10, palette.text_secondary),
            TextStyleBuilder::new()
                .alignment(Alignment::Right)
                .baseline(Baseline::Middle)
                .build(),
        )
        .draw(display)?;

        Ok(())
    }

    fn draw_flyout<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let palette = &self.theme.palette;
        let radius = self.theme.border_radius.control;
        let labels = self.config.locale.labels();
        let pad = self.theme.spacing.gap as i32;

        RoundedRectangle::with_equal_corners(self.flyout_bounds(), Size::new(radius, radius))
            .into_styled(Style::panel(palette).to_primitive_style())
            .draw(display)?;

        let check_radius = self.theme.border_radius.checkbox;
        for weekday in Weekday::ALL {
            let row = self.row_bounds(weekday);
            let middle = row.center().y;
            let checked = self.value.contains(weekday);

            let mut box_style = PrimitiveStyleBuilder::new().stroke_width(1);
            box_style = if checked {
                box_style.stroke_color(palette.primary).fill_color(palette.primary)
            } else {
                box_style.stroke_color(palette.border)
            };
            let checkbox = Rectangle::new(
                Point::new(row.top_left.x + pad, middle - CHECKBOX_SIZE as i32 / 2),
                Size::new(CHECKBOX_SIZE, CHECKBOX_SIZE),
            );
            RoundedRectangle::with_equal_corners(checkbox, Size::new(check_radius, check_radius))
                .into_styled(box_style.build())
                .draw(display)?;

            Text::with_baseline(
                labels.full_days[weekday.index()],
                Point::new(checkbox.top_left.x + CHECKBOX_SIZE as i32 + pad, middle),
                MonoTextStyle::new(&FONT_6X10, palette.text_primary),
                Baseline::Middle,
            )
            .draw(display)?;
        }

        Ok(())
    }
}

impl Drawable for WeekdaySelector {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        self.draw_trigger(display)?;
        if self.open {
            self.draw_flyout(display)?;
        }
        Ok(())
    }

    fn bounds(&self) -> Rectangle {
        self.trigger
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

impl Touchable for WeekdaySelector {
    fn contains_point(&self, point: TouchPoint) -> bool {
        let p = point.to_point();
        self.trigger.contains(p) || (self.open && self.flyout_bounds().contains(p))
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        let TouchEvent::Press(point) = event else {
            return TouchResult::NotHandled;
        };

        if self.trigger.contains(point.to_point()) {
            self.toggle_open(self.viewport_height);
            return TouchResult::Handled;
        }

        if self.open
            && let Some(weekday) = self.row_at(point)
            && let Some(set) = self.toggle_weekday(weekday.number())
        {
            return TouchResult::Action(Action::WeekdaysChanged(set));
        }

        TouchResult::NotHandled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use embedded_graphics::mock_display::MockDisplay;

    const VIEWPORT: u32 = 480;

    fn touch(p: Point) -> TouchPoint {
        TouchPoint::new(p.x as u16, p.y as u16)
    }

    fn selector_at(y: i32) -> WeekdaySelector {
        let mut selector = WeekdaySelector::new(
            Rectangle::new(Point::new(20, y), Size::new(200, 32)),
            VIEWPORT,
            WidgetConfig::default(),
        );
        selector.set_value(WeekdaySet::from_days(&[1, 3, 5]));
        selector
    }

    #[test]
    fn opens_up_near_bottom_of_short_viewport() {
        let trigger = Rectangle::new(Point::new(0, 440), Size::new(100, 32));
        assert_eq!(flyout_direction(trigger, 480, 250), FlyoutDirection::Up);
    }

    #[test]
    fn opens_down_with_room_below() {
        let trigger = Rectangle::new(Point::new(0, 20), Size::new(100, 32));
        assert_eq!(flyout_direction(trigger, 480, 250), FlyoutDirection::Down);
    }

    #[test]
    fn stays_down_when_above_is_even_tighter() {
        let trigger = Rectangle::new(Point::new(0, 100), Size::new(100, 200));
        assert_eq!(flyout_direction(trigger, 500, 250), FlyoutDirection::Down);
    }

    #[test]
    fn direction_is_measured_on_every_open() {
        let mut selector = selector_at(300);
        selector.toggle_open(VIEWPORT);
        assert_eq!(selector.direction(), FlyoutDirection::Up);
        selector.toggle_open(VIEWPORT);
        assert!(!selector.is_open());

        selector.toggle_open(1_000);
        assert_eq!(selector.direction(), FlyoutDirection::Down);
    }

    #[test]
    fn upward_flyout_sits_above_trigger() {
        let mut selector = selector_at(400);
        selector.toggle_open(VIEWPORT);
        let flyout = selector.flyout_bounds();
        assert_eq!(flyout.top_left.y + flyout.size.height as i32 + 6, 400);
    }

    #[test]
    fn toggling_a_day_twice_restores_the_set() {
        let mut selector = selector_at(20);
        let original = selector.value();
        selector.handle_touch(TouchEvent::Press(TouchPoint::new(30, 30)));
        assert!(selector.is_open());

        let tuesday = selector.row_bounds(Weekday::TUESDAY).center();
        let mut events = Vec::new();
        for _ in 0..2 {
            if let TouchResult::Action(Action::WeekdaysChanged(set)) =
                selector.handle_touch(TouchEvent::Press(touch(tuesday)))
            {
                events.push(set);
            }
        }

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], WeekdaySet::from_days(&[1, 2, 3, 5]));
        assert_eq!(events[1], original);
        assert_eq!(selector.value(), original);
    }

    #[test]
    fn invalid_day_is_a_no_op() {
        let mut selector = selector_at(20);
        assert_eq!(selector.toggle_weekday(0), None);
        assert_eq!(selector.toggle_weekday(8), None);
        assert_eq!(selector.value(), WeekdaySet::from_days(&[1, 3, 5]));
    }

    #[test]
    fn summary_follows_the_set() {
        let mut selector = selector_at(20);
        assert_eq!(selector.summary().as_str(), "Mo, We, Fr");
        selector.set_value(WeekdaySet::WORKDAYS);
        assert_eq!(selector.summary().as_str(), "Mon–Fri");
    }

    #[test]
    fn outside_press_closes_without_change() {
        let mut hub = PointerHub::new();
        let mut selector = selector_at(20);
        selector.attach(&mut hub).unwrap();
        selector.toggle_open(VIEWPORT);

        hub.publish(TouchPoint::new(300, 460));
        assert!(selector.process_outside(&mut hub));
        assert!(!selector.is_open());
        assert_eq!(selector.value(), WeekdaySet::from_days(&[1, 3, 5]));
    }

    #[test]
    fn press_inside_keeps_flyout_open() {
        let mut hub = PointerHub::new();
        let mut selector = selector_at(20);
        selector.attach(&mut hub).unwrap();
        selector.toggle_open(VIEWPORT);

        hub.publish(touch(selector.row_bounds(Weekday::FRIDAY).center()));
        assert!(!selector.process_outside(&mut hub));
        assert!(selector.is_open());
    }

    #[test]
    fn outside_press_while_closed_is_ignored() {
        let mut hub = PointerHub::new();
        let mut selector = selector_at(20);
        selector.attach(&mut hub).unwrap();

        hub.publish(TouchPoint::new(300, 460));
        assert!(!selector.process_outside(&mut hub));
        assert!(!selector.is_open());

        // The drained press must not close a flyout opened afterwards
        selector.toggle_open(VIEWPORT);
        assert!(!selector.process_outside(&mut hub));
        assert!(selector.is_open());
    }

    #[test]
    fn detach_releases_the_listener() {
        let mut hub = PointerHub::new();
        let mut selector = selector_at(20);
        selector.attach(&mut hub).unwrap();
        selector.attach(&mut hub).unwrap();
        assert_eq!(hub.listener_count(), 1);

        selector.toggle_open(VIEWPORT);
        selector.detach(&mut hub);
        assert_eq!(hub.listener_count(), 0);
        assert!(!selector.is_open());

        selector.toggle_open(VIEWPORT);
        hub.publish(TouchPoint::new(300, 460));
        assert!(!selector.process_outside(&mut hub));
        assert!(selector.is_open());
    }

    #[test]
    fn draws_trigger_and_flyout() {
        let mut selector = WeekdaySelector::new(
            Rectangle::new(Point::new(0, 0), Size::new(60, 16)),
            VIEWPORT,
            WidgetConfig::default(),
        );
        selector.toggle_open(VIEWPORT);

        let mut display = MockDisplay::<Rgb565>::new();
        display.set_allow_overdraw(true);
        display.set_allow_out_of_bounds_drawing(true);
        selector.draw(&mut display).unwrap();

        assert!(display.affected_area().size.height > 16);
    }
}

// src/ui/widgets/wheel.rs
//! Scroll wheel over a cyclic integer range
//!
//! The wheel lays out `repeat_factor` copies of `0..item_count` back to back
//! and starts in the middle copy, so the user can scroll a good distance in
//! either direction before reaching a physical end. Scrolling moves a raw
//! pixel offset freely; once input has been quiet for the debounce delay the
//! offset is rounded to the nearest row, the row glides into the centre and
//! the wrapped logical value is reported.
//!
//! Offsets are measured so that raw row `i` sits on the centre line when
//! `offset == i * item_extent`.

use core::fmt::Write;

use embassy_time::Instant;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::draw_target::DrawTargetExt;
use embedded_graphics::mono_font::{MonoTextStyle, ascii::FONT_10X20};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, PrimitiveStyleBuilder, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::debug;

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::ui::core::{Drawable, TouchEvent, TouchPoint, TouchResult, Touchable};
use crate::ui::styling::{COLOR_ACCENT, COLOR_SURFACE, TEXT_DIMMED, WHITE};
use crate::ui::timer::Debounce;

/// Raw row nearest to `offset`, rounding exact halves away from zero.
pub fn nearest_index(offset: i32, extent: u32) -> i32 {
    let extent = extent as i32;
    let half = extent / 2;
    if offset >= 0 {
        (offset + half) / extent
    } else {
        -((-offset + half) / extent)
    }
}

/// Wrap a raw row index into `0..item_count`.
pub fn logical_value(raw: i32, item_count: u16) -> u16 {
    raw.rem_euclid(item_count as i32) as u16
}

/// Resolve an offset to its nearest raw row and that row's logical value.
pub fn resolve_offset(offset: i32, extent: u32, item_count: u16) -> (i32, u16) {
    let raw = nearest_index(offset, extent);
    (raw, logical_value(raw, item_count))
}

/// Motion state of a wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelPhase {
    /// Resting exactly on a row
    Idle,
    /// User input is moving the offset; a snap is pending
    Scrolling,
    /// Gliding towards the snapped row
    Settling,
}

/// A single scrollable column of repeated values.
pub struct WheelPicker {
    bounds: Rectangle,
    item_count: u16,
    item_extent: u32,
    repeat_factor: u8,
    offset: i32,
    target: i32,
    active_raw: i32,
    value: u16,
    pending_initial: Option<u16>,
    phase: WheelPhase,
    debounce: Debounce,
    last_touch: Option<TouchPoint>,
    /// Timestamp of the latest `update` tick, used for touch-driven scrolling
    clock: Instant,
    dirty: bool,
}

impl WheelPicker {
    /// Build a wheel whose viewing window starts at `origin`.
    ///
    /// Fails when `item_count` is zero or the config breaks the wheel
    /// geometry invariants.
    pub fn new(
        origin: Point,
        width: u32,
        item_count: u16,
        config: &WidgetConfig,
    ) -> Result<Self, WidgetError> {
        config.validate()?;
        if item_count == 0 {
            return Err(WidgetError::InvalidItemCount);
        }
        config.validate_rows(item_count)?;

        let bounds = Rectangle::new(origin, Size::new(width, config.wheel_window_height()));
        let mut wheel = Self {
            bounds,
            item_count,
            item_extent: config.item_extent_px,
            repeat_factor: config.repeat_factor,
            offset: 0,
            target: 0,
            active_raw: 0,
            value: 0,
            pending_initial: None,
            phase: WheelPhase::Idle,
            debounce: Debounce::new(config.snap_debounce()),
            last_touch: None,
            clock: Instant::from_ticks(0),
            dirty: true,
        };
        wheel.jump_to(wheel.middle_start());
        Ok(wheel)
    }

    pub fn item_count(&self) -> u16 {
        self.item_count
    }

    /// Last snapped logical value.
    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Raw index of the one highlighted row.
    pub fn active_raw(&self) -> i32 {
        self.active_raw
    }

    /// Only the row at the snapped raw index is active, never its copies.
    pub fn is_active(&self, raw: i32) -> bool {
        raw == self.active_raw
    }

    /// Record the value to show once the wheel is laid out.
    ///
    /// Out-of-range values wrap. Nothing moves until [`Self::layout_ready`].
    pub fn set_initial(&mut self, value: i32) {
        self.pending_initial = Some(logical_value(value, self.item_count));
    }

    pub fn has_pending_initial(&self) -> bool {
        self.pending_initial.is_some()
    }

    /// Layout is complete: place the pending initial value on the centre line
    /// of the middle copy and snap, returning the resulting value.
    pub fn layout_ready(&mut self) -> Option<u16> {
        let value = self.pending_initial.take()?;
        self.jump_to(self.middle_start() + value as i32);
        Some(self.snap())
    }

    /// Move the content by `delta_px` (positive scrolls towards later rows).
    pub fn scroll_by(&mut self, delta_px: i32, now: Instant) {
        self.offset = (self.offset + delta_px).clamp(0, self.max_offset());
        self.phase = WheelPhase::Scrolling;
        self.debounce.restart(now);
        self.dirty = true;
    }

    /// Round the current offset to the nearest row and start gliding to it.
    pub fn snap(&mut self) -> u16 {
        self.debounce.cancel();

        let (raw, value) = resolve_offset(self.offset, self.item_extent, self.item_count);
        let raw = raw.clamp(0, self.total_rows() - 1);
        self.target = raw * self.item_extent as i32;
        self.active_raw = raw;
        self.value = value;
        self.phase = if self.offset == self.target {
            WheelPhase::Idle
        } else {
            WheelPhase::Settling
        };
        self.dirty = true;

        debug!("Wheel snapped to row {} (value {})", raw, value);
        value
    }

    /// Advance timers and animation. Returns the new value when a debounced
    /// snap fires.
    pub fn update(&mut self, now: Instant) -> Option<u16> {
        self.clock = now;

        if self.debounce.poll(now) {
            return Some(self.snap());
        }

        if self.phase == WheelPhase::Settling {
            let step = (self.target - self.offset) / 2;
            if step == 0 {
                self.offset = self.target;
                self.phase = WheelPhase::Idle;
            } else {
                self.offset += step;
            }
            self.dirty = true;
        }

        None
    }

    fn jump_to(&mut self, raw: i32) {
        self.offset = raw * self.item_extent as i32;
        self.target = self.offset;
        self.active_raw = raw;
        self.value = logical_value(raw, self.item_count);
        self.phase = WheelPhase::Idle;
        self.dirty = true;
    }

    fn total_rows(&self) -> i32 {
        self.item_count as i32 * self.repeat_factor as i32
    }

    fn middle_start(&self) -> i32 {
        (self.repeat_factor / 2) as i32 * self.item_count as i32
    }

    fn max_offset(&self) -> i32 {
        (self.total_rows() - 1) * self.item_extent as i32
    }

    /// Highlighted band across the centre row of the window.
    pub fn indicator_band(&self) -> Rectangle {
        let top = self.bounds.center().y - self.item_extent as i32 / 2;
        Rectangle::new(
            Point::new(self.bounds.top_left.x, top),
            Size::new(self.bounds.size.width, self.item_extent),
        )
    }

    fn visible_rows(&self) -> (i32, i32) {
        let extent = self.item_extent as i32;
        let half_window = self.bounds.size.height as i32 / 2;
        let first = ((self.offset - half_window) / extent - 1).max(0);
        let last = ((self.offset + half_window) / extent + 1).min(self.total_rows() - 1);
        (first, last)
    }
}

impl Drawable for WheelPicker {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        let mut window = display.clipped(&self.bounds);

        self.bounds
            .into_styled(PrimitiveStyle::with_fill(COLOR_SURFACE))
            .draw(&mut window)?;

        self.indicator_band()
            .into_styled(
                PrimitiveStyleBuilder::new()
                    .stroke_color(COLOR_ACCENT)
                    .stroke_width(1)
                    .build(),
            )
            .draw(&mut window)?;

        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        let center = self.bounds.center();
        let (first, last) = self.visible_rows();

        for raw in first..=last {
            let y = center.y + raw * self.item_extent as i32 - self.offset;
            let mut label = heapless::String::<8>::new();
            write!(label, "{:02}", logical_value(raw, self.item_count)).ok();

            let color = if self.is_active(raw) { WHITE } else { TEXT_DIMMED };
            Text::with_text_style(
                &label,
                Point::new(center.x, y),
                MonoTextStyle::new(&FONT_10X20, color),
                text_style,
            )
            .draw(&mut window)?;
        }

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

impl Touchable for WheelPicker {
    fn contains_point(&self, point: TouchPoint) -> bool {
        self.bounds.contains(point.to_point())
    }

    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult {
        match event {
            TouchEvent::Press(point) if self.contains_point(point) => {
                self.last_touch = Some(point);
                TouchResult::Handled
            }
            TouchEvent::Drag(point) => match self.last_touch {
                Some(last) => {
                    // Dragging down reveals earlier rows
                    let delta_y = point.y as i32 - last.y as i32;
                    self.scroll_by(-delta_y, self.clock);
                    self.last_touch = Some(point);
                    TouchResult::Handled
                }
                None => TouchResult::NotHandled,
            },
            TouchEvent::Release(_) if self.last_touch.is_some() => {
                self.last_touch = None;
                TouchResult::Handled
            }
            TouchEvent::Scroll { point, delta_y } if self.contains_point(point) => {
                self.scroll_by(delta_y, self.clock);
                TouchResult::Handled
            }
            _ => TouchResult::NotHandled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn wheel(count: u16) -> WheelPicker {
        WheelPicker::new(Point::zero(), 60, count, &WidgetConfig::default()).unwrap()
    }

    fn settle(wheel: &mut WheelPicker, mut now: u64) {
        for _ in 0..32 {
            now += 16;
            wheel.update(at(now));
            if wheel.phase() == WheelPhase::Idle {
                return;
            }
        }
        panic!("wheel never settled");
    }

    #[test]
    fn initial_value_round_trips_for_every_value() {
        for count in [24u16, 60] {
            let mut w = wheel(count);
            for v in 0..count {
                w.set_initial(v as i32);
                assert_eq!(w.layout_ready(), Some(v));
                assert_eq!(w.value(), v);
                assert_eq!(w.phase(), WheelPhase::Idle);
            }
        }
    }

    #[test]
    fn initial_value_sits_in_middle_copy() {
        let mut w = wheel(24);
        w.set_initial(7);
        w.layout_ready();
        assert_eq!(w.active_raw(), 24 + 7);
        assert_eq!(w.offset(), (24 + 7) * 48);
    }

    #[test]
    fn set_initial_waits_for_layout() {
        let mut w = wheel(60);
        w.set_initial(30);
        assert!(w.has_pending_initial());
        assert_eq!(w.value(), 0);
        assert_eq!(w.layout_ready(), Some(30));
        assert_eq!(w.layout_ready(), None);
    }

    #[test]
    fn set_initial_wraps_out_of_range_values() {
        let mut w = wheel(24);
        w.set_initial(25);
        assert_eq!(w.layout_ready(), Some(1));
        w.set_initial(-1);
        assert_eq!(w.layout_ready(), Some(23));
    }

    #[test]
    fn logical_value_wraps_negative_and_over_range() {
        assert_eq!(logical_value(-1, 24), 23);
        assert_eq!(logical_value(-25, 24), 23);
        assert_eq!(logical_value(-24, 24), 0);
        assert_eq!(logical_value(49, 24), 1);
        assert_eq!(logical_value(179, 60), 59);
    }

    #[test]
    fn resolve_offset_stays_in_range() {
        for offset in (-5_000..5_000).step_by(7) {
            let (raw, value) = resolve_offset(offset, 48, 24);
            assert!(value < 24);
            assert_eq!(value, logical_value(raw, 24));
        }
    }

    #[test]
    fn exact_halves_round_away_from_zero() {
        assert_eq!(nearest_index(24, 48), 1);
        assert_eq!(nearest_index(23, 48), 0);
        assert_eq!(nearest_index(72, 48), 2);
        assert_eq!(nearest_index(-24, 48), -1);
        assert_eq!(nearest_index(-23, 48), 0);
    }

    #[test]
    fn only_final_position_of_a_burst_is_snapped() {
        let mut w = wheel(24);
        let start = w.offset();

        w.scroll_by(30, at(0));
        assert_eq!(w.update(at(40)), None);
        w.scroll_by(30, at(50));
        assert_eq!(w.phase(), WheelPhase::Scrolling);
        assert_eq!(w.update(at(100)), None);

        // 60px past the start rounds to the next row
        assert_eq!(w.update(at(130)), Some(1));
        assert_eq!(w.phase(), WheelPhase::Settling);
        assert_eq!(w.update(at(200)), None);

        settle(&mut w, 200);
        assert_eq!(w.offset(), start + 48);
        assert_eq!(w.value(), 1);
    }

    #[test]
    fn exactly_one_copy_is_active() {
        let mut w = wheel(24);
        w.set_initial(5);
        w.layout_ready();

        assert!(w.is_active(29));
        assert!(!w.is_active(5));
        assert!(!w.is_active(53));
    }

    #[test]
    fn scrolling_back_wraps_below_zero() {
        let mut w = wheel(60);
        w.scroll_by(-48, at(0));
        assert_eq!(w.update(at(80)), Some(59));
    }

    #[test]
    fn scroll_is_clamped_to_physical_list() {
        let mut w = wheel(24);
        w.scroll_by(-100_000, at(0));
        assert_eq!(w.offset(), 0);
        assert_eq!(w.snap(), 0);

        w.scroll_by(100_000, at(10));
        assert_eq!(w.offset(), (24 * 3 - 1) * 48);
        assert_eq!(w.snap(), 23);
    }

    #[test]
    fn drag_moves_content_against_finger() {
        let mut w = wheel(24);
        w.update(at(0));

        assert_eq!(
            w.handle_touch(TouchEvent::Press(TouchPoint::new(20, 150))),
            TouchResult::Handled
        );
        w.handle_touch(TouchEvent::Drag(TouchPoint::new(20, 102)));
        w.handle_touch(TouchEvent::Release(TouchPoint::new(20, 102)));

        assert_eq!(w.update(at(80)), Some(1));
    }

    #[test]
    fn scroll_wheel_outside_window_is_ignored() {
        let mut w = wheel(24);
        let event = TouchEvent::Scroll {
            point: TouchPoint::new(500, 10),
            delta_y: 48,
        };
        assert_eq!(w.handle_touch(event), TouchResult::NotHandled);
        assert_eq!(w.phase(), WheelPhase::Idle);
    }

    #[test]
    fn rejects_bad_configuration() {
        let config = WidgetConfig::default();
        assert_eq!(
            WheelPicker::new(Point::zero(), 60, 0, &config).err(),
            Some(WidgetError::InvalidItemCount)
        );
        assert_eq!(
            WheelPicker::new(Point::zero(), 60, 24, &config.with_item_extent(0)).err(),
            Some(WidgetError::InvalidItemExtent(0))
        );
        assert_eq!(
            WheelPicker::new(Point::zero(), 60, 60, &config.with_item_extent(20_000_000)).err(),
            Some(WidgetError::InvalidItemExtent(20_000_000))
        );
    }

    #[test]
    fn draws_inside_its_window() {
        let config = WidgetConfig::default().with_item_extent(12);
        let w = WheelPicker::new(Point::new(2, 2), 40, 24, &config).unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        display.set_allow_overdraw(true);
        w.draw(&mut display).unwrap();

        assert_eq!(display.affected_area(), w.bounds());
    }
}

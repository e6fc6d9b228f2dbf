// src/config.rs
//! Tunables shared by the wheel, picker and selector widgets

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::error::WidgetError;
use crate::locale::Locale;

/// Widget configuration.
///
/// The defaults reproduce the dashboard card: 48px rows, five visible rows,
/// three copies of each wheel range, an 80ms scroll-settle delay and a 250px
/// flyout threshold.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WidgetConfig {
    /// Height of a single wheel row in pixels
    pub item_extent_px: u32,
    /// Number of rows visible inside the wheel window (odd, so one row is centered)
    pub visible_items: u8,
    /// Copies of the value range laid out back to back (at least 3)
    pub repeat_factor: u8,
    /// Quiet time after the last scroll before the wheel snaps
    pub snap_debounce_ms: u64,
    /// Minimum space below the selector trigger before the flyout opens upward
    pub flyout_threshold_px: u32,
    /// Gap between the selector trigger and its flyout
    pub flyout_gap_px: u32,
    pub locale: Locale,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            item_extent_px: 48,
            visible_items: 5,
            repeat_factor: 3,
            snap_debounce_ms: 80,
            flyout_threshold_px: 250,
            flyout_gap_px: 6,
            locale: Locale::English,
        }
    }
}

impl WidgetConfig {
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_item_extent(mut self, extent_px: u32) -> Self {
        self.item_extent_px = extent_px;
        self
    }

    /// Check the wheel geometry invariants.
    pub fn validate(&self) -> Result<(), WidgetError> {
        if self.item_extent_px == 0 {
            return Err(WidgetError::InvalidItemExtent(self.item_extent_px));
        }
        if self.repeat_factor < 3 {
            return Err(WidgetError::InvalidRepeatFactor(self.repeat_factor));
        }
        if self.visible_items == 0 || self.visible_items % 2 == 0 {
            return Err(WidgetError::InvalidVisibleItems(self.visible_items));
        }
        self.fits_pixel_range(u32::from(self.visible_items))
    }

    /// Check that a wheel over `item_count` values, all copies plus the
    /// visible window, stays inside the `i32` pixel coordinate range.
    pub fn validate_rows(&self, item_count: u16) -> Result<(), WidgetError> {
        let rows = u32::from(item_count) * u32::from(self.repeat_factor)
            + u32::from(self.visible_items);
        self.fits_pixel_range(rows)
    }

    fn fits_pixel_range(&self, rows: u32) -> Result<(), WidgetError> {
        match self.item_extent_px.checked_mul(rows) {
            Some(span) if span <= i32::MAX as u32 => Ok(()),
            _ => Err(WidgetError::InvalidItemExtent(self.item_extent_px)),
        }
    }

    pub fn snap_debounce(&self) -> Duration {
        Duration::from_millis(self.snap_debounce_ms)
    }

    /// Height of the wheel viewing window.
    pub fn wheel_window_height(&self) -> u32 {
        self.item_extent_px * self.visible_items as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(WidgetConfig::default().validate(), Ok(()));
        assert_eq!(WidgetConfig::default().wheel_window_height(), 240);
    }

    #[test]
    fn rejects_bad_geometry() {
        let zero_extent = WidgetConfig::default().with_item_extent(0);
        assert_eq!(zero_extent.validate(), Err(WidgetError::InvalidItemExtent(0)));

        let mut short_repeat = WidgetConfig::default();
        short_repeat.repeat_factor = 2;
        assert_eq!(
            short_repeat.validate(),
            Err(WidgetError::InvalidRepeatFactor(2))
        );

        let mut even_rows = WidgetConfig::default();
        even_rows.visible_items = 4;
        assert_eq!(even_rows.validate(), Err(WidgetError::InvalidVisibleItems(4)));
    }

    #[test]
    fn rejects_extent_past_pixel_range() {
        let huge = WidgetConfig::default().with_item_extent(1_073_741_823);
        assert_eq!(
            huge.validate(),
            Err(WidgetError::InvalidItemExtent(1_073_741_823))
        );

        // The window fits, but three copies of 60 minutes do not
        let tall = WidgetConfig::default().with_item_extent(20_000_000);
        assert_eq!(tall.validate(), Ok(()));
        assert_eq!(tall.validate_rows(24), Ok(()));
        assert_eq!(
            tall.validate_rows(60),
            Err(WidgetError::InvalidItemExtent(20_000_000))
        );
    }
}

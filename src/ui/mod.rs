// src/ui/mod.rs
//! Scheduler UI system for embedded displays
//!
//! - Core traits for drawable and touchable elements
//! - Styled components (buttons)
//! - Input widgets: wheel, time picker, weekday selector
//! - Debounce timer and screen-wide press stream for the widgets
//! - Dirty region tracking for efficient rendering

pub mod components;
pub mod core;
pub mod pointer;
pub mod styling;
pub mod timer;
pub mod widgets;

// Re-export commonly used items
pub use components::Button;
pub use core::{
    Action, DirtyRegion, Drawable, PageEvent, TouchEvent, TouchPoint, TouchResult, Touchable,
};
pub use pointer::{ListenerId, PointerHub};
pub use styling::{BorderRadius, ButtonVariant, ColorPalette, Spacing, Style, Theme};
pub use timer::Debounce;
pub use widgets::{FlyoutDirection, TimePicker, WeekdaySelector, WheelPicker};

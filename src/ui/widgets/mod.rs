// src/ui/widgets/mod.rs
//! Input widgets embedded in the scheduler card

pub mod time_picker;
pub mod weekday_selector;
pub mod wheel;

pub use time_picker::TimePicker;
pub use weekday_selector::{FlyoutDirection, WeekdaySelector, flyout_direction};
pub use wheel::{WheelPhase, WheelPicker};

// src/pages/constants.rs
//! Shared layout constants for the scheduler card
//!
//! These define the sizing of plan rows, the inline editor and the controls
//! they contain.

/// Outer margin between the card edge and its rows in pixels
pub const CARD_MARGIN_PX: u32 = 8;

/// Height of the card title line in pixels
pub const TITLE_ROW_HEIGHT_PX: u32 = 24;

/// Vertical gap between two plan rows in pixels
pub const ROW_GAP_PX: u32 = 8;

/// Height of a read-only plan row in pixels
pub const PLAN_ROW_HEIGHT_PX: u32 = 100;

/// Height of the inline plan editor in pixels
pub const EDITOR_HEIGHT_PX: u32 = 180;

/// Standard control height in pixels
pub const CONTROL_HEIGHT_PX: u32 = 32;

/// Width of the small row action buttons in pixels
pub const ACTION_BUTTON_WIDTH_PX: u32 = 64;

/// Width of the plan status toggle in pixels
pub const STATUS_BUTTON_WIDTH_PX: u32 = 96;

/// Width of the square +/- buttons in pixels
pub const STEP_BUTTON_WIDTH_PX: u32 = 32;

/// Width of the time picker trigger in pixels
pub const TIME_TRIGGER_WIDTH_PX: u32 = 80;

/// Height reserved for the error line at the bottom of the card
pub const ERROR_LINE_HEIGHT_PX: u32 = 20;

/// Step applied by the charge target buttons in percent
pub const SOC_STEP_PERCENT: i8 = 5;

// src/error.rs
//! Error type shared by the widgets and the scheduler card

use thiserror_no_std::Error;

/// Errors surfaced to the code that builds or hosts the widgets.
///
/// Only construction problems and host-side plumbing failures are reported
/// here. Malformed user-facing values (time strings, weekday ids) never
/// produce an error; they degrade to a safe default instead.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetError {
    #[error("wheel item count must be positive")]
    InvalidItemCount,
    #[error("wheel item extent must be positive (got {0}px)")]
    InvalidItemExtent(u32),
    #[error("wheel repeat factor must be at least 3 (got {0})")]
    InvalidRepeatFactor(u8),
    #[error("wheel must show an odd, positive number of rows (got {0})")]
    InvalidVisibleItems(u8),
    #[error("pointer hub has no free listener slots")]
    TooManyListeners,
    #[error("plan outbox is full")]
    OutboxFull,
    #[error("failed to encode plan command")]
    Encode,
    #[error("failed to decode plan command")]
    Decode,
}

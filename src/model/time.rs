// src/model/time.rs
//! Time-of-day value committed by the time picker

use core::fmt::{self, Write};

use log::warn;
use serde::{Deserialize, Serialize};

/// Hour and minute of a plan, always within 00:00..=23:59.
///
/// The canonical text form is zero-padded `HH:MM`, which is also how the
/// value is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "heapless::String<5>", from = "heapless::String<16>")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Parse `H:MM` / `HH:MM`. Each component must be one or two ASCII digits
    /// and inside its range.
    pub fn parse(text: &str) -> Option<Self> {
        let (hour, minute) = text.trim().split_once(':')?;
        Self::new(parse_component(hour)?, parse_component(minute)?)
    }

    /// Parse, falling back to `00:00` for anything malformed.
    pub fn parse_lossy(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|| {
            warn!("Malformed time {:?}, falling back to 00:00", text);
            Self::MIDNIGHT
        })
    }

    pub fn to_label(self) -> heapless::String<5> {
        let mut label = heapless::String::new();
        write!(label, "{}", self).ok();
        label
    }
}

fn parse_component(text: &str) -> Option<u8> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl From<TimeOfDay> for heapless::String<5> {
    fn from(time: TimeOfDay) -> Self {
        time.to_label()
    }
}

impl From<heapless::String<16>> for TimeOfDay {
    fn from(text: heapless::String<16>) -> Self {
        Self::parse_lossy(&text)
    }
}

// src/model/plan.rs
//! Charge plan records exchanged with the backend.

use serde::{Deserialize, Serialize};

use super::{TimeOfDay, WeekdaySet};

/// Highest accepted charge target in percent.
pub const MAX_SOC: u8 = 100;

/// One recurring charge plan as the backend reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    /// 1-based position in the backend's plan list
    pub plan_index: u8,
    pub time: TimeOfDay,
    /// Charge target in percent, 0..=100
    pub soc: u8,
    pub weekdays: WeekdaySet,
    pub active: bool,
}

impl PlanRecord {
    /// Defaults for a freshly added plan: 07:00, 80%, Monday to Friday, active.
    pub fn new_default(plan_index: u8) -> Self {
        Self {
            plan_index,
            time: TimeOfDay::new(7, 0).unwrap_or(TimeOfDay::MIDNIGHT),
            soc: 80,
            weekdays: WeekdaySet::WORKDAYS,
            active: true,
        }
    }

    /// Returns a copy with the charge target clamped into range.
    pub fn with_soc(mut self, soc: u8) -> Self {
        self.soc = soc.min(MAX_SOC);
        self
    }
}

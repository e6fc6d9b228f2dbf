// src/model/mod.rs
//! Value types passed between the host card and the widgets.

mod plan;
mod time;
mod weekday;

pub use plan::{MAX_SOC, PlanRecord};
pub use time::TimeOfDay;
pub use weekday::{Weekday, WeekdaySet};

// src/summary.rs
//! Compact one-line labels for weekday sets.
//!
//! Used by the weekday selector trigger and by the plan rows of the
//! scheduler card, so a given set always reads the same everywhere.

use crate::locale::Locale;
use crate::model::WeekdaySet;

/// Enough for the longest German label and for six short names.
pub const SUMMARY_CAPACITY: usize = 32;

/// Summarize a weekday set.
///
/// Rules are checked in order and the first match wins:
/// 1. empty set
/// 2. all seven days
/// 3. exactly Monday to Friday
/// 4. exactly Saturday and Sunday
/// 5. ascending short names joined by the separator
///
/// Other contiguous ranges (e.g. Tuesday to Saturday) are listed day by day.
pub fn summarize(set: WeekdaySet, locale: Locale) -> heapless::String<SUMMARY_CAPACITY> {
    let labels = locale.labels();
    let mut out = heapless::String::new();

    let special = if set.is_empty() {
        Some(labels.no_days)
    } else if set == WeekdaySet::ALL {
        Some(labels.daily)
    } else if set == WeekdaySet::WORKDAYS {
        Some(labels.workdays)
    } else if set == WeekdaySet::WEEKEND {
        Some(labels.weekend)
    } else {
        None
    };

    if let Some(label) = special {
        out.push_str(label).ok();
        return out;
    }

    for (i, day) in set.iter().enumerate() {
        if i > 0 {
            out.push_str(labels.separator).ok();
        }
        out.push_str(labels.short_days[day.index()]).ok();
    }
    out
}

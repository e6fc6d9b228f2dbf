// src/model/weekday.rs
//! Weekday identifiers and the compact set used by the weekday selector

use log::warn;
use serde::{Deserialize, Serialize};

/// A day of the week, numbered 1 = Monday through 7 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weekday(u8);

impl Weekday {
    pub const MONDAY: Weekday = Weekday(1);
    pub const TUESDAY: Weekday = Weekday(2);
    pub const WEDNESDAY: Weekday = Weekday(3);
    pub const THURSDAY: Weekday = Weekday(4);
    pub const FRIDAY: Weekday = Weekday(5);
    pub const SATURDAY: Weekday = Weekday(6);
    pub const SUNDAY: Weekday = Weekday(7);

    /// Every day in ascending order.
    pub const ALL: [Weekday; 7] = [
        Self::MONDAY,
        Self::TUESDAY,
        Self::WEDNESDAY,
        Self::THURSDAY,
        Self::FRIDAY,
        Self::SATURDAY,
        Self::SUNDAY,
    ];

    /// Returns `None` for anything outside 1..=7.
    pub fn new(number: u8) -> Option<Self> {
        (1..=7).contains(&number).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Zero-based position, Monday = 0.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// Set of selected weekdays.
///
/// Stored as a 7-bit mask (bit 0 = Monday), so membership is unique by
/// construction and iteration is always ascending no matter in which order
/// days were toggled. Serializes as an ascending list of day numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "heapless::Vec<u8, 7>", from = "heapless::Vec<u8, 7>")]
pub struct WeekdaySet {
    bits: u8,
}

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet { bits: 0 };
    pub const ALL: WeekdaySet = WeekdaySet { bits: 0b111_1111 };
    /// Monday through Friday
    pub const WORKDAYS: WeekdaySet = WeekdaySet { bits: 0b001_1111 };
    /// Saturday and Sunday
    pub const WEEKEND: WeekdaySet = WeekdaySet { bits: 0b110_0000 };

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build a set from raw day numbers, dropping anything outside 1..=7.
    pub fn from_days(days: &[u8]) -> Self {
        let mut set = Self::EMPTY;
        for &number in days {
            match Weekday::new(number) {
                Some(day) => {
                    set.insert(day);
                }
                None => warn!("Ignoring invalid weekday id {}", number),
            }
        }
        set
    }

    /// Returns `true` if the day was not already present.
    pub fn insert(&mut self, day: Weekday) -> bool {
        let added = !self.contains(day);
        self.bits |= day.bit();
        added
    }

    /// Returns `true` if the day was present.
    pub fn remove(&mut self, day: Weekday) -> bool {
        let removed = self.contains(day);
        self.bits &= !day.bit();
        removed
    }

    /// Flip membership of `day`. Returns the new membership.
    pub fn toggle(&mut self, day: Weekday) -> bool {
        self.bits ^= day.bit();
        self.contains(day)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.bits & day.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::ALL
            .into_iter()
            .filter(move |day| self.contains(*day))
    }

    /// Day numbers in ascending order.
    pub fn to_numbers(&self) -> heapless::Vec<u8, 7> {
        self.iter().map(Weekday::number).collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<WeekdaySet> for heapless::Vec<u8, 7> {
    fn from(set: WeekdaySet) -> Self {
        set.to_numbers()
    }
}

impl From<heapless::Vec<u8, 7>> for WeekdaySet {
    fn from(days: heapless::Vec<u8, 7>) -> Self {
        Self::from_days(&days)
    }
}

// src/locale.rs
//! Fixed label tables for the two supported display languages.

use serde::{Deserialize, Serialize};

/// Display language for every user-visible label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    English,
    German,
}

/// All strings a widget may render, for one locale.
#[derive(Debug)]
pub struct Labels {
    pub no_days: &'static str,
    pub daily: &'static str,
    pub workdays: &'static str,
    pub weekend: &'static str,
    pub separator: &'static str,
    /// Two-letter day names, Monday first
    pub short_days: [&'static str; 7],
    /// Full day names, Monday first
    pub full_days: [&'static str; 7],
    pub cancel: &'static str,
    pub confirm: &'static str,
    pub active: &'static str,
    pub inactive: &'static str,
    pub title: &'static str,
    pub plan: &'static str,
    pub weekdays_field: &'static str,
    pub time_field: &'static str,
    pub soc_field: &'static str,
    pub status_field: &'static str,
    pub edit: &'static str,
    pub delete: &'static str,
    /// Delete button text while waiting for the second press
    pub confirm_delete: &'static str,
    pub save: &'static str,
    pub add_plan: &'static str,
    pub no_plans: &'static str,
    pub loading: &'static str,
}

static ENGLISH: Labels = Labels {
    no_days: "no days selected",
    daily: "daily",
    workdays: "Mon–Fri",
    weekend: "Sat–Sun",
    separator: ", ",
    short_days: ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
    full_days: [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ],
    cancel: "Cancel",
    confirm: "OK",
    active: "active",
    inactive: "inactive",
    title: "Repeating plans",
    plan: "PLAN",
    weekdays_field: "Weekdays",
    time_field: "Time",
    soc_field: "Charge target",
    status_field: "Status",
    edit: "Edit",
    delete: "Delete",
    confirm_delete: "Sure?",
    save: "Save",
    add_plan: "Add plan",
    no_plans: "No plans configured",
    loading: "Loading plans...",
};

static GERMAN: Labels = Labels {
    no_days: "Keine Tage ausgewählt",
    daily: "Täglich",
    workdays: "Mo – Fr",
    weekend: "Sa – So",
    separator: ", ",
    short_days: ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"],
    full_days: [
        "Montag",
        "Dienstag",
        "Mittwoch",
        "Donnerstag",
        "Freitag",
        "Samstag",
        "Sonntag",
    ],
    cancel: "Abbrechen",
    confirm: "OK",
    active: "aktiv",
    inactive: "inaktiv",
    title: "Wiederholende Pläne",
    plan: "PLAN",
    weekdays_field: "Wochentage",
    time_field: "Uhrzeit",
    soc_field: "Ladeziel",
    status_field: "Status",
    edit: "Bearbeiten",
    delete: "Löschen",
    confirm_delete: "Sicher?",
    save: "Speichern",
    add_plan: "Plan hinzufügen",
    no_plans: "Keine Pläne vorhanden",
    loading: "Lade Pläne...",
};

impl Locale {
    pub fn labels(self) -> &'static Labels {
        match self {
            Locale::English => &ENGLISH,
            Locale::German => &GERMAN,
        }
    }
}

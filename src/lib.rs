// src/lib.rs
#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod locale;
pub mod model;
pub mod pages;
pub mod summary;
pub mod ui;

pub use config::WidgetConfig;
pub use error::WidgetError;
pub use locale::Locale;

// src/ui/components/mod.rs
//! UI components library

pub mod button;

pub use button::Button;

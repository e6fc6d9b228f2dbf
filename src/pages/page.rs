// src/pages/page.rs
//! Page trait implemented by full-screen views

use embassy_time::Instant;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;

use crate::ui::core::{Action, DirtyRegion, PageEvent, TouchEvent};

/// A view the host loop drives with touches, clock ticks and backend events.
///
/// The host calls [`Page::update`] every frame and redraws while
/// [`Page::is_dirty`] is set.
pub trait Page {
    /// Heading drawn at the top of the page
    fn title(&self) -> &str;

    /// The page is about to be shown; subscribe to shared input here
    fn on_activate(&mut self) {}

    /// The page was hidden; release subscriptions and close overlays
    fn on_deactivate(&mut self) {}

    /// Route one pointer event, returning the action it produced
    fn handle_touch(&mut self, event: TouchEvent) -> Option<Action>;

    /// Advance debounce timers and settle animations to `now`
    fn update(&mut self, now: Instant);

    /// Apply a backend event. Returns true when the page must be redrawn.
    fn on_event(&mut self, _event: &PageEvent) -> bool {
        false
    }

    fn draw_page<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error>;

    fn bounds(&self) -> Rectangle;

    fn is_dirty(&self) -> bool;

    fn mark_clean(&mut self);

    fn mark_dirty(&mut self);

    /// Regions to flush; the whole page while dirty
    fn dirty_regions(&self) -> Vec<DirtyRegion, 8> {
        let mut regions = Vec::new();
        if self.is_dirty() {
            regions.push(DirtyRegion::new(self.bounds())).ok();
        }
        regions
    }
}

// src/ui/core.rs
//! Core UI traits and types shared by every widget

use alloc::vec::Vec;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::model::{PlanRecord, TimeOfDay, WeekdaySet};

/// Represents a 2D touch point on the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn to_point(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }
}

/// Pointer input delivered to widgets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchEvent {
    /// Initial touch press at a point
    Press(TouchPoint),
    /// Touch drag to a new point
    Drag(TouchPoint),
    /// Finger lifted / button released
    Release(TouchPoint),
    /// Wheel or trackpad scroll over a point, positive scrolls content up
    Scroll { point: TouchPoint, delta_y: i32 },
}

impl TouchEvent {
    pub fn point(&self) -> TouchPoint {
        match *self {
            TouchEvent::Press(p) | TouchEvent::Drag(p) | TouchEvent::Release(p) => p,
            TouchEvent::Scroll { point, .. } => point,
        }
    }
}

/// Result from handling a touch event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchResult {
    /// Event was handled by this element
    Handled,
    /// Event was not handled, pass to next element
    NotHandled,
    /// Event triggered an action
    Action(Action),
}

/// Actions that UI elements can trigger.
///
/// Widget events carry the complete new value, never a diff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Time picker committed a value
    TimeChanged(TimeOfDay),
    /// Weekday selector toggled a day; carries the full updated set
    WeekdaysChanged(WeekdaySet),
    /// Open the time picker overlay
    OpenTimePicker,
    /// Confirm button inside a modal
    Confirm,
    /// Cancel button inside a modal
    Dismiss,
    /// Start editing the plan at a zero-based row
    EditPlan(u8),
    /// Flip the active flag of the plan at a zero-based row
    TogglePlan(u8),
    /// Delete the plan at a zero-based row
    DeletePlan(u8),
    AddPlan,
    SaveEdit,
    CancelEdit,
    /// Change the draft charge target by a signed step
    AdjustSoc(i8),
    ToggleDraftActive,
}

/// Dirty region tracking for efficient rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirtyRegion {
    pub bounds: Rectangle,
    pub is_dirty: bool,
}

impl DirtyRegion {
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            is_dirty: true,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }
}

/// Trait for any UI element that can be drawn
pub trait Drawable {
    /// Draw the element to the display within the given bounds
    fn draw<D: DrawTarget<Color = embedded_graphics::pixelcolor::Rgb565>>(
        &self,
        display: &mut D,
    ) -> Result<(), D::Error>;

    /// Get the bounds of this drawable element
    fn bounds(&self) -> Rectangle;

    /// Check if this element needs to be redrawn
    fn is_dirty(&self) -> bool;

    /// Mark this element as clean (already drawn)
    fn mark_clean(&mut self);

    /// Mark this element as dirty (needs redraw)
    fn mark_dirty(&mut self);

    /// Get the dirty region for partial updates
    fn dirty_region(&self) -> Option<DirtyRegion> {
        if self.is_dirty() {
            Some(DirtyRegion::new(self.bounds()))
        } else {
            None
        }
    }
}

/// Trait for UI elements that respond to touch events
pub trait Touchable {
    /// Check if a point is within this element's bounds
    fn contains_point(&self, point: TouchPoint) -> bool;

    /// Handle a touch event, returns result indicating if handled and any action
    fn handle_touch(&mut self, event: TouchEvent) -> TouchResult;
}

/// Events delivered to pages from outside the UI
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// Fresh plan list from the backend
    PlansFetched(Vec<PlanRecord>),
    /// A remote call failed; the message is shown on the card
    RemoteError(heapless::String<64>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_event_reports_its_point() {
        let p = TouchPoint::new(12, 40);
        for event in [
            TouchEvent::Press(p),
            TouchEvent::Drag(p),
            TouchEvent::Release(p),
            TouchEvent::Scroll {
                point: p,
                delta_y: -3,
            },
        ] {
            assert_eq!(event.point(), p);
        }
        assert_eq!(p.to_point(), Point::new(12, 40));
    }

    #[test]
    fn new_region_starts_dirty() {
        let region = DirtyRegion::new(Rectangle::new(Point::new(4, 4), Size::new(10, 10)));
        assert!(region.is_dirty());
    }
}

// src/ui/pointer.rs
//! Screen-wide press stream for outside-interaction detection.
//!
//! A widget that must react to presses anywhere on the screen (for example a
//! flyout closing when the user taps elsewhere) subscribes here while it is
//! attached and unsubscribes when it is detached. The host publishes every
//! press once; each live listener keeps only the most recent one in its
//! mailbox until it drains it with [`PointerHub::take`].

use heapless::Vec;
use log::debug;

use crate::error::WidgetError;
use crate::ui::core::TouchPoint;

/// Maximum number of simultaneously attached listeners.
pub const MAX_POINTER_LISTENERS: usize = 8;

/// Handle returned by [`PointerHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u16);

#[derive(Debug)]
struct Listener {
    id: ListenerId,
    pending: Option<TouchPoint>,
}

#[derive(Debug, Default)]
pub struct PointerHub {
    listeners: Vec<Listener, MAX_POINTER_LISTENERS>,
    next_id: u16,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Result<ListenerId, WidgetError> {
        if self.listeners.is_full() {
            return Err(WidgetError::TooManyListeners);
        }

        // Ids wrap; skip any still held by a live listener
        let mut id = ListenerId(self.next_id);
        while self.listeners.iter().any(|l| l.id == id) {
            id = ListenerId(id.0.wrapping_add(1));
        }
        self.listeners
            .push(Listener { id, pending: None })
            .map_err(|_| WidgetError::TooManyListeners)?;
        self.next_id = id.0.wrapping_add(1);
        debug!("Pointer listener {:?} subscribed", id);
        Ok(id)
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|l| l.id == id) {
            Some(pos) => {
                self.listeners.swap_remove(pos);
                debug!("Pointer listener {:?} unsubscribed", id);
                true
            }
            None => false,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver a press to every live listener.
    pub fn publish(&mut self, point: TouchPoint) {
        for listener in self.listeners.iter_mut() {
            listener.pending = Some(point);
        }
    }

    /// Drain the mailbox of one listener.
    pub fn take(&mut self, id: ListenerId) -> Option<TouchPoint> {
        self.listeners
            .iter_mut()
            .find(|l| l.id == id)
            .and_then(|l| l.pending.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_press_reaches_every_listener_once() {
        let mut hub = PointerHub::new();
        let a = hub.subscribe().unwrap();
        let b = hub.subscribe().unwrap();

        hub.publish(TouchPoint::new(3, 4));

        assert_eq!(hub.take(a), Some(TouchPoint::new(3, 4)));
        assert_eq!(hub.take(a), None);
        assert_eq!(hub.take(b), Some(TouchPoint::new(3, 4)));
    }

    #[test]
    fn unsubscribed_listener_sees_nothing() {
        let mut hub = PointerHub::new();
        let id = hub.subscribe().unwrap();
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));

        hub.publish(TouchPoint::new(1, 1));
        assert_eq!(hub.take(id), None);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn press_before_subscribe_is_not_replayed() {
        let mut hub = PointerHub::new();
        hub.publish(TouchPoint::new(9, 9));
        let id = hub.subscribe().unwrap();
        assert_eq!(hub.take(id), None);
    }

    #[test]
    fn wrapped_ids_skip_live_listeners() {
        let mut hub = PointerHub::new();
        let held = hub.subscribe().unwrap();
        assert_eq!(held, ListenerId(0));

        hub.next_id = u16::MAX;
        let last = hub.subscribe().unwrap();
        assert_eq!(last, ListenerId(u16::MAX));
        assert!(hub.unsubscribe(last));

        // The counter wraps onto 0, which is still in use
        let next = hub.subscribe().unwrap();
        assert_eq!(next, ListenerId(1));

        hub.publish(TouchPoint::new(5, 6));
        assert_eq!(hub.take(held), Some(TouchPoint::new(5, 6)));
        assert_eq!(hub.take(next), Some(TouchPoint::new(5, 6)));
        assert_eq!(hub.take(held), None);
    }

    #[test]
    fn capacity_is_bounded() {
        let mut hub = PointerHub::new();
        for _ in 0..MAX_POINTER_LISTENERS {
            hub.subscribe().unwrap();
        }
        assert_eq!(hub.subscribe(), Err(WidgetError::TooManyListeners));
    }
}

//! Platform-neutral pointer input.
//!
//! Hosts translate their native touch and mouse events into [`PointerEvent`]s
//! and feed them to [`Swiper::handle_pointer`](crate::Swiper::handle_pointer)
//! in arrival order.
//!
//! ```
//! use swiper_core::{PointerEvent, PointerKind, px::PointerPosition};
//! use web_time::Instant;
//!
//! let now = Instant::now();
//! let down = PointerEvent::down(now, PointerKind::Touch, PointerPosition::new(200.0, 10.0));
//! let moved = PointerEvent::moved(now, PointerKind::Touch, PointerPosition::new(150.0, 12.0));
//! assert_eq!(moved.contacts(), 1);
//! assert!(!down.is_cancel());
//! ```

use web_time::Instant;

use crate::px::PointerPosition;

/// The input modality a pointer event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// A finger on a touch screen.
    Touch,
    /// A mouse, or a pen reported as a mouse.
    Mouse,
}

/// Why the platform aborted a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The window or the viewport lost focus.
    FocusLost,
    /// The user pressed Escape.
    Escape,
    /// A multi-touch gesture (pinch, rotate) took over.
    MultiTouch,
    /// The platform cancelled the touch sequence itself.
    Platform,
}

/// The specific type and data of a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEventContent {
    /// A contact started.
    Down {
        /// Where the contact started.
        position: PointerPosition,
    },
    /// The primary contact moved.
    Move {
        /// The primary contact's position.
        position: PointerPosition,
        /// How many contacts are on the surface right now.
        contacts: usize,
    },
    /// The primary contact was released.
    Up,
    /// The platform aborted the gesture.
    Cancel(CancelReason),
}

/// A single pointer event with timing information.
#[derive(Debug, Clone)]
pub struct PointerEvent {
    /// When the event occurred.
    pub timestamp: Instant,
    /// Which modality produced it.
    pub kind: PointerKind,
    /// The event data.
    pub content: PointerEventContent,
}

impl PointerEvent {
    /// A contact started at `position`.
    pub fn down(timestamp: Instant, kind: PointerKind, position: PointerPosition) -> Self {
        Self {
            timestamp,
            kind,
            content: PointerEventContent::Down { position },
        }
    }

    /// A single contact moved to `position`.
    pub fn moved(timestamp: Instant, kind: PointerKind, position: PointerPosition) -> Self {
        Self::moved_with_contacts(timestamp, kind, position, 1)
    }

    /// The primary contact moved while `contacts` contacts are down.
    pub fn moved_with_contacts(
        timestamp: Instant,
        kind: PointerKind,
        position: PointerPosition,
        contacts: usize,
    ) -> Self {
        Self {
            timestamp,
            kind,
            content: PointerEventContent::Move { position, contacts },
        }
    }

    /// The contact was released.
    pub fn up(timestamp: Instant, kind: PointerKind) -> Self {
        Self {
            timestamp,
            kind,
            content: PointerEventContent::Up,
        }
    }

    /// The platform aborted the gesture.
    pub fn cancel(timestamp: Instant, kind: PointerKind, reason: CancelReason) -> Self {
        Self {
            timestamp,
            kind,
            content: PointerEventContent::Cancel(reason),
        }
    }

    /// Number of contacts reported by a move, `1` for every other event.
    pub fn contacts(&self) -> usize {
        match self.content {
            PointerEventContent::Move { contacts, .. } => contacts,
            _ => 1,
        }
    }

    /// Whether this event aborts the gesture.
    pub fn is_cancel(&self) -> bool {
        matches!(self.content, PointerEventContent::Cancel(_))
    }
}

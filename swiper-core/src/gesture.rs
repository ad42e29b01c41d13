//! Drag session tracking and swipe/scroll disambiguation.
//!
//! [`GestureTracker`] turns raw [`PointerEvent`]s into a normalized horizontal
//! drag delta. It never touches layout; the facade decides what the strip does
//! with each [`GestureUpdate`].
//!
//! The delta is `start - current`, so a positive delta means the content moves
//! left and reveals the next panel.
//!
//! ```
//! use std::time::Duration;
//! use swiper_core::{
//!     Instant, PointerEvent, PointerKind,
//!     gesture::{GestureClass, GestureTracker, GestureUpdate},
//!     px::PointerPosition,
//! };
//!
//! let mut tracker = GestureTracker::new(true, true);
//! let t0 = Instant::now();
//!
//! tracker.handle(&PointerEvent::down(t0, PointerKind::Touch, PointerPosition::new(250.0, 50.0)));
//! let update = tracker.handle(&PointerEvent::moved(
//!     t0 + Duration::from_millis(16),
//!     PointerKind::Touch,
//!     PointerPosition::new(200.0, 52.0),
//! ));
//! assert!(matches!(update, GestureUpdate::Moved { delta, .. } if delta == 50.0));
//! assert_eq!(tracker.class(), Some(GestureClass::Swipe));
//! ```

use std::time::Duration;

use tracing::trace;
use web_time::Instant;

use crate::{
    pointer::{PointerEvent, PointerEventContent, PointerKind},
    px::PointerPosition,
};

/// How a drag session was interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureClass {
    /// No move has arrived yet.
    Pending,
    /// Horizontal drag that moves the panel strip.
    Swipe,
    /// Vertical scroll, or a multi-touch gesture, left to the platform.
    Scroll,
}

/// Final measurements of a finished or cancelled session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSummary {
    /// Horizontal delta of the last accepted move.
    pub delta: f32,
    /// Time between pointer-down and the end of the session.
    pub elapsed: Duration,
    /// Classification at the end of the session.
    pub class: GestureClass,
    /// Whether any move was applied to the strip during the session.
    pub moved_strip: bool,
}

/// What a single pointer event meant for the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureUpdate {
    /// The event does not belong to a session.
    Ignored,
    /// A session was armed.
    Started {
        /// Where the contact went down.
        start: PointerPosition,
    },
    /// A swipe-classified move.
    Moved {
        /// Where the contact went down.
        start: PointerPosition,
        /// Where the contact is now.
        current: PointerPosition,
        /// `start.x - current.x`.
        delta: f32,
    },
    /// A move of a scroll-classified session.
    Scrolling {
        /// `true` for the one event that turned a swipe into a scroll.
        aborted_swipe: bool,
    },
    /// The contact was released.
    Ended(DragSummary),
    /// The platform aborted the session.
    Cancelled(DragSummary),
}

impl GestureUpdate {
    /// Whether the host should suppress the platform's default handling
    /// (native scrolling, text selection) for the event that produced this
    /// update.
    pub fn prevents_native(&self) -> bool {
        matches!(self, GestureUpdate::Moved { .. })
    }
}

#[derive(Debug, Clone)]
struct DragSession {
    kind: PointerKind,
    start: PointerPosition,
    current: PointerPosition,
    started_at: Instant,
    delta: f32,
    class: GestureClass,
    moved_strip: bool,
}

impl DragSession {
    fn summary(&self, now: Instant) -> DragSummary {
        DragSummary {
            delta: self.delta,
            elapsed: now.saturating_duration_since(self.started_at),
            class: self.class,
            moved_strip: self.moved_strip,
        }
    }
}

/// Converts pointer input into drag sessions.
///
/// Only one session exists at a time. A second pointer-down while a session
/// is active is ignored.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    session: Option<DragSession>,
    touch_enabled: bool,
    mouse_enabled: bool,
}

impl GestureTracker {
    /// Creates a tracker accepting the enabled modalities.
    pub fn new(touch_enabled: bool, mouse_enabled: bool) -> Self {
        Self {
            session: None,
            touch_enabled,
            mouse_enabled,
        }
    }

    /// Whether events of `kind` are accepted at all.
    pub fn accepts(&self, kind: PointerKind) -> bool {
        match kind {
            PointerKind::Touch => self.touch_enabled,
            PointerKind::Mouse => self.mouse_enabled,
        }
    }

    /// Returns `true` while a session is armed.
    pub fn is_tracking(&self) -> bool {
        self.session.is_some()
    }

    /// The modality of the active session.
    pub fn active_kind(&self) -> Option<PointerKind> {
        self.session.as_ref().map(|s| s.kind)
    }

    /// Classification of the active session.
    pub fn class(&self) -> Option<GestureClass> {
        self.session.as_ref().map(|s| s.class)
    }

    /// Delta of the active session while it is moving the strip.
    pub fn swipe_delta(&self) -> Option<f32> {
        self.session
            .as_ref()
            .filter(|s| s.class == GestureClass::Swipe)
            .map(|s| s.delta)
    }

    /// Whether the platform may keep scrolling natively for the active session.
    pub fn native_scroll_allowed(&self) -> bool {
        !matches!(self.class(), Some(GestureClass::Swipe))
    }

    /// Drops the active session without producing an update.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Feeds one pointer event into the tracker.
    pub fn handle(&mut self, event: &PointerEvent) -> GestureUpdate {
        match &event.content {
            PointerEventContent::Down { position } => self.begin(event, *position),
            PointerEventContent::Move { position, contacts } => {
                self.track(event.kind, *position, *contacts)
            }
            PointerEventContent::Up => self.finish(event),
            PointerEventContent::Cancel(reason) => {
                let Some(session) = self.session.take() else {
                    return GestureUpdate::Ignored;
                };
                trace!(?reason, "drag session cancelled");
                GestureUpdate::Cancelled(session.summary(event.timestamp))
            }
        }
    }

    fn begin(&mut self, event: &PointerEvent, position: PointerPosition) -> GestureUpdate {
        if !self.accepts(event.kind) {
            return GestureUpdate::Ignored;
        }
        if self.session.is_some() {
            trace!(kind = ?event.kind, "pointer-down ignored, a session is already active");
            return GestureUpdate::Ignored;
        }

        self.session = Some(DragSession {
            kind: event.kind,
            start: position,
            current: position,
            started_at: event.timestamp,
            delta: 0.0,
            class: GestureClass::Pending,
            moved_strip: false,
        });
        GestureUpdate::Started { start: position }
    }

    fn track(
        &mut self,
        kind: PointerKind,
        position: PointerPosition,
        contacts: usize,
    ) -> GestureUpdate {
        let Some(session) = self.session.as_mut() else {
            return GestureUpdate::Ignored;
        };
        if session.kind != kind {
            return GestureUpdate::Ignored;
        }

        session.current = position;
        let offset = session.start - position;

        if contacts > 1 {
            let aborted_swipe = session.class == GestureClass::Swipe;
            if session.class != GestureClass::Scroll {
                trace!(contacts, "multi-touch move, session treated as scrolling");
            }
            session.class = GestureClass::Scroll;
            return GestureUpdate::Scrolling { aborted_swipe };
        }

        if session.class == GestureClass::Pending {
            // Ties favor the swipe.
            session.class = if offset.y.abs() > offset.x.abs() {
                GestureClass::Scroll
            } else {
                GestureClass::Swipe
            };
            trace!(class = ?session.class, dx = offset.x, dy = offset.y, "drag classified");
        }

        match session.class {
            GestureClass::Swipe => {
                session.delta = offset.x;
                session.moved_strip = true;
                GestureUpdate::Moved {
                    start: session.start,
                    current: position,
                    delta: offset.x,
                }
            }
            _ => GestureUpdate::Scrolling {
                aborted_swipe: false,
            },
        }
    }

    fn finish(&mut self, event: &PointerEvent) -> GestureUpdate {
        match self.session.take() {
            Some(session) if session.kind == event.kind => {
                GestureUpdate::Ended(session.summary(event.timestamp))
            }
            other => {
                self.session = other;
                GestureUpdate::Ignored
            }
        }
    }
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(true, true)
    }
}

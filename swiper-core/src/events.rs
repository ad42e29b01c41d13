//! Notifications delivered to host code.
//!
//! [`Notifier`] keeps one listener channel per [`EventKind`]. A channel is
//! allocated on its first subscription and freed when its last listener
//! leaves. Delivery iterates over a snapshot of the channel, so listeners
//! added or removed in the meantime never change the order of an in-flight
//! delivery.
//!
//! ```
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//! use swiper_core::events::{EventKind, Notifier, SwiperEvent};
//!
//! let mut notifier = Notifier::default();
//! let hits = Arc::new(AtomicUsize::new(0));
//! let counter = hits.clone();
//! let id = notifier.subscribe(EventKind::PageChange, move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! notifier.emit(&SwiperEvent::PageChange { index: 1 });
//! notifier.emit(&SwiperEvent::TransitionEnd { index: 1 });
//! assert_eq!(hits.load(Ordering::SeqCst), 1);
//!
//! assert!(notifier.unsubscribe(id));
//! assert_eq!(notifier.channel_count(), 0);
//! ```

use std::{sync::Arc, time::Duration};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::px::PointerPosition;

/// A notification emitted by the slider.
#[derive(Debug, Clone, PartialEq)]
pub enum SwiperEvent {
    /// The current page index changed.
    PageChange {
        /// The new index.
        index: usize,
    },
    /// The latest strip move finished.
    TransitionEnd {
        /// Index the strip settled on.
        index: usize,
    },
    /// A drag session started.
    DragStart {
        /// Where the contact went down.
        position: PointerPosition,
    },
    /// The strip followed a swipe move.
    Drag {
        /// Where the contact went down.
        start: PointerPosition,
        /// Where the contact is now.
        current: PointerPosition,
        /// Raw horizontal delta, `start.x - current.x`.
        delta: f32,
    },
    /// A drag session ended.
    DragEnd {
        /// Raw horizontal delta of the last swipe move.
        delta: f32,
        /// Duration of the session.
        elapsed: Duration,
        /// Whether the platform cancelled the session.
        cancelled: bool,
    },
}

impl SwiperEvent {
    /// The channel this event is delivered on.
    pub fn kind(&self) -> EventKind {
        match self {
            SwiperEvent::PageChange { .. } => EventKind::PageChange,
            SwiperEvent::TransitionEnd { .. } => EventKind::TransitionEnd,
            SwiperEvent::DragStart { .. } => EventKind::DragStart,
            SwiperEvent::Drag { .. } => EventKind::Drag,
            SwiperEvent::DragEnd { .. } => EventKind::DragEnd,
        }
    }
}

/// Notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`SwiperEvent::PageChange`].
    PageChange,
    /// [`SwiperEvent::TransitionEnd`].
    TransitionEnd,
    /// [`SwiperEvent::DragStart`].
    DragStart,
    /// [`SwiperEvent::Drag`].
    Drag,
    /// [`SwiperEvent::DragEnd`].
    DragEnd,
}

impl EventKind {
    /// Every channel, in declaration order.
    pub const ALL: [EventKind; 5] = [
        EventKind::PageChange,
        EventKind::TransitionEnd,
        EventKind::DragStart,
        EventKind::Drag,
        EventKind::DragEnd,
    ];

    /// Parses a host-facing channel name such as `"pageChange"`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pageChange" => Some(EventKind::PageChange),
            "transitionEnd" => Some(EventKind::TransitionEnd),
            "dragStart" => Some(EventKind::DragStart),
            "drag" => Some(EventKind::Drag),
            "dragEnd" => Some(EventKind::DragEnd),
            _ => None,
        }
    }

    /// Host-facing channel name.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::PageChange => "pageChange",
            EventKind::TransitionEnd => "transitionEnd",
            EventKind::DragStart => "dragStart",
            EventKind::Drag => "drag",
            EventKind::DragEnd => "dragEnd",
        }
    }
}

/// Handle returned by [`Notifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw id.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Rebuilds an id from [`raw`](Self::raw), for hosts that round-trip ids
    /// through another language.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// A registered listener.
pub type Listener = Arc<dyn Fn(&SwiperEvent) + Send + Sync>;

type Channel = SmallVec<[(ListenerId, Listener); 2]>;

/// Listener registry with one lazily allocated channel per [`EventKind`].
#[derive(Default)]
pub struct Notifier {
    last_id: u64,
    channels: FxHashMap<EventKind, Channel>,
}

impl Notifier {
    /// Registers `listener` on `kind`.
    pub fn subscribe<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&SwiperEvent) + Send + Sync + 'static,
    {
        self.last_id += 1;
        let id = ListenerId(self.last_id);
        self.channels
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let Some(kind) = self
            .channels
            .iter()
            .find(|(_, channel)| channel.iter().any(|(listener_id, _)| *listener_id == id))
            .map(|(kind, _)| *kind)
        else {
            return false;
        };

        if let Some(channel) = self.channels.get_mut(&kind) {
            channel.retain(|(listener_id, _)| *listener_id != id);
            if channel.is_empty() {
                self.channels.remove(&kind);
            }
        }
        true
    }

    /// Delivers `event` to every listener of its channel, in registration order.
    pub fn emit(&self, event: &SwiperEvent) {
        let Some(channel) = self.channels.get(&event.kind()) else {
            return;
        };
        let snapshot: SmallVec<[Listener; 4]> =
            channel.iter().map(|(_, listener)| listener.clone()).collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of listeners on `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.channels.get(&kind).map_or(0, |channel| channel.len())
    }

    /// Number of allocated channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            let count = self.listener_count(kind);
            if count > 0 {
                map.entry(&kind, &count);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn channels_are_allocated_lazily() {
        let mut notifier = Notifier::default();
        assert_eq!(notifier.channel_count(), 0);

        let a = notifier.subscribe(EventKind::Drag, |_| {});
        let b = notifier.subscribe(EventKind::Drag, |_| {});
        assert_eq!(notifier.channel_count(), 1);
        assert_eq!(notifier.listener_count(EventKind::Drag), 2);

        assert!(notifier.unsubscribe(a));
        assert_eq!(notifier.channel_count(), 1);
        assert!(notifier.unsubscribe(b));
        assert_eq!(notifier.channel_count(), 0);
        assert!(!notifier.unsubscribe(b));
    }

    #[test]
    fn delivery_follows_registration_order() {
        let mut notifier = Notifier::default();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = log.clone();
            notifier.subscribe(EventKind::TransitionEnd, move |event| {
                if let SwiperEvent::TransitionEnd { index } = event {
                    log.lock().expect("log lock").push((name, *index));
                }
            });
        }

        notifier.emit(&SwiperEvent::TransitionEnd { index: 3 });
        assert_eq!(
            *log.lock().expect("log lock"),
            vec![("first", 3), ("second", 3), ("third", 3)]
        );
    }

    #[test]
    fn emit_without_listeners_is_a_no_op() {
        let notifier = Notifier::default();
        notifier.emit(&SwiperEvent::PageChange { index: 0 });
        assert_eq!(format!("{notifier:?}"), "{}");
    }

    #[test]
    fn channel_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("click"), None);
    }
}

//! The slider facade.
//!
//! [`Swiper`] wires gesture tracking, position bookkeeping and transitions
//! together over a host-provided [`SwiperSurface`], and publishes
//! [`SwiperEvent`]s to registered listeners.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use swiper_core::{EventKind, HeadlessSurface, Swiper, SwiperArgs, SwiperEvent};
//!
//! let mut swiper = Swiper::new(HeadlessSurface::new(300.0), 5, SwiperArgs::default());
//! let pages = Arc::new(Mutex::new(Vec::new()));
//! let sink = pages.clone();
//! swiper.on(EventKind::PageChange, move |event| {
//!     if let SwiperEvent::PageChange { index } = event {
//!         sink.lock().unwrap().push(*index);
//!     }
//! });
//!
//! swiper.next(None);
//! assert_eq!(swiper.current_index(), 1);
//! assert_eq!(swiper.surface().strip_offset(), -300.0);
//! assert_eq!(*pages.lock().unwrap(), vec![1]);
//! ```

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use tracing::{debug, trace, warn};
use web_time::Instant;

use crate::{
    args::SwiperArgs,
    events::{EventKind, ListenerId, Notifier, SwiperEvent},
    gesture::{DragSummary, GestureClass, GestureTracker, GestureUpdate},
    pointer::{PointerEvent, PointerKind},
    position::{PositionController, SwipeThresholds},
    px::Px,
    surface::{ClassTarget, SwiperSurface},
    transition::{MoveRequest, TransitionAnimator, TransitionToken},
};

static NEXT_SWIPER_ID: AtomicU64 = AtomicU64::new(1);

/// What the slider is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwiperPhase {
    /// Settled on a page.
    Idle,
    /// A drag session is active.
    Dragging,
    /// An animated move has not reported completion yet.
    Settling,
}

/// How the host should treat the native event it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerResponse {
    /// Suppress the platform's default handling of this event.
    pub prevent_default: bool,
    /// Swallow the click the platform synthesizes after this release.
    pub suppress_next_click: bool,
}

/// A horizontally paged slider.
pub struct Swiper<S> {
    id: u64,
    surface: S,
    args: SwiperArgs,
    thresholds: SwipeThresholds,
    position: PositionController,
    gesture: GestureTracker,
    animator: TransitionAnimator,
    notifier: Notifier,
    drag_classes_set: bool,
    destroyed: bool,
}

impl<S: SwiperSurface> Swiper<S> {
    /// Creates a slider over `surface` and places it on the start page.
    ///
    /// The strip is laid out and positioned without animation before the
    /// viewport is revealed, so the first visible frame is already correct.
    #[tracing::instrument(level = "debug", skip(surface, args))]
    pub fn new(surface: S, panel_count: usize, args: SwiperArgs) -> Self {
        let args = args.sanitized();
        let mut swiper = Self {
            id: NEXT_SWIPER_ID.fetch_add(1, Ordering::Relaxed),
            surface,
            thresholds: args.thresholds(),
            position: PositionController::new(panel_count, args.start_index),
            gesture: GestureTracker::new(!args.disable_touch, !args.disable_mouse),
            animator: TransitionAnimator::new(args.speed),
            notifier: Notifier::default(),
            drag_classes_set: false,
            destroyed: false,
            args,
        };

        swiper.layout();
        let offset = swiper.position.settled_offset().to_f32();
        swiper.animator.apply_immediate(&mut swiper.surface, offset);
        swiper.position.set_offset(offset);
        swiper.surface.set_viewport_visible(true);
        debug!(
            id = swiper.id,
            index = swiper.position.index(),
            page_width = swiper.position.page_width().raw(),
            "swiper created"
        );
        swiper
    }

    /// Numeric id of this instance, as recorded in tracing spans.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The current page index.
    pub fn current_index(&self) -> usize {
        self.position.index()
    }

    /// Number of panels.
    pub fn panel_count(&self) -> usize {
        self.position.panel_count()
    }

    /// Width of one page as last measured.
    pub fn page_width(&self) -> Px {
        self.position.page_width()
    }

    /// Offset last applied to the strip.
    pub fn offset(&self) -> f32 {
        self.position.offset()
    }

    /// Current activity.
    ///
    /// Only a session that moves the strip counts as dragging; taps and
    /// scrolls leave the reported phase alone.
    pub fn phase(&self) -> SwiperPhase {
        if self.gesture.swipe_delta().is_some() {
            SwiperPhase::Dragging
        } else if self.animator.is_pending() {
            SwiperPhase::Settling
        } else {
            SwiperPhase::Idle
        }
    }

    /// Whether a drag session is active.
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_tracking()
    }

    /// Modality of the active drag session.
    pub fn drag_kind(&self) -> Option<PointerKind> {
        self.gesture.active_kind()
    }

    /// Whether a `TransitionEnd` notification is still owed.
    pub fn has_pending_transition(&self) -> bool {
        self.animator.is_pending()
    }

    /// Whether [`destroy`](Self::destroy) was called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The sanitized configuration.
    pub fn args(&self) -> &SwiperArgs {
        &self.args
    }

    /// The rendering surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The rendering surface, mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Registers a listener for `kind`.
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&SwiperEvent) + Send + Sync + 'static,
    {
        self.notifier.subscribe(kind, listener)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Moves to page `index`, clamped to the panel range.
    ///
    /// `speed` overrides the distance-proportional duration; a zero speed
    /// jumps and reports `TransitionEnd` before returning. `suppress_events`
    /// silences `PageChange` only.
    #[tracing::instrument(level = "debug", skip(self), fields(id = self.id))]
    pub fn move_to_index(&mut self, index: usize, speed: Option<Duration>, suppress_events: bool) {
        if self.ignored_after_destroy("move_to_index") {
            return;
        }
        self.settle_on(index, speed, suppress_events, Instant::now());
    }

    /// Moves one page forward. Returns `false` on the last page.
    #[tracing::instrument(level = "debug", skip(self), fields(id = self.id))]
    pub fn next(&mut self, speed: Option<Duration>) -> bool {
        if self.ignored_after_destroy("next") || !self.position.has_next() {
            return false;
        }
        let target = self.position.index() + 1;
        self.settle_on(target, speed, false, Instant::now());
        true
    }

    /// Moves one page back. Returns `false` on the first page.
    #[tracing::instrument(level = "debug", skip(self), fields(id = self.id))]
    pub fn prev(&mut self, speed: Option<Duration>) -> bool {
        if self.ignored_after_destroy("prev") || !self.position.has_prev() {
            return false;
        }
        let target = self.position.index() - 1;
        self.settle_on(target, speed, false, Instant::now());
        true
    }

    /// Re-measures the viewport and re-positions the strip on the current
    /// page. Never notifies.
    #[tracing::instrument(level = "debug", skip(self), fields(id = self.id))]
    pub fn resize(&mut self) {
        if self.ignored_after_destroy("resize") {
            return;
        }
        self.layout();
        let offset = match self.gesture.swipe_delta() {
            Some(delta) => {
                let offset = self.position.drag_offset(delta);
                self.animator.apply_live(&mut self.surface, offset);
                offset
            }
            None => {
                let offset = self.position.settled_offset().to_f32();
                self.animator.reapply(&mut self.surface, offset, Instant::now());
                offset
            }
        };
        self.position.set_offset(offset);
    }

    /// Tears the slider down. Returns `false` if it was already destroyed.
    ///
    /// Listeners are dropped, any owed completion is forgotten and drag
    /// classes are removed before the surface detaches.
    pub fn destroy(&mut self) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.gesture.reset();
        self.set_drag_classes(false);
        self.animator.cancel();
        self.notifier.clear();
        self.surface.detach();
        debug!(id = self.id, "swiper destroyed");
        true
    }

    /// Feeds one pointer event to the slider.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> PointerResponse {
        let mut response = PointerResponse::default();
        if self.destroyed {
            return response;
        }

        match self.gesture.handle(event) {
            GestureUpdate::Ignored => {}
            GestureUpdate::Started { start } => {
                trace!(id = self.id, kind = ?event.kind, "drag started");
                self.notifier.emit(&SwiperEvent::DragStart { position: start });
            }
            GestureUpdate::Moved {
                start,
                current,
                delta,
            } => {
                self.set_drag_classes(true);
                let offset = self.position.drag_offset(delta);
                self.animator.apply_live(&mut self.surface, offset);
                self.position.set_offset(offset);
                self.notifier.emit(&SwiperEvent::Drag {
                    start,
                    current,
                    delta,
                });
                response.prevent_default = true;
            }
            GestureUpdate::Scrolling { aborted_swipe } => {
                if aborted_swipe {
                    trace!(id = self.id, "swipe aborted, reverting");
                    self.set_drag_classes(false);
                    let index = self.position.index();
                    self.settle_on(index, None, true, event.timestamp);
                }
            }
            GestureUpdate::Ended(summary) => {
                response.suppress_next_click = self.release(summary, false, event.timestamp);
            }
            GestureUpdate::Cancelled(summary) => {
                self.release(summary, true, event.timestamp);
            }
        }
        response
    }

    /// Reports that the platform finished the transition identified by `token`.
    pub fn handle_transition_end(&mut self, token: TransitionToken) {
        if self.destroyed {
            return;
        }
        if let Some(index) = self.animator.complete(token) {
            self.transition_ended(index);
        }
    }

    /// Completes an owed transition once its duration has elapsed at `now`.
    ///
    /// For hosts without a native completion signal.
    pub fn tick(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        if let Some(index) = self.animator.tick(now) {
            self.transition_ended(index);
        }
    }

    fn layout(&mut self) {
        let width = self.position.measure(self.surface.viewport_width());
        self.surface.layout_strip(self.position.panel_count(), width);
        if let Some(ratio) = self.args.auto_height_ratio {
            let height = Px::from_f32_rounded(width.to_f32() * ratio);
            self.surface.set_viewport_height(height);
        }
    }

    // Returns whether the release should swallow the follow-up click.
    fn release(&mut self, summary: DragSummary, cancelled: bool, now: Instant) -> bool {
        self.set_drag_classes(false);
        self.notifier.emit(&SwiperEvent::DragEnd {
            delta: summary.delta,
            elapsed: summary.elapsed,
            cancelled,
        });

        if summary.class != GestureClass::Swipe {
            return false;
        }
        let target = self.position.target_index(
            summary.delta,
            summary.elapsed,
            &self.thresholds,
            cancelled,
        );
        trace!(
            id = self.id,
            delta = summary.delta,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            target,
            cancelled,
            "drag released"
        );
        self.settle_on(target, None, false, now);
        !cancelled
    }

    fn settle_on(
        &mut self,
        index: usize,
        speed: Option<Duration>,
        suppress_events: bool,
        now: Instant,
    ) {
        let previous = self.position.index();
        let index = self.position.set_index(index);
        let to = self.position.settled_offset().to_f32();
        let request = MoveRequest {
            from: self.position.offset(),
            to,
            page_width: self.position.page_width(),
            index,
            speed,
        };
        let completed = self.animator.animate_to(&mut self.surface, request, now);
        self.position.set_offset(to);

        if index != previous && !suppress_events {
            self.notifier.emit(&SwiperEvent::PageChange { index });
        }
        if let Some(index) = completed {
            self.transition_ended(index);
        }
    }

    fn transition_ended(&mut self, index: usize) {
        trace!(id = self.id, index, "transition ended");
        self.notifier.emit(&SwiperEvent::TransitionEnd { index });
    }

    fn set_drag_classes(&mut self, enabled: bool) {
        if self.drag_classes_set == enabled {
            return;
        }
        self.drag_classes_set = enabled;
        if let Some(class) = self.args.dragging_class.as_deref() {
            self.surface.set_class(ClassTarget::Viewport, class, enabled);
        }
        if let Some(class) = self.args.body_dragging_class.as_deref() {
            self.surface.set_class(ClassTarget::Body, class, enabled);
        }
    }

    fn ignored_after_destroy(&self, operation: &'static str) -> bool {
        if self.destroyed {
            warn!(id = self.id, operation, "call on a destroyed swiper ignored");
        }
        self.destroyed
    }
}

impl<S> std::fmt::Debug for Swiper<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Swiper")
            .field("id", &self.id)
            .field("index", &self.position.index())
            .field("panel_count", &self.position.panel_count())
            .field("page_width", &self.position.page_width())
            .field("offset", &self.position.offset())
            .field("listeners", &self.notifier)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        pointer::CancelReason,
        px::PointerPosition,
        surface::HeadlessSurface,
    };

    fn swiper(panels: usize) -> Swiper<HeadlessSurface> {
        Swiper::new(HeadlessSurface::new(300.0), panels, SwiperArgs::default())
    }

    fn record(swiper: &mut Swiper<HeadlessSurface>) -> Arc<Mutex<Vec<SwiperEvent>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = log.clone();
            swiper.on(kind, move |event| {
                log.lock().expect("log lock").push(event.clone());
            });
        }
        log
    }

    fn touch(x: f32) -> PointerPosition {
        PointerPosition::new(x, 100.0)
    }

    #[test]
    fn construction_places_and_reveals() {
        let swiper = Swiper::new(
            HeadlessSurface::new(320.4),
            4,
            SwiperArgs::default().start_index(9).auto_height_ratio(0.5),
        );
        let surface = swiper.surface();
        assert!(surface.is_visible());
        assert_eq!(surface.page_width(), Px(320));
        assert_eq!(surface.viewport_height(), Some(Px(160)));
        assert_eq!(swiper.current_index(), 3);
        assert_eq!(surface.strip_offset(), -960.0);
        assert_eq!(surface.last_transition(), None);
        assert_eq!(swiper.phase(), SwiperPhase::Idle);
    }

    #[test]
    fn instances_get_distinct_ids() {
        assert_ne!(swiper(2).id(), swiper(2).id());
    }

    #[test]
    fn next_at_last_page_is_a_no_op() {
        let mut swiper = Swiper::new(
            HeadlessSurface::new(300.0),
            3,
            SwiperArgs::default().start_index(2),
        );
        let log = record(&mut swiper);
        assert!(!swiper.next(None));
        assert!(!swiper.has_pending_transition());
        assert!(log.lock().expect("log lock").is_empty());
        assert!(swiper.prev(None));
        assert_eq!(swiper.current_index(), 1);
    }

    #[test]
    fn suppressed_move_still_owes_transition_end() {
        let mut swiper = swiper(5);
        let log = record(&mut swiper);

        swiper.move_to_index(3, None, true);
        assert_eq!(swiper.phase(), SwiperPhase::Settling);
        let token = swiper
            .surface()
            .last_transition()
            .expect("animated move")
            .token;
        swiper.handle_transition_end(token);

        assert_eq!(
            *log.lock().expect("log lock"),
            vec![SwiperEvent::TransitionEnd { index: 3 }]
        );
        assert_eq!(swiper.phase(), SwiperPhase::Idle);
    }

    #[test]
    fn drag_toggles_classes_and_prevents_native_scrolling() {
        let mut swiper = swiper(5);
        let t0 = Instant::now();

        let down = swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, touch(250.0)));
        assert_eq!(down, PointerResponse::default());
        assert_eq!(swiper.phase(), SwiperPhase::Idle);
        assert!(swiper.is_dragging());
        assert!(!swiper.surface().has_class(ClassTarget::Viewport, "swiper-dragging"));

        let moved =
            swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, touch(200.0)));
        assert!(moved.prevent_default);
        assert_eq!(swiper.phase(), SwiperPhase::Dragging);
        assert!(swiper.surface().has_class(ClassTarget::Viewport, "swiper-dragging"));
        assert!(swiper.surface().has_class(ClassTarget::Body, "swiper-body-dragging"));
        assert_eq!(swiper.offset(), -50.0);

        let released = swiper.handle_pointer(&PointerEvent::up(
            t0 + Duration::from_millis(400),
            PointerKind::Touch,
        ));
        assert!(released.suppress_next_click);
        assert!(!swiper.surface().has_class(ClassTarget::Viewport, "swiper-dragging"));
        assert!(!swiper.surface().has_class(ClassTarget::Body, "swiper-body-dragging"));
        assert_eq!(swiper.current_index(), 1);
    }

    #[test]
    fn taps_and_scrolls_keep_the_settling_phase() {
        let mut swiper = swiper(5);
        let t0 = Instant::now();
        swiper.next(None);
        assert_eq!(swiper.phase(), SwiperPhase::Settling);

        swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Mouse, touch(150.0)));
        assert_eq!(swiper.phase(), SwiperPhase::Settling);
        swiper.handle_pointer(&PointerEvent::up(t0, PointerKind::Mouse));

        swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, touch(150.0)));
        swiper.handle_pointer(&PointerEvent::moved(
            t0,
            PointerKind::Touch,
            PointerPosition::new(148.0, 20.0),
        ));
        assert!(swiper.is_dragging());
        assert_eq!(swiper.phase(), SwiperPhase::Settling);
        swiper.handle_pointer(&PointerEvent::up(t0, PointerKind::Touch));
        assert_eq!(swiper.phase(), SwiperPhase::Settling);
    }

    #[test]
    fn cancelled_drag_settles_back() {
        let mut swiper = swiper(5);
        let log = record(&mut swiper);
        let t0 = Instant::now();

        swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Mouse, touch(250.0)));
        swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Mouse, touch(0.0)));
        let response = swiper.handle_pointer(&PointerEvent::cancel(
            t0 + Duration::from_millis(50),
            PointerKind::Mouse,
            CancelReason::Escape,
        ));

        assert!(!response.suppress_next_click);
        assert_eq!(swiper.current_index(), 0);
        assert_eq!(swiper.surface().strip_offset(), 0.0);
        swiper.tick(t0 + Duration::from_secs(1));

        let log = log.lock().expect("log lock");
        assert!(matches!(
            log.last(),
            Some(SwiperEvent::TransitionEnd { index: 0 })
        ));
        assert!(log.iter().any(|event| matches!(
            event,
            SwiperEvent::DragEnd {
                cancelled: true,
                ..
            }
        )));
        assert!(!log
            .iter()
            .any(|event| matches!(event, SwiperEvent::PageChange { .. })));
    }

    #[test]
    fn resize_mid_settle_keeps_the_owed_token() {
        let mut swiper = swiper(5);
        let log = record(&mut swiper);

        swiper.next(None);
        let token = swiper
            .surface()
            .last_transition()
            .expect("animated move")
            .token;

        swiper.surface_mut().set_viewport_width(400.0);
        swiper.resize();
        assert_eq!(swiper.surface().strip_offset(), -400.0);
        assert_eq!(
            swiper.surface().last_transition().map(|t| t.token),
            Some(token)
        );

        swiper.handle_transition_end(token);
        assert_eq!(
            *log.lock().expect("log lock"),
            vec![
                SwiperEvent::PageChange { index: 1 },
                SwiperEvent::TransitionEnd { index: 1 },
            ]
        );
    }

    #[test]
    fn destroyed_swiper_ignores_everything() {
        let mut swiper = swiper(5);
        let log = record(&mut swiper);
        let t0 = Instant::now();
        swiper.handle_pointer(&PointerEvent::down(t0, PointerKind::Touch, touch(250.0)));
        swiper.handle_pointer(&PointerEvent::moved(t0, PointerKind::Touch, touch(200.0)));
        log.lock().expect("log lock").clear();

        assert!(swiper.destroy());
        assert!(!swiper.destroy());
        assert!(swiper.surface().is_detached());
        assert!(!swiper.surface().has_class(ClassTarget::Viewport, "swiper-dragging"));

        swiper.next(None);
        swiper.move_to_index(3, Some(Duration::ZERO), false);
        swiper.resize();
        swiper.handle_pointer(&PointerEvent::up(t0, PointerKind::Touch));
        swiper.tick(t0 + Duration::from_secs(5));

        assert_eq!(swiper.current_index(), 0);
        assert!(log.lock().expect("log lock").is_empty());
    }
}

//! Mounting a slider on a DOM viewport and wiring native input to it.
//!
//! Core notifications are queued while the slider is borrowed and delivered
//! once the operation that produced them returns, so listeners are free to call
//! back into the slider.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use swiper_core::{
    CancelReason, EventKind, Instant, ListenerId, PointerEvent, PointerKind, PointerPosition,
    PointerResponse, Swiper, SwiperArgs, SwiperEvent, SwiperSurface, TransitionToken,
};
use tracing::{debug, trace, warn};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlElement, KeyboardEvent, MouseEvent,
    TouchEvent, TransitionEvent, Window,
};

use crate::{dom::DomSurface, error::MountError};

// Added to a transition's duration before its completion is synthesized for
// browsers that never fire `transitionend` (hidden tabs, detached nodes).
const FALLBACK_SLACK: Duration = Duration::from_millis(50);

/// A registered event listener. Dropping it removes the listener.
struct DomListener {
    target: EventTarget,
    kind: &'static str,
    capture: bool,
    callback: Closure<dyn FnMut(Event)>,
}

impl DomListener {
    /// Adds a non-passive listener for `kind` on `target`.
    fn attach<F>(
        target: &EventTarget,
        kind: &'static str,
        capture: bool,
        handler: F,
    ) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_capture(capture);
        options.set_passive(false);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            callback.as_ref().unchecked_ref(),
            &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            capture,
            callback,
        })
    }
}

impl Drop for DomListener {
    fn drop(&mut self) {
        if let Err(err) = self.target.remove_event_listener_with_callback_and_bool(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
            self.capture,
        ) {
            trace!(kind = self.kind, error = ?err, "listener removal failed");
        }
    }
}

type HostListener = Rc<dyn Fn(&SwiperEvent)>;

struct Shared {
    swiper: RefCell<Swiper<DomSurface>>,
    window: Window,
    queue: Arc<Mutex<VecDeque<(u64, SwiperEvent)>>>,
    host_listeners: RefCell<FxHashMap<u64, (ListenerId, HostListener)>>,
    last_listener_key: Cell<u64>,
    listeners: RefCell<Vec<DomListener>>,
    mouse_session: RefCell<Vec<DomListener>>,
    click_guard: RefCell<Option<DomListener>>,
    click_generation: Cell<u64>,
    fallback_token: Cell<Option<TransitionToken>>,
}

impl Shared {
    /// Runs `operation` on the slider, then delivers whatever it queued.
    fn with_swiper<R>(
        self: &Rc<Self>,
        operation: &'static str,
        f: impl FnOnce(&mut Swiper<DomSurface>) -> R,
    ) -> Option<R> {
        let result = {
            let Ok(mut swiper) = self.swiper.try_borrow_mut() else {
                warn!(operation, "re-entrant slider call ignored");
                return None;
            };
            f(&mut swiper)
        };
        self.schedule_fallback();
        self.flush();
        Some(result)
    }

    fn flush(&self) {
        loop {
            let Some((key, event)) = self.queue.lock().pop_front() else {
                break;
            };
            let listener = self
                .host_listeners
                .borrow()
                .get(&key)
                .map(|(_, listener)| listener.clone());
            if let Some(listener) = listener {
                listener(&event);
            }
        }
    }

    fn schedule_fallback(self: &Rc<Self>) {
        let Some(transition) = self
            .swiper
            .try_borrow()
            .ok()
            .and_then(|swiper| swiper.surface().active_transition())
        else {
            return;
        };
        if self.fallback_token.get() == Some(transition.token) {
            return;
        }
        self.fallback_token.set(Some(transition.token));

        let weak = Rc::downgrade(self);
        let callback = Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade() {
                shared.with_swiper("transition fallback", |swiper| {
                    swiper.tick(Instant::now());
                });
            }
        });
        let delay = (transition.duration + FALLBACK_SLACK)
            .as_millis()
            .min(i32::MAX as u128) as i32;
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            debug!(error = ?err, "transition fallback timer not scheduled");
        }
    }

    fn listen<E, F>(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        handler: F,
    ) -> Result<DomListener, JsValue>
    where
        E: JsCast,
        F: Fn(&Rc<Shared>, E) + 'static,
    {
        let weak = Rc::downgrade(self);
        DomListener::attach(target, kind, false, move |event: Event| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            match event.dyn_into::<E>() {
                Ok(event) => handler(&shared, event),
                Err(_) => trace!(kind, "unexpected event type"),
            }
        })
    }

    fn attach_listeners(self: &Rc<Self>) -> Result<(), JsValue> {
        let (viewport, strip) = {
            let swiper = self.swiper.borrow();
            (
                swiper.surface().viewport().clone(),
                swiper.surface().strip().clone(),
            )
        };
        let listeners = vec![
            self.listen(&viewport, "touchstart", Shared::on_touch_start)?,
            self.listen(&viewport, "touchmove", Shared::on_touch_move)?,
            self.listen(&viewport, "touchend", Shared::on_touch_end)?,
            self.listen(&viewport, "touchcancel", |shared: &Rc<Shared>, _: Event| {
                shared.cancel(CancelReason::Platform);
            })?,
            self.listen(&viewport, "mousedown", Shared::on_mouse_down)?,
            self.listen(&viewport, "dragstart", Shared::on_drag_start)?,
            self.listen(&self.window, "keydown", |shared: &Rc<Shared>, event: KeyboardEvent| {
                if event.key() == "Escape" {
                    shared.cancel(CancelReason::Escape);
                }
            })?,
            self.listen(&self.window, "blur", |shared: &Rc<Shared>, _: Event| {
                shared.cancel(CancelReason::FocusLost);
            })?,
            self.listen(&strip, "transitionend", Shared::on_transition_end)?,
        ];
        self.listeners.borrow_mut().extend(listeners);
        Ok(())
    }

    // The resize listener goes in after the current task so the resize a page
    // fires while it is still loading does not reach the slider.
    fn defer_resize_listener(self: &Rc<Self>) -> Result<(), JsValue> {
        let weak = Rc::downgrade(self);
        let callback = Closure::once_into_js(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if shared.swiper.borrow().is_destroyed() {
                return;
            }
            let resize = shared.listen(&shared.window, "resize", |shared: &Rc<Shared>, _: Event| {
                shared.with_swiper("resize", |swiper| swiper.resize());
            });
            match resize {
                Ok(listener) => shared.listeners.borrow_mut().push(listener),
                Err(err) => debug!(error = ?err, "resize listener not attached"),
            }
        });
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)?;
        Ok(())
    }

    fn pointer(self: &Rc<Self>, event: PointerEvent) -> PointerResponse {
        let response = self
            .with_swiper("pointer", |swiper| swiper.handle_pointer(&event))
            .unwrap_or_default();
        if response.suppress_next_click {
            self.guard_next_click();
        }
        self.sync_mouse_session();
        response
    }

    fn drag_kind(&self) -> Option<PointerKind> {
        self.swiper
            .try_borrow()
            .ok()
            .and_then(|swiper| swiper.drag_kind())
    }

    fn cancel(self: &Rc<Self>, reason: CancelReason) {
        if let Some(kind) = self.drag_kind() {
            trace!(?reason, "cancelling drag session");
            self.pointer(PointerEvent::cancel(Instant::now(), kind, reason));
        }
    }

    // Window-level mouse listeners only exist while a mouse session does.
    fn sync_mouse_session(self: &Rc<Self>) {
        let active = self.drag_kind() == Some(PointerKind::Mouse);
        let attached = !self.mouse_session.borrow().is_empty();
        if active && !attached {
            let session = [
                self.listen(&self.window, "mousemove", Shared::on_mouse_move),
                self.listen(&self.window, "mouseup", Shared::on_mouse_up),
            ];
            let mut listeners = Vec::with_capacity(session.len());
            for listener in session {
                match listener {
                    Ok(listener) => listeners.push(listener),
                    Err(err) => debug!(error = ?err, "mouse session listener not attached"),
                }
            }
            *self.mouse_session.borrow_mut() = listeners;
        } else if !active && attached {
            let session = self.mouse_session.take();
            drop(session);
        }
    }

    fn guard_next_click(self: &Rc<Self>) {
        let generation = self.click_generation.get() + 1;
        self.click_generation.set(generation);

        let weak = Rc::downgrade(self);
        let guard = DomListener::attach(&self.window, "click", true, move |event: Event| {
            event.prevent_default();
            event.stop_propagation();
            if let Some(shared) = weak.upgrade() {
                drop(shared.click_guard.take());
            }
        });
        match guard {
            Ok(guard) => {
                *self.click_guard.borrow_mut() = Some(guard);
            }
            Err(err) => {
                debug!(error = ?err, "click guard not attached");
                return;
            }
        }

        let weak = Rc::downgrade(self);
        let release = Closure::once_into_js(move || {
            if let Some(shared) = weak.upgrade()
                && shared.click_generation.get() == generation
            {
                drop(shared.click_guard.take());
            }
        });
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(release.unchecked_ref(), 0)
        {
            debug!(error = ?err, "click guard release not scheduled");
        }
    }

    fn on_touch_start(self: &Rc<Self>, event: TouchEvent) {
        let Some((position, contacts)) = primary_touch(&event) else {
            return;
        };
        let now = Instant::now();
        let pointer = if contacts > 1 && self.drag_kind() == Some(PointerKind::Touch) {
            PointerEvent::moved_with_contacts(now, PointerKind::Touch, position, contacts)
        } else {
            PointerEvent::down(now, PointerKind::Touch, position)
        };
        self.pointer(pointer);
    }

    fn on_touch_move(self: &Rc<Self>, event: TouchEvent) {
        let Some((position, contacts)) = primary_touch(&event) else {
            return;
        };
        let response = self.pointer(PointerEvent::moved_with_contacts(
            Instant::now(),
            PointerKind::Touch,
            position,
            contacts,
        ));
        if response.prevent_default && event.cancelable() {
            event.prevent_default();
        }
    }

    fn on_touch_end(self: &Rc<Self>, event: TouchEvent) {
        if event.touches().length() == 0 {
            self.pointer(PointerEvent::up(Instant::now(), PointerKind::Touch));
        }
    }

    fn on_mouse_down(self: &Rc<Self>, event: MouseEvent) {
        if event.button() != 0 {
            return;
        }
        self.pointer(PointerEvent::down(
            Instant::now(),
            PointerKind::Mouse,
            mouse_position(&event),
        ));
        // Keeps native image drag and text selection from taking the mouse.
        if self.drag_kind() == Some(PointerKind::Mouse) {
            event.prevent_default();
        }
    }

    fn on_mouse_move(self: &Rc<Self>, event: MouseEvent) {
        let response = self.pointer(mouse_move_event(
            Instant::now(),
            mouse_position(&event),
            event.buttons(),
        ));
        if response.prevent_default {
            event.prevent_default();
        }
    }

    fn on_drag_start(self: &Rc<Self>, event: Event) {
        if self.drag_kind() == Some(PointerKind::Mouse) {
            event.prevent_default();
        }
    }

    fn on_mouse_up(self: &Rc<Self>, _event: MouseEvent) {
        self.pointer(PointerEvent::up(Instant::now(), PointerKind::Mouse));
    }

    fn on_transition_end(self: &Rc<Self>, event: TransitionEvent) {
        self.with_swiper("transitionend", |swiper| {
            if let Some(transition) = swiper.surface_mut().finished_transition(&event) {
                swiper.handle_transition_end(transition.token);
            }
        });
    }
}

fn primary_touch(event: &TouchEvent) -> Option<(PointerPosition, usize)> {
    let touches = event.touches();
    let touch = touches.item(0)?;
    let position = PointerPosition::new(touch.client_x() as f32, touch.client_y() as f32);
    Some((position, touches.length() as usize))
}

fn mouse_position(event: &MouseEvent) -> PointerPosition {
    PointerPosition::new(event.client_x() as f32, event.client_y() as f32)
}

// A move with the primary button up means the release happened somewhere the
// window never heard about.
fn mouse_move_event(now: Instant, position: PointerPosition, buttons: u16) -> PointerEvent {
    if buttons & 1 == 0 {
        PointerEvent::up(now, PointerKind::Mouse)
    } else {
        PointerEvent::moved(now, PointerKind::Mouse, position)
    }
}

/// A slider mounted on a DOM viewport.
///
/// Dropping the handle destroys the slider.
pub struct WebSwiper {
    shared: Rc<Shared>,
}

impl WebSwiper {
    /// Mounts a slider on `viewport`.
    ///
    /// The viewport's first element child becomes the strip and the strip's
    /// children become the panels. The viewport stays hidden until the strip
    /// sits on the start page.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn mount(viewport: HtmlElement, args: SwiperArgs) -> Result<Self, MountError> {
        let window = web_sys::window().ok_or(MountError::NoWindow)?;
        let document = window.document().ok_or(MountError::NoDocument)?;
        let strip = viewport
            .first_element_child()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .ok_or(MountError::MissingStrip)?;

        let mut surface = DomSurface::new(window.clone(), viewport, strip, document.body());
        surface.set_viewport_visible(false);
        let panel_count = surface.panel_count();
        let swiper = Swiper::new(surface, panel_count, args);
        debug!(id = swiper.id(), panel_count, "swiper mounted");

        let shared = Rc::new(Shared {
            swiper: RefCell::new(swiper),
            window,
            queue: Arc::default(),
            host_listeners: RefCell::default(),
            last_listener_key: Cell::new(0),
            listeners: RefCell::default(),
            mouse_session: RefCell::default(),
            click_guard: RefCell::default(),
            click_generation: Cell::new(0),
            fallback_token: Cell::new(None),
        });
        shared.attach_listeners()?;
        shared.defer_resize_listener()?;
        Ok(Self { shared })
    }

    /// Moves one page forward. Returns `false` on the last page.
    pub fn next(&self, speed: Option<Duration>) -> bool {
        self.shared
            .with_swiper("next", |swiper| swiper.next(speed))
            .unwrap_or(false)
    }

    /// Moves one page back. Returns `false` on the first page.
    pub fn prev(&self, speed: Option<Duration>) -> bool {
        self.shared
            .with_swiper("prev", |swiper| swiper.prev(speed))
            .unwrap_or(false)
    }

    /// See [`Swiper::move_to_index`].
    pub fn move_to_index(&self, index: usize, speed: Option<Duration>, suppress_events: bool) {
        self.shared.with_swiper("move_to_index", |swiper| {
            swiper.move_to_index(index, speed, suppress_events)
        });
    }

    /// Re-measures the viewport.
    pub fn resize(&self) {
        self.shared.with_swiper("resize", |swiper| swiper.resize());
    }

    /// Detaches every listener and releases the DOM. Idempotent.
    pub fn destroy(&self) {
        let destroyed = self
            .shared
            .with_swiper("destroy", |swiper| swiper.destroy())
            .unwrap_or(false);
        if !destroyed {
            return;
        }
        drop(self.shared.listeners.take());
        drop(self.shared.mouse_session.take());
        drop(self.shared.click_guard.take());
        self.shared.host_listeners.borrow_mut().clear();
        self.shared.queue.lock().clear();
    }

    /// Whether [`destroy`](Self::destroy) was called.
    pub fn is_destroyed(&self) -> bool {
        self.shared
            .swiper
            .try_borrow()
            .map_or(true, |swiper| swiper.is_destroyed())
    }

    /// The current page index.
    pub fn current_index(&self) -> usize {
        self.shared
            .swiper
            .try_borrow()
            .map_or(0, |swiper| swiper.current_index())
    }

    /// Number of panels found at mount time.
    pub fn panel_count(&self) -> usize {
        self.shared
            .swiper
            .try_borrow()
            .map_or(0, |swiper| swiper.panel_count())
    }

    /// Registers `listener` for `kind`.
    ///
    /// Listeners run after the operation that produced the event has
    /// returned, and may call back into the slider.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&SwiperEvent) + 'static,
    {
        let key = self.shared.last_listener_key.get() + 1;
        self.shared.last_listener_key.set(key);

        let queue = self.shared.queue.clone();
        let core_id = self.shared.swiper.borrow_mut().on(kind, move |event| {
            queue.lock().push_back((key, event.clone()));
        });
        self.shared
            .host_listeners
            .borrow_mut()
            .insert(key, (core_id, Rc::new(listener)));
        ListenerId::from_raw(key)
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let Some((core_id, _)) = self.shared.host_listeners.borrow_mut().remove(&id.raw()) else {
            return false;
        };
        self.shared.swiper.borrow_mut().off(core_id);
        true
    }
}

impl Drop for WebSwiper {
    fn drop(&mut self) {
        self.destroy();
    }
}

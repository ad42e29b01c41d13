//! The JavaScript-facing `Swiper` class.
//!
//! ```js
//! import init, { Swiper } from "./swiper_web.js";
//!
//! await init();
//! const swiper = new Swiper(document.querySelector(".viewport"), '{"speed": 400}');
//! const id = swiper.on("pageChange", ({ index }) => console.log(index));
//! swiper.next();
//! swiper.off(id);
//! swiper.destroy();
//! ```

use std::time::Duration;

use js_sys::{Function, Object, Reflect};
use swiper_core::{EventKind, ListenerId, SwiperArgs, SwiperEvent};
use tracing::{trace, warn};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::host::WebSwiper;

/// Installs the panic hook when the module is instantiated.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// A horizontally paged slider bound to a viewport element.
#[wasm_bindgen(js_name = Swiper)]
pub struct JsSwiper {
    inner: WebSwiper,
}

#[wasm_bindgen(js_class = Swiper)]
impl JsSwiper {
    /// Mounts a slider on `viewport`, configured by an optional JSON record.
    #[wasm_bindgen(constructor)]
    pub fn new(viewport: HtmlElement, config: Option<String>) -> Result<JsSwiper, JsError> {
        let args = match config.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => SwiperArgs::from_json(json)?,
            _ => SwiperArgs::default(),
        };
        let inner = WebSwiper::mount(viewport, args)?;
        Ok(Self { inner })
    }

    /// Moves one page forward; `speed` is in milliseconds.
    pub fn next(&self, speed: Option<f64>) -> bool {
        self.inner.next(speed_from_js(speed))
    }

    /// Moves one page back; `speed` is in milliseconds.
    pub fn prev(&self, speed: Option<f64>) -> bool {
        self.inner.prev(speed_from_js(speed))
    }

    /// Moves to `index`. Non-numeric and non-finite indices are ignored,
    /// fractional ones are truncated and negative ones clamp to the first page.
    #[wasm_bindgen(js_name = moveToIndex)]
    pub fn move_to_index(&self, index: JsValue, speed: Option<f64>, suppress_events: Option<bool>) {
        let Some(index) = index_from_js(&index) else {
            warn!(?index, "moveToIndex ignored a non-numeric index");
            return;
        };
        self.inner
            .move_to_index(index, speed_from_js(speed), suppress_events.unwrap_or(false));
    }

    /// Re-measures the viewport.
    pub fn resize(&self) {
        self.inner.resize();
    }

    /// Detaches the slider. Idempotent.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// The current page index.
    #[wasm_bindgen(getter, js_name = currentIndex)]
    pub fn current_index(&self) -> u32 {
        u32::try_from(self.inner.current_index()).unwrap_or(u32::MAX)
    }

    /// Number of panels found at mount time.
    #[wasm_bindgen(getter, js_name = panelCount)]
    pub fn panel_count(&self) -> u32 {
        u32::try_from(self.inner.panel_count()).unwrap_or(u32::MAX)
    }

    /// Subscribes `callback` to the `name` channel and returns its id.
    pub fn on(&self, name: &str, callback: Function) -> Result<f64, JsError> {
        let kind = EventKind::from_name(name)
            .ok_or_else(|| JsError::new(&format!("unknown swiper event \"{name}\"")))?;
        let id = self.inner.on(kind, move |event| {
            if let Err(err) = callback.call1(&JsValue::NULL, &event_to_js(event)) {
                warn!(error = ?err, "swiper listener threw");
            }
        });
        Ok(id.raw() as f64)
    }

    /// Removes the listener registered under `id`.
    pub fn off(&self, id: f64) -> bool {
        if !id.is_finite() || id < 0.0 {
            return false;
        }
        self.inner.off(ListenerId::from_raw(id as u64))
    }
}

fn speed_from_js(speed: Option<f64>) -> Option<Duration> {
    speed
        .filter(|millis| millis.is_finite())
        .map(|millis| Duration::from_millis(millis.max(0.0).round() as u64))
}

fn index_from_js(value: &JsValue) -> Option<usize> {
    let number = value.as_f64()?;
    if !number.is_finite() {
        return None;
    }
    Some(number.max(0.0).trunc() as usize)
}

fn set(object: &Object, key: &str, value: JsValue) {
    property_set(key, Reflect::set(object, &JsValue::from_str(key), &value));
}

fn property_set(key: &str, result: Result<bool, JsValue>) -> bool {
    match result {
        Ok(true) => true,
        Ok(false) => {
            trace!(key, "event payload property rejected");
            false
        }
        Err(err) => {
            trace!(key, error = ?err, "event payload property not set");
            false
        }
    }
}

fn event_to_js(event: &SwiperEvent) -> JsValue {
    let object = Object::new();
    set(&object, "type", event.kind().name().into());
    match event {
        SwiperEvent::PageChange { index } | SwiperEvent::TransitionEnd { index } => {
            set(&object, "index", (*index as f64).into());
        }
        SwiperEvent::DragStart { position } => {
            set(&object, "x", position.x.into());
            set(&object, "y", position.y.into());
        }
        SwiperEvent::Drag {
            start,
            current,
            delta,
        } => {
            set(&object, "startX", start.x.into());
            set(&object, "startY", start.y.into());
            set(&object, "x", current.x.into());
            set(&object, "y", current.y.into());
            set(&object, "delta", (*delta).into());
        }
        SwiperEvent::DragEnd {
            delta,
            elapsed,
            cancelled,
        } => {
            set(&object, "delta", (*delta).into());
            set(&object, "elapsed", (elapsed.as_secs_f64() * 1000.0).into());
            set(&object, "cancelled", (*cancelled).into());
        }
    }
    object.into()
}

//! [`SwiperSurface`] over live DOM elements.

use std::time::Duration;

use swiper_core::{ClassTarget, Instant, Px, SwiperSurface, Transition};
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlElement, TransitionEvent, Window};

const TRANSFORM_PROPERTIES: [&str; 2] = ["transform", "-webkit-transform"];

// Slack between when the transform was written and when the browser started
// timing the transition.
const ELAPSED_TOLERANCE_MS: f64 = 2.0;

/// Drives a viewport element and its strip.
///
/// The strip is the viewport's first element child; every child of the strip
/// is a panel. Styles are written inline so host stylesheets only need to
/// clip the viewport (`overflow: hidden`) and give it a height.
pub struct DomSurface {
    window: Window,
    body: Option<HtmlElement>,
    viewport: HtmlElement,
    strip: HtmlElement,
    active: Option<(Transition, Instant)>,
}

impl DomSurface {
    /// Wraps `viewport` and `strip`. Body classes are skipped when `body` is `None`.
    pub fn new(
        window: Window,
        viewport: HtmlElement,
        strip: HtmlElement,
        body: Option<HtmlElement>,
    ) -> Self {
        Self {
            window,
            body,
            viewport,
            strip,
            active: None,
        }
    }

    /// The viewport element.
    pub fn viewport(&self) -> &HtmlElement {
        &self.viewport
    }

    /// The strip element.
    pub fn strip(&self) -> &HtmlElement {
        &self.strip
    }

    /// Number of panels currently inside the strip.
    pub fn panel_count(&self) -> usize {
        self.strip.children().length() as usize
    }

    /// The transition currently running on the strip, if any.
    pub fn active_transition(&self) -> Option<Transition> {
        self.active.map(|(transition, _)| transition)
    }

    /// Matches a native `transitionend` against the running transition.
    ///
    /// Bubbled events from panels, other properties and completions of
    /// transitions that were replaced in the meantime all yield `None`. A
    /// transition the browser shortened, as when a move reverses mid-flight,
    /// still matches.
    pub fn finished_transition(&mut self, event: &TransitionEvent) -> Option<Transition> {
        let target: JsValue = event.target()?.into();
        let strip: &JsValue = self.strip.as_ref();
        if &target != strip {
            return None;
        }
        if !TRANSFORM_PROPERTIES.contains(&event.property_name().as_str()) {
            return None;
        }
        let (active, applied_at) = self.active?;
        let elapsed_ms = f64::from(event.elapsed_time()) * 1000.0;
        if !ran_since_applied(elapsed_ms, applied_at.elapsed()) {
            debug!(elapsed_ms, "transitionend of a replaced transition ignored");
            return None;
        }
        self.active = None;
        Some(active)
    }

    fn horizontal_padding(&self) -> f32 {
        let Ok(Some(style)) = self.window.get_computed_style(&self.viewport) else {
            return 0.0;
        };
        ["padding-left", "padding-right"]
            .iter()
            .filter_map(|property| style.get_property_value(property).ok())
            .map(|value| parse_px(&value))
            .sum()
    }
}

fn parse_px(value: &str) -> f32 {
    value
        .trim()
        .trim_end_matches("px")
        .parse::<f32>()
        .ok()
        .filter(|px| px.is_finite())
        .unwrap_or(0.0)
}

fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        debug!(property, value, error = ?err, "style update rejected");
    }
}

fn log_js_error(action: &str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        debug!(action, error = ?err, "DOM update rejected");
    }
}

// A transition cannot have run longer than the time since its transform was
// written; an older one that ends right after being replaced has.
fn ran_since_applied(elapsed_ms: f64, since_applied: Duration) -> bool {
    elapsed_ms.is_finite()
        && elapsed_ms <= since_applied.as_secs_f64() * 1000.0 + ELAPSED_TOLERANCE_MS
}

fn duration_css(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

impl SwiperSurface for DomSurface {
    fn viewport_width(&self) -> f32 {
        (self.viewport.client_width() as f32 - self.horizontal_padding()).max(0.0)
    }

    fn layout_strip(&mut self, panel_count: usize, page_width: Px) {
        set_style(&self.strip, "position", "relative");
        set_style(&self.strip, "width", &format!("{}px", page_width.raw()));
        let panels = self.strip.children();
        for index in 0..panel_count.min(panels.length() as usize) {
            let Some(panel) = panels
                .item(index as u32)
                .and_then(|panel| panel.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            set_style(&panel, "position", "absolute");
            set_style(&panel, "top", "0");
            set_style(&panel, "width", "100%");
            set_style(&panel, "left", &format!("{}%", index * 100));
        }
    }

    fn apply_strip_offset(&mut self, offset_px: f32, transition: Option<Transition>) {
        let duration = transition.map_or(Duration::ZERO, |t| t.duration);
        set_style(&self.strip, "transition-property", "transform");
        set_style(&self.strip, "transition-duration", &duration_css(duration));
        set_style(
            &self.strip,
            "transform",
            &format!("translate3d({offset_px}px, 0, 0)"),
        );
        self.active = transition.map(|transition| (transition, Instant::now()));
    }

    fn set_viewport_visible(&mut self, visible: bool) {
        let value = if visible { "visible" } else { "hidden" };
        set_style(&self.viewport, "visibility", value);
    }

    fn set_class(&mut self, target: ClassTarget, class: &str, enabled: bool) {
        let element = match target {
            ClassTarget::Viewport => Some(&self.viewport),
            ClassTarget::Body => self.body.as_ref(),
        };
        let Some(element) = element else {
            return;
        };
        let classes = element.class_list();
        let result = if enabled {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        log_js_error("class toggle", result);
    }

    fn set_viewport_height(&mut self, height: Px) {
        set_style(&self.viewport, "height", &format!("{}px", height.raw()));
    }

    fn detach(&mut self) {
        log_js_error(
            "transition reset",
            self.strip
                .style()
                .remove_property("transition-duration")
                .map(|_| ()),
        );
        self.active = None;
    }
}

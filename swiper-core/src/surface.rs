//! The rendering surface the slider drives.
//!
//! The core never renders anything itself. A host implements
//! [`SwiperSurface`] over whatever owns the viewport: a DOM element, a
//! retained-mode widget, or the in-memory [`HeadlessSurface`].
//!
//! The visual contract is small:
//!
//! - The strip is as wide as one page and panel `i` sits at `i * 100%` of it.
//! - The active offset is applied as a translation, never as a layout change.
//! - An animated offset carries a [`Transition`] whose token is reported back
//!   through [`Swiper::handle_transition_end`](crate::Swiper::handle_transition_end).

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::{px::Px, transition::Transition};

/// Which element a CSS-like class is toggled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassTarget {
    /// The viewport element.
    Viewport,
    /// The document body.
    Body,
}

/// Rendering surface collaborator.
pub trait SwiperSurface {
    /// Content-box width of the viewport, in CSS pixels.
    fn viewport_width(&self) -> f32;

    /// Lays panels out left to right, each `page_width` wide.
    fn layout_strip(&mut self, panel_count: usize, page_width: Px);

    /// Translates the strip to `offset_px`, animated when `transition` is set.
    fn apply_strip_offset(&mut self, offset_px: f32, transition: Option<Transition>);

    /// Shows or hides the viewport.
    fn set_viewport_visible(&mut self, visible: bool);

    /// Adds or removes `class` on `target`.
    fn set_class(&mut self, target: ClassTarget, class: &str, enabled: bool);

    /// Sets an explicit viewport height.
    fn set_viewport_height(&mut self, _height: Px) {}

    /// Releases platform resources owned by the surface.
    fn detach(&mut self) {}
}

impl<S: SwiperSurface + ?Sized> SwiperSurface for Box<S> {
    fn viewport_width(&self) -> f32 {
        (**self).viewport_width()
    }

    fn layout_strip(&mut self, panel_count: usize, page_width: Px) {
        (**self).layout_strip(panel_count, page_width);
    }

    fn apply_strip_offset(&mut self, offset_px: f32, transition: Option<Transition>) {
        (**self).apply_strip_offset(offset_px, transition);
    }

    fn set_viewport_visible(&mut self, visible: bool) {
        (**self).set_viewport_visible(visible);
    }

    fn set_class(&mut self, target: ClassTarget, class: &str, enabled: bool) {
        (**self).set_class(target, class, enabled);
    }

    fn set_viewport_height(&mut self, height: Px) {
        (**self).set_viewport_height(height);
    }

    fn detach(&mut self) {
        (**self).detach();
    }
}

/// One strip offset application recorded by [`HeadlessSurface`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedOffset {
    /// The offset.
    pub offset: f32,
    /// The transition it was applied with.
    pub transition: Option<Transition>,
}

/// Number of offset applications [`HeadlessSurface`] keeps.
pub const HISTORY_LIMIT: usize = 256;

/// In-memory surface.
///
/// Frame-driven renderers read its state every frame and draw the strip
/// themselves; tests and the demo use it to observe what the slider did.
/// Only the last [`HISTORY_LIMIT`] offset applications are kept.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    viewport_width: f32,
    viewport_height: Option<Px>,
    visible: bool,
    panel_count: usize,
    page_width: Px,
    strip_offset: f32,
    last_transition: Option<Transition>,
    history: SmallVec<[AppliedOffset; 8]>,
    viewport_classes: FxHashSet<String>,
    body_classes: FxHashSet<String>,
    detached: bool,
}

impl HeadlessSurface {
    /// Creates a hidden surface whose viewport is `viewport_width` wide.
    pub fn new(viewport_width: f32) -> Self {
        Self {
            viewport_width,
            viewport_height: None,
            visible: false,
            panel_count: 0,
            page_width: Px::ZERO,
            strip_offset: 0.0,
            last_transition: None,
            history: SmallVec::new(),
            viewport_classes: FxHashSet::default(),
            body_classes: FxHashSet::default(),
            detached: false,
        }
    }

    /// Changes the viewport width, as a window resize would.
    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    /// Offset currently applied to the strip.
    pub fn strip_offset(&self) -> f32 {
        self.strip_offset
    }

    /// Transition of the most recent offset application.
    pub fn last_transition(&self) -> Option<Transition> {
        self.last_transition
    }

    /// Recent offset applications, oldest first.
    pub fn history(&self) -> &[AppliedOffset] {
        &self.history
    }

    /// Forgets the recorded offset history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Whether the viewport is shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Explicit viewport height, if one was set.
    pub fn viewport_height(&self) -> Option<Px> {
        self.viewport_height
    }

    /// Width the strip was last laid out with.
    pub fn page_width(&self) -> Px {
        self.page_width
    }

    /// Left edge of every panel inside the strip.
    pub fn panel_offsets(&self) -> Vec<Px> {
        (0..self.panel_count)
            .map(|index| self.page_width.saturating_mul_index(index))
            .collect()
    }

    /// Whether `class` is currently set on `target`.
    pub fn has_class(&self, target: ClassTarget, class: &str) -> bool {
        match target {
            ClassTarget::Viewport => self.viewport_classes.contains(class),
            ClassTarget::Body => self.body_classes.contains(class),
        }
    }

    /// Whether [`SwiperSurface::detach`] was called.
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl SwiperSurface for HeadlessSurface {
    fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    fn layout_strip(&mut self, panel_count: usize, page_width: Px) {
        self.panel_count = panel_count;
        self.page_width = page_width;
    }

    fn apply_strip_offset(&mut self, offset_px: f32, transition: Option<Transition>) {
        self.strip_offset = offset_px;
        self.last_transition = transition;
        if self.history.len() == HISTORY_LIMIT {
            self.history.remove(0);
        }
        self.history.push(AppliedOffset {
            offset: offset_px,
            transition,
        });
    }

    fn set_viewport_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_class(&mut self, target: ClassTarget, class: &str, enabled: bool) {
        let classes = match target {
            ClassTarget::Viewport => &mut self.viewport_classes,
            ClassTarget::Body => &mut self.body_classes,
        };
        if enabled {
            classes.insert(class.to_owned());
        } else {
            classes.remove(class);
        }
    }

    fn set_viewport_height(&mut self, height: Px) {
        self.viewport_height = Some(height);
    }

    fn detach(&mut self) {
        self.detached = true;
    }
}

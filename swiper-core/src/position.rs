//! Page index and strip offset bookkeeping.
//!
//! [`PositionController`] owns the current page index, the page width and the
//! strip offset. It converts between indices and pixel offsets, damps drags
//! past the first and last panels, and decides where a released drag lands.
//!
//! Offsets follow the strip transform: page `i` is shown when the strip sits
//! at `-i * page_width`.

use std::time::Duration;

use crate::px::Px;

/// The two rules that turn a released drag into a page change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeThresholds {
    /// Pixels a drag must exceed to commit.
    pub distance: f32,
    /// Drags shorter than this commit regardless of distance; `None` turns the
    /// rule off.
    pub duration: Option<Duration>,
}

impl Default for SwipeThresholds {
    fn default() -> Self {
        Self {
            distance: 20.0,
            duration: Some(Duration::from_millis(250)),
        }
    }
}

/// Decides the page a released drag settles on.
///
/// A drag commits when `|delta| > thresholds.distance`, or when it was faster
/// than `thresholds.duration` and moved at all. A committed drag moves one page
/// in the direction of the delta if such a page exists. Cancelled drags always
/// stay on `current_index`.
///
/// ```
/// use std::time::Duration;
/// use swiper_core::position::{SwipeThresholds, resolve_target_index};
///
/// let thresholds = SwipeThresholds::default();
/// let slow = Duration::from_millis(500);
///
/// assert_eq!(resolve_target_index(0, 5, 250.0, slow, &thresholds, false), 1);
/// assert_eq!(resolve_target_index(0, 5, 10.0, slow, &thresholds, false), 0);
/// assert_eq!(resolve_target_index(0, 5, -250.0, slow, &thresholds, false), 0);
/// assert_eq!(resolve_target_index(3, 5, 250.0, slow, &thresholds, true), 3);
/// ```
pub fn resolve_target_index(
    current_index: usize,
    panel_count: usize,
    delta: f32,
    elapsed: Duration,
    thresholds: &SwipeThresholds,
    cancelled: bool,
) -> usize {
    let last_index = panel_count.saturating_sub(1);
    let current_index = current_index.min(last_index);
    if cancelled || !delta.is_finite() {
        return current_index;
    }

    let far_enough = delta.abs() > thresholds.distance;
    let fast_enough = thresholds
        .duration
        .is_some_and(|limit| elapsed < limit && delta != 0.0);
    if !far_enough && !fast_enough {
        return current_index;
    }

    if delta > 0.0 && current_index < last_index {
        current_index + 1
    } else if delta < 0.0 && current_index > 0 {
        current_index - 1
    } else {
        current_index
    }
}

/// Controller for the page index and strip offset.
#[derive(Debug, Clone)]
pub struct PositionController {
    index: usize,
    panel_count: usize,
    page_width: Px,
    offset: f32,
}

impl PositionController {
    /// Creates a controller for `panel_count` panels, clamping `start_index`.
    pub fn new(panel_count: usize, start_index: usize) -> Self {
        let mut controller = Self {
            index: 0,
            panel_count,
            page_width: Px::new(1),
            offset: 0.0,
        };
        controller.index = controller.clamp_index(start_index);
        controller
    }

    /// Returns the current page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of panels.
    pub fn panel_count(&self) -> usize {
        self.panel_count
    }

    /// Returns the index of the last panel, `0` for an empty strip.
    pub fn last_index(&self) -> usize {
        self.panel_count.saturating_sub(1)
    }

    /// Returns the current page width.
    pub fn page_width(&self) -> Px {
        self.page_width
    }

    /// Returns the offset currently applied to the strip.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Records the offset that was applied to the strip.
    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    /// Stores the viewport's content-box width, rounded to a whole pixel.
    ///
    /// A collapsed viewport still yields a one pixel page so the resistance
    /// curve never divides by zero.
    pub fn measure(&mut self, content_box_width: f32) -> Px {
        let width = if content_box_width.is_finite() {
            Px::from_f32_rounded(content_box_width)
        } else {
            Px::ZERO
        };
        self.page_width = width.max(Px::new(1));
        self.page_width
    }

    /// Clamps `index` into `0..=last_index`.
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Sets the current index, clamped, and returns the stored value.
    pub fn set_index(&mut self, index: usize) -> usize {
        self.index = self.clamp_index(index);
        self.index
    }

    /// Whether a panel exists after the current one.
    pub fn has_next(&self) -> bool {
        self.index < self.last_index()
    }

    /// Whether a panel exists before the current one.
    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    /// Strip offset that shows page `index`.
    pub fn offset_for_index(&self, index: usize) -> Px {
        -self.page_width.saturating_mul_index(self.clamp_index(index))
    }

    /// Strip offset that shows the current page.
    pub fn settled_offset(&self) -> Px {
        self.offset_for_index(self.index)
    }

    /// Whether a drag with `raw_delta` pulls past the first or last panel.
    pub fn is_past_bound(&self, raw_delta: f32) -> bool {
        (self.index == 0 && raw_delta < 0.0) || (self.index == self.last_index() && raw_delta > 0.0)
    }

    /// Damps `raw_delta` when it pulls past the first or last panel.
    ///
    /// Past a bound the delta becomes `raw / (|raw| / page_width + 1)`, which
    /// approaches one extra page of travel however far the drag goes. Inside
    /// the bounds the delta is returned unchanged.
    ///
    /// ```
    /// use swiper_core::position::PositionController;
    ///
    /// let mut position = PositionController::new(5, 0);
    /// position.measure(300.0);
    ///
    /// let damped = position.resistance(-400.0);
    /// assert!((damped + 171.43).abs() < 0.01);
    /// assert_eq!(position.resistance(250.0), 250.0);
    /// ```
    pub fn resistance(&self, raw_delta: f32) -> f32 {
        if !self.is_past_bound(raw_delta) {
            return raw_delta;
        }
        raw_delta / (raw_delta.abs() / self.page_width.to_f32() + 1.0)
    }

    /// Offset the strip should follow while the user drags by `raw_delta`.
    pub fn drag_offset(&self, raw_delta: f32) -> f32 {
        self.settled_offset().to_f32() - self.resistance(raw_delta)
    }

    /// Page a released drag settles on, see [`resolve_target_index`].
    pub fn target_index(
        &self,
        delta: f32,
        elapsed: Duration,
        thresholds: &SwipeThresholds,
        cancelled: bool,
    ) -> usize {
        resolve_target_index(
            self.index,
            self.panel_count,
            delta,
            elapsed,
            thresholds,
            cancelled,
        )
    }
}

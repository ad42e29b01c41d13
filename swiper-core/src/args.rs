//! Slider configuration.
//!
//! ```
//! use std::time::Duration;
//! use swiper_core::SwiperArgs;
//!
//! let args = SwiperArgs::default()
//!     .start_index(2)
//!     .speed(Duration::from_millis(400))
//!     .dragging_class("is-dragging");
//!
//! assert_eq!(args.start_index, 2);
//! assert_eq!(args.dragging_class.as_deref(), Some("is-dragging"));
//! assert_eq!(args.duration_threshold, Some(Duration::from_millis(250)));
//! ```

use std::time::Duration;

use derive_setters::Setters;

use crate::position::SwipeThresholds;

const DEFAULT_SPEED: Duration = Duration::from_millis(300);
const DEFAULT_DISTANCE_THRESHOLD: f32 = 20.0;
const DEFAULT_DURATION_THRESHOLD: Duration = Duration::from_millis(250);
const DEFAULT_DRAGGING_CLASS: &str = "swiper-dragging";
const DEFAULT_BODY_DRAGGING_CLASS: &str = "swiper-body-dragging";

/// Configuration arguments for a [`Swiper`](crate::Swiper).
///
/// Optional fields are feature toggles: `None` turns the feature off.
#[derive(Debug, Clone, PartialEq, Setters)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct SwiperArgs {
    /// Page shown after construction. Clamped to the panel range.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::index"))]
    pub start_index: usize,
    /// Duration of a full-page transition.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::millis"))]
    pub speed: Duration,
    /// Pixels a drag must exceed to commit to a page change.
    pub distance_threshold: f32,
    /// Drags released faster than this commit regardless of distance.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "de::optional_millis"))]
    pub duration_threshold: Option<Duration>,
    /// Ignore touch input.
    pub disable_touch: bool,
    /// Ignore mouse input.
    pub disable_mouse: bool,
    /// Class set on the viewport while a swipe is being dragged.
    #[setters(strip_option, into)]
    pub dragging_class: Option<String>,
    /// Class set on the document body while a swipe is being dragged.
    #[setters(strip_option, into)]
    pub body_dragging_class: Option<String>,
    /// Keeps the viewport height at `width * ratio`.
    #[setters(strip_option)]
    pub auto_height_ratio: Option<f32>,
}

impl Default for SwiperArgs {
    fn default() -> Self {
        Self {
            start_index: 0,
            speed: DEFAULT_SPEED,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            duration_threshold: Some(DEFAULT_DURATION_THRESHOLD),
            disable_touch: false,
            disable_mouse: false,
            dragging_class: Some(DEFAULT_DRAGGING_CLASS.to_owned()),
            body_dragging_class: Some(DEFAULT_BODY_DRAGGING_CLASS.to_owned()),
            auto_height_ratio: None,
        }
    }
}

impl SwiperArgs {
    /// Normalizes out-of-range values instead of rejecting them.
    ///
    /// ```
    /// use swiper_core::SwiperArgs;
    ///
    /// let args = SwiperArgs::default()
    ///     .distance_threshold(f32::NAN)
    ///     .dragging_class("")
    ///     .auto_height_ratio(-1.0)
    ///     .sanitized();
    ///
    /// assert_eq!(args.distance_threshold, 20.0);
    /// assert_eq!(args.dragging_class, None);
    /// assert_eq!(args.auto_height_ratio, None);
    /// ```
    pub fn sanitized(mut self) -> Self {
        if !self.distance_threshold.is_finite() {
            self.distance_threshold = DEFAULT_DISTANCE_THRESHOLD;
        }
        self.distance_threshold = self.distance_threshold.max(0.0);
        self.dragging_class = non_empty(self.dragging_class);
        self.body_dragging_class = non_empty(self.body_dragging_class);
        self.auto_height_ratio = self
            .auto_height_ratio
            .filter(|ratio| ratio.is_finite() && *ratio > 0.0);
        self
    }

    /// The drag commit rules these arguments describe.
    pub fn thresholds(&self) -> SwipeThresholds {
        SwipeThresholds {
            distance: self.distance_threshold,
            duration: self.duration_threshold,
        }
    }

    /// Parses a JSON configuration record.
    ///
    /// Keys are camelCase, durations are milliseconds and `null` turns an
    /// optional feature off. Unknown keys are ignored and missing keys keep
    /// their defaults. Numeric values out of range are clamped.
    ///
    /// ```
    /// use std::time::Duration;
    /// use swiper_core::SwiperArgs;
    ///
    /// let args = SwiperArgs::from_json(r#"{ "startIndex": -3, "speed": 450, "durationThreshold": null }"#)
    ///     .expect("valid json");
    /// assert_eq!(args.start_index, 0);
    /// assert_eq!(args.speed, Duration::from_millis(450));
    /// assert_eq!(args.duration_threshold, None);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let args: SwiperArgs = serde_json::from_str(json)?;
        Ok(args.sanitized())
    }
}

fn non_empty(class: Option<String>) -> Option<String> {
    class.and_then(|class| {
        let trimmed = class.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// Errors raised while loading a configuration record.
#[cfg(feature = "serde")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The record is not valid JSON, or a value has the wrong type.
    #[error("invalid swiper configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(feature = "serde")]
mod de {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    fn non_negative(value: f64) -> f64 {
        if value.is_finite() { value.max(0.0) } else { 0.0 }
    }

    pub(super) fn index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(non_negative(value).trunc().min(usize::MAX as f64) as usize)
    }

    pub(super) fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Ok(Duration::from_millis(non_negative(value).round() as u64))
    }

    pub(super) fn optional_millis<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.map(|value| Duration::from_millis(non_negative(value).round() as u64)))
    }
}

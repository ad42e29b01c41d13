//! swiper-core is a headless, horizontally paged content slider.
//!
//! A [`Swiper`] owns a strip of panels inside a clipping viewport and shows
//! exactly one panel at a time. It follows horizontal drags with the strip,
//! dampens drags past the first and last panels, decides on release whether
//! the drag was long or fast enough to change page, and animates the strip to
//! its resting offset.
//!
//! The crate never renders. Hosts implement [`SwiperSurface`] over whatever
//! owns the viewport, forward native input as [`PointerEvent`]s and report
//! finished transitions back. [`HeadlessSurface`] is an in-memory surface for
//! frame-driven renderers and tests.
//!
//! # Notifications
//!
//! Listeners registered with [`Swiper::on`] receive [`SwiperEvent`]s:
//!
//! - `PageChange` whenever the current index changes
//! - `TransitionEnd` once the latest strip move has settled
//! - `DragStart`, `Drag` and `DragEnd` around user drags
//!
//! Rapid successive moves collapse into a single `TransitionEnd` for the
//! final target.
//!
//! ```
//! use std::time::Duration;
//! use swiper_core::{HeadlessSurface, Instant, Swiper, SwiperArgs, SwiperPhase};
//!
//! let mut swiper = Swiper::new(
//!     HeadlessSurface::new(300.0),
//!     5,
//!     SwiperArgs::default().speed(Duration::from_millis(200)),
//! );
//! swiper.move_to_index(3, None, false);
//! assert_eq!(swiper.phase(), SwiperPhase::Settling);
//!
//! swiper.tick(Instant::now() + Duration::from_secs(1));
//! assert_eq!(swiper.phase(), SwiperPhase::Idle);
//! assert_eq!(swiper.surface().strip_offset(), -900.0);
//! ```

#![deny(missing_docs, clippy::unwrap_used)]

pub mod args;
pub mod events;
pub mod gesture;
pub mod pointer;
pub mod position;
pub mod px;
pub mod surface;
mod swiper;
pub mod transition;

pub use web_time::Instant;

#[cfg(feature = "serde")]
pub use crate::args::ConfigError;
pub use crate::{
    args::SwiperArgs,
    events::{EventKind, ListenerId, SwiperEvent},
    pointer::{CancelReason, PointerEvent, PointerEventContent, PointerKind},
    px::{PointerPosition, Px},
    surface::{ClassTarget, HeadlessSurface, SwiperSurface},
    swiper::{PointerResponse, Swiper, SwiperPhase},
    transition::{Transition, TransitionToken},
};

//! Browser host for [`swiper_core`].
//!
//! [`WebSwiper::mount`] binds a slider to a viewport element laid out as
//!
//! ```html
//! <div class="viewport">        <!-- overflow: hidden -->
//!   <div class="strip">         <!-- first element child -->
//!     <section>…</section>      <!-- one panel per child -->
//!     <section>…</section>
//!   </div>
//! </div>
//! ```
//!
//! and drives it from native touch, mouse, keyboard, focus, resize and
//! `transitionend` events. The same slider is exported to JavaScript as the
//! `Swiper` class.

#![deny(missing_docs, clippy::unwrap_used)]

mod bindings;
mod dom;
mod error;
mod host;

pub use crate::{bindings::JsSwiper, dom::DomSurface, error::MountError, host::WebSwiper};
pub use swiper_core::{EventKind, ListenerId, SwiperArgs, SwiperEvent};

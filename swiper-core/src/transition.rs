//! Strip transitions and their completion bookkeeping.
//!
//! [`TransitionAnimator`] applies strip offsets through a [`SwiperSurface`],
//! picks a duration proportional to the distance left to travel, and keeps
//! track of the single completion notification owed for the latest logical
//! move.
//!
//! Every animated move gets a fresh [`TransitionToken`]. The surface is handed
//! the token together with the duration, and reports it back when the
//! transition finishes. A token that is not the latest one is ignored, so a
//! superseded move never completes.

use std::time::Duration;

use tracing::trace;
use web_time::Instant;

use crate::{px::Px, surface::SwiperSurface};

// Shortest transition a re-applied move runs for, so the platform still
// reports its completion.
const MIN_REAPPLY_DURATION: Duration = Duration::from_millis(1);

/// Identifies one animated strip move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionToken(u64);

impl TransitionToken {
    /// Returns the raw sequence number.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// An animated strip move as seen by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// How long the transform transition runs.
    pub duration: Duration,
    /// Token to report back once the transition has finished.
    pub token: TransitionToken,
}

/// A strip move request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    /// Offset the strip is at now.
    pub from: f32,
    /// Offset the strip should end at.
    pub to: f32,
    /// Current page width.
    pub page_width: Px,
    /// Page index the move settles on.
    pub index: usize,
    /// Explicit duration; `None` derives one from the distance.
    pub speed: Option<Duration>,
}

/// Duration for a move of `distance` pixels.
///
/// A full page (or more) takes `base`; shorter moves are proportionally
/// faster.
///
/// ```
/// use std::time::Duration;
/// use swiper_core::{px::Px, transition::speed_for};
///
/// let base = Duration::from_millis(300);
/// assert_eq!(speed_for(300.0, Px::new(300), base), base);
/// assert_eq!(speed_for(900.0, Px::new(300), base), base);
/// assert_eq!(speed_for(10.0, Px::new(300), base), Duration::from_millis(10));
/// assert_eq!(speed_for(0.0, Px::new(300), base), Duration::ZERO);
/// ```
pub fn speed_for(distance: f32, page_width: Px, base: Duration) -> Duration {
    let page = page_width.to_f32().max(1.0);
    let ratio = (distance.abs() / page).min(1.0);
    if !ratio.is_finite() {
        return base;
    }
    let millis = (base.as_secs_f64() * 1000.0 * f64::from(ratio)).round();
    Duration::from_millis(millis.max(0.0) as u64)
}

#[derive(Debug, Clone, Copy)]
struct OwedCompletion {
    token: TransitionToken,
    index: usize,
    deadline: Instant,
    // A live drag took over the strip; the release settles the debt.
    suspended: bool,
}

/// Drives strip transforms and owes at most one completion at a time.
#[derive(Debug, Clone)]
pub struct TransitionAnimator {
    base_speed: Duration,
    last_token: u64,
    owed: Option<OwedCompletion>,
}

impl TransitionAnimator {
    /// Creates an animator whose full-page moves take `base_speed`.
    pub fn new(base_speed: Duration) -> Self {
        Self {
            base_speed,
            last_token: 0,
            owed: None,
        }
    }

    /// Duration of a full-page move.
    pub fn base_speed(&self) -> Duration {
        self.base_speed
    }

    /// Whether a completion notification is still owed.
    pub fn is_pending(&self) -> bool {
        self.owed.is_some()
    }

    /// Index the owed completion will report.
    pub fn pending_index(&self) -> Option<usize> {
        self.owed.map(|owed| owed.index)
    }

    /// Token of the transition currently owed, if any.
    pub fn pending_token(&self) -> Option<TransitionToken> {
        self.owed.map(|owed| owed.token)
    }

    /// Moves the strip and returns the completed index when the move finished
    /// synchronously.
    ///
    /// A move that supersedes an earlier one takes over its completion
    /// obligation; only the latest target is ever reported. Moves with a zero
    /// duration, including moves that do not change the offset at all,
    /// complete before this returns since no platform signal will follow.
    pub fn animate_to<S>(
        &mut self,
        surface: &mut S,
        request: MoveRequest,
        now: Instant,
    ) -> Option<usize>
    where
        S: SwiperSurface + ?Sized,
    {
        let distance = (request.to - request.from).abs();
        let duration = if distance == 0.0 {
            Duration::ZERO
        } else {
            request
                .speed
                .unwrap_or_else(|| speed_for(distance, request.page_width, self.base_speed))
        };

        if let Some(previous) = self.owed.take() {
            trace!(
                superseded = previous.token.raw(),
                index = request.index,
                "pending transition superseded"
            );
        }

        if duration.is_zero() {
            surface.apply_strip_offset(request.to, None);
            return Some(request.index);
        }

        self.last_token += 1;
        let token = TransitionToken(self.last_token);
        self.owed = Some(OwedCompletion {
            token,
            index: request.index,
            deadline: now + duration,
            suspended: false,
        });
        surface.apply_strip_offset(request.to, Some(Transition { duration, token }));
        None
    }

    /// Applies a live-drag offset immediately.
    ///
    /// Live offsets never owe a completion. An owed completion from an earlier
    /// move is held back until the drag releases and settles.
    pub fn apply_live<S>(&mut self, surface: &mut S, offset: f32)
    where
        S: SwiperSurface + ?Sized,
    {
        if let Some(owed) = self.owed.as_mut() {
            owed.suspended = true;
        }
        surface.apply_strip_offset(offset, None);
    }

    /// Applies an offset immediately without touching the owed completion.
    pub fn apply_immediate<S>(&mut self, surface: &mut S, offset: f32)
    where
        S: SwiperSurface + ?Sized,
    {
        surface.apply_strip_offset(offset, None);
    }

    /// Re-applies `offset` after a layout change.
    ///
    /// An owed transition keeps running toward the new offset under its
    /// original token, for whatever time it had left.
    pub fn reapply<S>(&mut self, surface: &mut S, offset: f32, now: Instant)
    where
        S: SwiperSurface + ?Sized,
    {
        match self.owed {
            Some(owed) if !owed.suspended => {
                let remaining = owed
                    .deadline
                    .saturating_duration_since(now)
                    .max(MIN_REAPPLY_DURATION);
                surface.apply_strip_offset(
                    offset,
                    Some(Transition {
                        duration: remaining,
                        token: owed.token,
                    }),
                );
            }
            _ => surface.apply_strip_offset(offset, None),
        }
    }

    /// Handles a platform "transition finished" signal.
    ///
    /// Returns the completed index when `token` is the owed transition.
    pub fn complete(&mut self, token: TransitionToken) -> Option<usize> {
        match self.owed {
            Some(owed) if owed.token == token && !owed.suspended => {
                self.owed = None;
                Some(owed.index)
            }
            _ => {
                trace!(token = token.raw(), "stale transition completion ignored");
                None
            }
        }
    }

    /// Synthesizes completion for hosts without a platform signal.
    ///
    /// Returns the completed index once the owed transition's duration has
    /// elapsed at `now`.
    pub fn tick(&mut self, now: Instant) -> Option<usize> {
        match self.owed {
            Some(owed) if !owed.suspended && now >= owed.deadline => {
                self.owed = None;
                Some(owed.index)
            }
            _ => None,
        }
    }

    /// Drops the owed completion without reporting it.
    pub fn cancel(&mut self) {
        self.owed = None;
    }
}

impl Default for TransitionAnimator {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

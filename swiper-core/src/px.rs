//! Pixel units used by the slider.
//!
//! # Key Types
//!
//! - [`Px`] - A whole pixel value, used for the page width and settled strip
//!   offsets
//! - [`PointerPosition`] - A fractional client coordinate reported by a touch
//!   or mouse contact
//!
//! Page widths are whole pixels so that every panel in the strip lands on the
//! same pixel grid. Drag deltas stay fractional until they are applied to the
//! strip, since touch coordinates are fractional on high density screens.
//!
//! # Example
//!
//! ```
//! use swiper_core::px::{PointerPosition, Px};
//!
//! let width = Px::from_f32_rounded(299.6);
//! assert_eq!(width, Px::new(300));
//!
//! let start = PointerPosition::new(120.0, 40.0);
//! let now = PointerPosition::new(80.5, 42.0);
//! assert_eq!((start - now).x, 39.5);
//! ```

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A whole pixel value.
///
/// Negative values are allowed; the strip offset of every page past the first
/// one is negative.
///
/// # Examples
///
/// ```
/// use swiper_core::px::Px;
///
/// let page = Px::new(300);
/// assert_eq!(page.saturating_mul_index(2), Px::new(600));
/// assert_eq!(-page, Px::new(-300));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Px(pub i32);

impl Px {
    /// A constant representing zero pixels.
    pub const ZERO: Self = Self(0);

    /// A constant representing the maximum possible pixel value.
    pub const MAX: Self = Self(i32::MAX);

    /// Creates a new `Px` instance from an i32 value.
    pub const fn new(value: i32) -> Self {
        Px(value)
    }

    /// Returns the raw i32 value.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Returns the absolute value as a u32.
    ///
    /// ```
    /// use swiper_core::px::Px;
    ///
    /// assert_eq!(Px::new(-5).abs(), 5);
    /// ```
    pub fn abs(self) -> u32 {
        self.0.unsigned_abs()
    }

    /// Converts the pixel value to f32.
    pub fn to_f32(self) -> f32 {
        self.0 as f32
    }

    /// Creates a `Px` from an f32 value, truncating toward zero and saturating
    /// at the numeric bounds instead of overflowing.
    ///
    /// ```
    /// use swiper_core::px::Px;
    ///
    /// assert_eq!(Px::saturating_from_f32(42.7).raw(), 42);
    /// assert_eq!(Px::saturating_from_f32(f32::MAX).raw(), i32::MAX);
    /// ```
    pub fn saturating_from_f32(value: f32) -> Self {
        if value.is_nan() {
            return Px::ZERO;
        }
        let clamped_value = value.clamp(i32::MIN as f32, i32::MAX as f32);
        Px(clamped_value as i32)
    }

    /// Creates a `Px` from an f32 value rounded to the nearest whole pixel.
    ///
    /// Layout widths go through this instead of truncation so that a 299.6px
    /// viewport yields 300px pages rather than 299px ones.
    ///
    /// ```
    /// use swiper_core::px::Px;
    ///
    /// assert_eq!(Px::from_f32_rounded(299.6).raw(), 300);
    /// assert_eq!(Px::from_f32_rounded(299.4).raw(), 299);
    /// ```
    pub fn from_f32_rounded(value: f32) -> Self {
        Self::saturating_from_f32(value.round())
    }

    /// Saturating integer addition.
    pub fn saturating_add(self, rhs: Self) -> Self {
        Px(self.0.saturating_add(rhs.0))
    }

    /// Saturating integer subtraction.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Px(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by a page index, saturating at the i32 bounds.
    pub fn saturating_mul_index(self, index: usize) -> Self {
        let product = i64::from(self.0).saturating_mul(index.min(i32::MAX as usize) as i64);
        if product > i64::from(i32::MAX) {
            Px::MAX
        } else if product < i64::from(i32::MIN) {
            Px(i32::MIN)
        } else {
            Px(product as i32)
        }
    }
}

impl Neg for Px {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Px(self.0.saturating_neg())
    }
}

impl Add for Px {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub for Px {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl AddAssign for Px {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(rhs);
    }
}

impl SubAssign for Px {
    fn sub_assign(&mut self, rhs: Self) {
        *self = self.saturating_sub(rhs);
    }
}

impl From<i32> for Px {
    fn from(value: i32) -> Self {
        Px(value)
    }
}

impl From<Px> for f32 {
    fn from(px: Px) -> Self {
        px.to_f32()
    }
}

/// A contact point in client coordinates.
///
/// The coordinates are kept fractional, exactly as the platform reports them.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    /// The x coordinate.
    pub x: f32,
    /// The y coordinate.
    pub y: f32,
}

impl PointerPosition {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new position.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Sub for PointerPosition {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        PointerPosition {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Add for PointerPosition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        PointerPosition {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl From<[f32; 2]> for PointerPosition {
    fn from(pos: [f32; 2]) -> Self {
        PointerPosition::new(pos[0], pos[1])
    }
}

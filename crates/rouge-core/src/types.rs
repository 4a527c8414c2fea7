//! Shared types for the rouge compositing engine.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can hand source frames
/// to the engine without depending on `image` directly.
pub use image::RgbaImage;

/// A 2D point in surface (pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward `other` (`t = 0` is `self`, `t = 1` is `other`).
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    /// Move this point `amount` pixels further away from `origin`.
    ///
    /// A point coincident with `origin` is returned unchanged.
    #[must_use]
    pub fn push_away_from(self, origin: Self, amount: f64) -> Self {
        let (dx, dy) = (self.x - origin.x, self.y - origin.y);
        let reach = dx.hypot(dy);
        if reach <= f64::EPSILON {
            return self;
        }
        let scale = amount / reach;
        Self::new(dx.mul_add(scale, self.x), dy.mul_add(scale, self.y))
    }
}

/// Image or surface dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Returns `true` if either side is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Why a feature's geometry could not be resolved this frame.
///
/// None of these are fatal: the compositor skips the affected layer
/// and keeps drawing the rest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// No face was detected, so there is no landmark set at all.
    #[error("no landmarks available")]
    MissingLandmarks,

    /// A region references a landmark index the set does not contain.
    #[error("landmark index {index} out of range (set has {len} points)")]
    IndexOutOfRange { index: usize, len: usize },

    /// A referenced landmark has a NaN or infinite coordinate.
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    /// A measurement needed for classification collapsed to zero.
    #[error("degenerate geometry: {0}")]
    Degenerate(&'static str),
}

/// Errors constructing or exporting a [`Surface`](crate::Surface).
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// Width or height is zero, or too large to allocate.
    #[error("invalid surface dimensions {0}")]
    InvalidDimensions(Dimensions),

    /// PNG encoding of the surface failed.
    #[error("failed to encode surface: {0}")]
    Encode(#[from] image::ImageError),
}

/// Errors that abort a composite pass.
///
/// Only caller contract violations end up here; per-feature geometry
/// problems are reported in the [`CompositeReport`](crate::CompositeReport).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    /// The source image does not match the surface it is drawn onto.
    #[error("source image is {image}, surface is {surface}")]
    DimensionMismatch {
        surface: Dimensions,
        image: Dimensions,
    },

    /// The source image has a zero dimension.
    #[error("source image has invalid dimensions {0}")]
    EmptySource(Dimensions),
}

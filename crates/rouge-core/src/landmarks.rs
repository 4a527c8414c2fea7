//! Face-mesh landmark sets and the static index tables that map named
//! facial regions onto them.
//!
//! Indices follow the 468-point face mesh numbering. Iris refinement
//! appends points after these and leaves the numbering unchanged. "Left" and "right" refer to the image side,
//! so [`Side::Left`] is the subject's right eye on a mirrored selfie.
//!
//! Tables are ordered: the order defines polygon winding for fills and
//! the direction of travel for strokes (the eyeliner wing extends from
//! the last outline point).

use serde::{Deserialize, Serialize};

/// Number of points produced by the base face mesh.
pub const FACE_MESH_POINTS: usize = 468;

// ───────────────────────── named single points ─────────────────────────

pub const MOUTH_LEFT: usize = 61;
pub const MOUTH_RIGHT: usize = 291;
pub const UPPER_LIP_INNER: usize = 13;
pub const LOWER_LIP_INNER: usize = 14;
pub const LEFT_EYE_OUTER: usize = 33;
pub const LEFT_EYE_INNER: usize = 133;
pub const RIGHT_EYE_INNER: usize = 362;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const LEFT_EYE_TOP: usize = 159;
pub const LEFT_EYE_BOTTOM: usize = 145;
pub const RIGHT_EYE_TOP: usize = 386;
pub const RIGHT_EYE_BOTTOM: usize = 374;
pub const FOREHEAD_TOP: usize = 10;
pub const CHIN: usize = 152;
pub const FACE_LEFT: usize = 234;
pub const FACE_RIGHT: usize = 454;
pub const NOSE_LEFT: usize = 49;
pub const NOSE_RIGHT: usize = 279;
pub const LEFT_CHEEKBONE: usize = 116;
pub const RIGHT_CHEEKBONE: usize = 346;

// ───────────────────────────── region tables ───────────────────────────

pub const LIPS_OUTER: &[usize] = &[
    61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291, 409, 270, 269, 267, 0, 37, 39, 40, 185,
];
pub const LIPS_INNER: &[usize] = &[
    78, 95, 88, 178, 87, 14, 317, 402, 318, 324, 308, 415, 310, 311, 312, 13, 82, 81, 80, 191,
];

/// Full eye loops, both starting at the outer corner so that the final
/// segment points back toward it.
pub const LEFT_EYE_OUTLINE: &[usize] = &[
    33, 7, 163, 144, 145, 153, 154, 155, 133, 173, 157, 158, 159, 160, 161,
];
pub const RIGHT_EYE_OUTLINE: &[usize] = &[
    263, 249, 390, 373, 374, 380, 381, 382, 362, 398, 384, 385, 386, 387, 388,
];

pub const LEFT_EYE_LID: &[usize] = &[159, 160, 161, 246, 33, 7, 163, 144];
pub const RIGHT_EYE_LID: &[usize] = &[386, 385, 384, 398, 362, 382, 381, 380];

pub const LEFT_EYE_CREASE: &[usize] = &[33, 7, 163, 144, 145, 153, 154, 155];
pub const RIGHT_EYE_CREASE: &[usize] = &[362, 382, 381, 380, 374, 373, 390, 249];

pub const LEFT_BROWBONE: &[usize] = &[70, 63, 105, 66, 107, 55, 65];
pub const RIGHT_BROWBONE: &[usize] = &[300, 293, 334, 296, 336, 285, 295];

pub const LEFT_EYEBROW: &[usize] = &[70, 63, 105, 66, 107];
pub const RIGHT_EYEBROW: &[usize] = &[300, 293, 334, 296, 336];

pub const LEFT_CHEEK: &[usize] = &[116, 117, 118, 119, 100, 126, 209];
pub const RIGHT_CHEEK: &[usize] = &[346, 347, 348, 349, 329, 355, 429];

pub const LEFT_UNDER_EYE: &[usize] = &[33, 133, 157, 158, 159];
pub const RIGHT_UNDER_EYE: &[usize] = &[362, 263, 386, 387, 388];

pub const LEFT_CHEEKBONE_RIDGE: &[usize] = &[116, 117, 118];
pub const RIGHT_CHEEKBONE_RIDGE: &[usize] = &[345, 346, 347];

pub const JAWLINE: &[usize] = &[
    172, 136, 150, 149, 176, 148, 152, 377, 400, 378, 379, 365, 397, 288, 361, 323,
];
pub const FOREHEAD: &[usize] = &[54, 103, 67, 109, 10, 338, 297, 332, 284];
pub const NOSE_BRIDGE: &[usize] = &[168, 6, 197, 195, 5];
pub const CUPIDS_BOW: &[usize] = &[0, 37, 267];

/// Image side of a mirrored facial feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, left first (the order features are drawn in).
    pub const BOTH: [Self; 2] = [Self::Left, Self::Right];
}

/// A named facial region backed by a static index table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    LipsOuter,
    LipsInner,
    EyeOutline(Side),
    EyeLid(Side),
    EyeCrease(Side),
    Browbone(Side),
    Eyebrow(Side),
    Cheek(Side),
    UnderEye(Side),
    CheekboneRidge(Side),
    Jawline,
    Forehead,
    NoseBridge,
    CupidsBow,
}

impl Region {
    /// The ordered landmark indices that make up this region.
    #[must_use]
    pub const fn indices(self) -> &'static [usize] {
        match self {
            Self::LipsOuter => LIPS_OUTER,
            Self::LipsInner => LIPS_INNER,
            Self::EyeOutline(Side::Left) => LEFT_EYE_OUTLINE,
            Self::EyeOutline(Side::Right) => RIGHT_EYE_OUTLINE,
            Self::EyeLid(Side::Left) => LEFT_EYE_LID,
            Self::EyeLid(Side::Right) => RIGHT_EYE_LID,
            Self::EyeCrease(Side::Left) => LEFT_EYE_CREASE,
            Self::EyeCrease(Side::Right) => RIGHT_EYE_CREASE,
            Self::Browbone(Side::Left) => LEFT_BROWBONE,
            Self::Browbone(Side::Right) => RIGHT_BROWBONE,
            Self::Eyebrow(Side::Left) => LEFT_EYEBROW,
            Self::Eyebrow(Side::Right) => RIGHT_EYEBROW,
            Self::Cheek(Side::Left) => LEFT_CHEEK,
            Self::Cheek(Side::Right) => RIGHT_CHEEK,
            Self::UnderEye(Side::Left) => LEFT_UNDER_EYE,
            Self::UnderEye(Side::Right) => RIGHT_UNDER_EYE,
            Self::CheekboneRidge(Side::Left) => LEFT_CHEEKBONE_RIDGE,
            Self::CheekboneRidge(Side::Right) => RIGHT_CHEEKBONE_RIDGE,
            Self::Jawline => JAWLINE,
            Self::Forehead => FOREHEAD,
            Self::NoseBridge => NOSE_BRIDGE,
            Self::CupidsBow => CUPIDS_BOW,
        }
    }
}

/// A single normalized face-mesh point.
///
/// `x` and `y` are fractions (0.0–1.0) of the source image width and
/// height; `z` is the detector's relative depth and is unused by the
/// compositor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns `true` if all three coordinates are finite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One detection frame's worth of landmarks.
///
/// Immutable once built. The compositor borrows it for the duration of
/// a single pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet(Vec<Landmark>);

impl LandmarkSet {
    #[must_use]
    pub const fn new(points: Vec<Landmark>) -> Self {
        Self(points)
    }

    /// Build a set from a flat `[x0, y0, z0, x1, y1, z1, ...]` buffer,
    /// the layout a JavaScript host hands over as a `Float32Array`.
    ///
    /// Returns `None` if the length is not a multiple of three.
    #[must_use]
    pub fn from_xyz(flat: &[f32]) -> Option<Self> {
        if flat.len() % 3 != 0 {
            return None;
        }
        Some(Self(
            flat.chunks_exact(3)
                .map(|c| Landmark::new(f64::from(c[0]), f64::from(c[1]), f64::from(c[2])))
                .collect(),
        ))
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.0.get(index)
    }

    #[must_use]
    pub fn points(&self) -> &[Landmark] {
        &self.0
    }
}

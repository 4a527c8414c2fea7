//! Face proportions and expressions from normalized landmark distances.
//!
//! All measurements use the raw normalized coordinates, so results do not
//! depend on the surface size. Thresholds are fixed heuristics; each
//! classifier checks its cases in order and the first match wins.

use serde::Serialize;

use crate::landmarks::{
    CHIN, FACE_LEFT, FACE_RIGHT, FOREHEAD_TOP, LEFT_EYE_BOTTOM, LEFT_EYE_INNER, LEFT_EYE_OUTER,
    LEFT_EYE_TOP, LOWER_LIP_INNER, Landmark, LandmarkSet, MOUTH_LEFT, MOUTH_RIGHT, NOSE_LEFT,
    NOSE_RIGHT, RIGHT_EYE_BOTTOM, RIGHT_EYE_INNER, RIGHT_EYE_OUTER, RIGHT_EYE_TOP, UPPER_LIP_INNER,
};
use crate::types::GeometryError;

const ROUND_RATIO: f64 = 1.05;
const LONG_RATIO: f64 = 0.85;
const HEART_FACTOR: f64 = 1.3;

const LARGE_EYE_RATIO: f64 = 0.15;
const SMALL_EYE_RATIO: f64 = 0.1;

const FULL_LIP_RATIO: f64 = 0.3;
const THIN_LIP_RATIO: f64 = 0.2;

const WIDE_NOSE_RATIO: f64 = 0.2;
const NARROW_NOSE_RATIO: f64 = 0.15;

const MOUTH_OPEN_GAP: f64 = 0.03;
const SMILE_WIDTH: f64 = 0.1;
const EYE_CLOSED_GAP: f64 = 0.01;

macro_rules! labelled {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled!(FaceShape { Round => "round", Long => "long", Heart => "heart", Oval => "oval" });
labelled!(EyeSize { Large => "large", Medium => "medium", Small => "small" });
labelled!(LipFullness { Full => "full", Medium => "medium", Thin => "thin" });
labelled!(NoseSize { Wide => "wide", Medium => "medium", Narrow => "narrow" });

/// Expression flags for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Expressions {
    pub mouth_open: bool,
    pub smiling: bool,
    pub eyes_closed: bool,
    /// None of the other flags is set.
    pub neutral: bool,
}

/// Everything [`analyze`] measures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaceAnalysis {
    pub face_shape: FaceShape,
    pub eye_size: EyeSize,
    pub lip_fullness: LipFullness,
    pub nose_size: NoseSize,
    pub expressions: Expressions,
    pub tips: Vec<Tip>,
}

/// One piece of application advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tip {
    /// What the advice is about (`blush`, `eyeliner`, ...).
    pub topic: &'static str,
    pub advice: &'static str,
}

fn landmark(set: &LandmarkSet, index: usize) -> Result<&Landmark, GeometryError> {
    let lm = set.get(index).ok_or(GeometryError::IndexOutOfRange {
        index,
        len: set.len(),
    })?;
    if !lm.is_finite() {
        return Err(GeometryError::NonFinite { index });
    }
    Ok(lm)
}

fn dx(set: &LandmarkSet, a: usize, b: usize) -> Result<f64, GeometryError> {
    Ok((landmark(set, a)?.x - landmark(set, b)?.x).abs())
}

fn dy(set: &LandmarkSet, a: usize, b: usize) -> Result<f64, GeometryError> {
    Ok((landmark(set, a)?.y - landmark(set, b)?.y).abs())
}

fn ratio(numerator: f64, denominator: f64, what: &'static str) -> Result<f64, GeometryError> {
    if denominator <= f64::EPSILON {
        return Err(GeometryError::Degenerate(what));
    }
    Ok(numerator / denominator)
}

/// Classify from measured spans.
///
/// `eye_span` is the outer-corner to outer-corner width used by the heart
/// test.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if `face_height` is zero.
pub fn classify_face_shape(face_width: f64, face_height: f64, eye_span: f64) -> Result<FaceShape, GeometryError> {
    let r = ratio(face_width, face_height, "face height is zero")?;
    Ok(if r > ROUND_RATIO {
        FaceShape::Round
    } else if r < LONG_RATIO {
        FaceShape::Long
    } else if face_width > eye_span * HEART_FACTOR {
        FaceShape::Heart
    } else {
        FaceShape::Oval
    })
}

/// # Errors
///
/// Returns [`GeometryError`] if a needed landmark is missing or
/// non-finite, or the face height is zero.
pub fn face_shape(set: &LandmarkSet) -> Result<FaceShape, GeometryError> {
    classify_face_shape(
        dx(set, FACE_RIGHT, FACE_LEFT)?,
        dy(set, FOREHEAD_TOP, CHIN)?,
        dx(set, LEFT_EYE_OUTER, RIGHT_EYE_OUTER)?,
    )
}

/// # Errors
///
/// Returns [`GeometryError`] if a needed landmark is missing or
/// non-finite, or the face width is zero.
pub fn eye_size(set: &LandmarkSet) -> Result<EyeSize, GeometryError> {
    let left = dx(set, LEFT_EYE_OUTER, LEFT_EYE_INNER)?;
    let right = dx(set, RIGHT_EYE_INNER, RIGHT_EYE_OUTER)?;
    let r = ratio((left + right) / 2.0, dx(set, FACE_RIGHT, FACE_LEFT)?, "face width is zero")?;
    Ok(if r > LARGE_EYE_RATIO {
        EyeSize::Large
    } else if r < SMALL_EYE_RATIO {
        EyeSize::Small
    } else {
        EyeSize::Medium
    })
}

/// # Errors
///
/// Returns [`GeometryError`] if a needed landmark is missing or
/// non-finite, or the mouth width is zero.
pub fn lip_fullness(set: &LandmarkSet) -> Result<LipFullness, GeometryError> {
    let r = ratio(
        dy(set, UPPER_LIP_INNER, LOWER_LIP_INNER)?,
        dx(set, MOUTH_LEFT, MOUTH_RIGHT)?,
        "mouth width is zero",
    )?;
    Ok(if r > FULL_LIP_RATIO {
        LipFullness::Full
    } else if r < THIN_LIP_RATIO {
        LipFullness::Thin
    } else {
        LipFullness::Medium
    })
}

/// # Errors
///
/// Returns [`GeometryError`] if a needed landmark is missing or
/// non-finite, or the face width is zero.
pub fn nose_size(set: &LandmarkSet) -> Result<NoseSize, GeometryError> {
    let r = ratio(
        dx(set, NOSE_LEFT, NOSE_RIGHT)?,
        dx(set, FACE_RIGHT, FACE_LEFT)?,
        "face width is zero",
    )?;
    Ok(if r > WIDE_NOSE_RATIO {
        NoseSize::Wide
    } else if r < NARROW_NOSE_RATIO {
        NoseSize::Narrow
    } else {
        NoseSize::Medium
    })
}

/// # Errors
///
/// Returns [`GeometryError`] if a needed landmark is missing or
/// non-finite.
pub fn expressions(set: &LandmarkSet) -> Result<Expressions, GeometryError> {
    let mouth_open = dy(set, LOWER_LIP_INNER, UPPER_LIP_INNER)? > MOUTH_OPEN_GAP;
    let smiling = dx(set, MOUTH_RIGHT, MOUTH_LEFT)? > SMILE_WIDTH;
    let eyes_closed = dy(set, LEFT_EYE_BOTTOM, LEFT_EYE_TOP)? < EYE_CLOSED_GAP
        && dy(set, RIGHT_EYE_BOTTOM, RIGHT_EYE_TOP)? < EYE_CLOSED_GAP;
    Ok(Expressions {
        mouth_open,
        smiling,
        eyes_closed,
        neutral: !(mouth_open || smiling || eyes_closed),
    })
}

/// Run every classifier and collect matching tips.
///
/// # Errors
///
/// Returns the first [`GeometryError`] from any classifier.
pub fn analyze(set: &LandmarkSet) -> Result<FaceAnalysis, GeometryError> {
    let face_shape = face_shape(set)?;
    let eye_size = eye_size(set)?;
    let lip_fullness = lip_fullness(set)?;
    let mut tips = Vec::with_capacity(9);
    tips.extend_from_slice(face_shape_tips(face_shape));
    tips.extend_from_slice(eye_tips(eye_size));
    tips.extend_from_slice(lip_tips(lip_fullness));
    Ok(FaceAnalysis {
        face_shape,
        eye_size,
        lip_fullness,
        nose_size: nose_size(set)?,
        expressions: expressions(set)?,
        tips,
    })
}

#[must_use]
pub const fn face_shape_tips(shape: FaceShape) -> &'static [Tip] {
    match shape {
        FaceShape::Round => &[
            Tip { topic: "blush", advice: "Sweep blush high on the cheekbones to lengthen the face" },
            Tip { topic: "contour", advice: "Contour along the jawline and temples" },
            Tip { topic: "brows", advice: "A higher arch adds length" },
        ],
        FaceShape::Long => &[
            Tip { topic: "blush", advice: "Blend blush horizontally across the apples of the cheeks" },
            Tip { topic: "contour", advice: "Contour along the hairline and under the chin" },
            Tip { topic: "brows", advice: "Flatter brows balance the length" },
        ],
        FaceShape::Heart => &[
            Tip { topic: "blush", advice: "Place blush lower on the cheeks" },
            Tip { topic: "contour", advice: "Contour the temples and jawline" },
            Tip { topic: "brows", advice: "Rounded brows soften the forehead" },
        ],
        FaceShape::Oval => &[
            Tip { topic: "blush", advice: "Apply blush along the cheekbones" },
            Tip { topic: "contour", advice: "A light contour is enough for definition" },
            Tip { topic: "brows", advice: "Keep brows softly arched" },
        ],
    }
}

#[must_use]
pub const fn eye_tips(size: EyeSize) -> &'static [Tip] {
    match size {
        EyeSize::Small => &[
            Tip { topic: "eyeshadow", advice: "Light, shimmery shades open up the eyes" },
            Tip { topic: "eyeliner", advice: "Keep the upper line thin and brighten the waterline" },
        ],
        EyeSize::Large => &[
            Tip { topic: "eyeshadow", advice: "Deepen the outer corners" },
            Tip { topic: "eyeliner", advice: "A wing elongates the eye" },
        ],
        EyeSize::Medium => &[
            Tip { topic: "eyeshadow", advice: "Most shades work well" },
            Tip { topic: "eyeliner", advice: "A classic upper line suits" },
        ],
    }
}

#[must_use]
pub const fn lip_tips(fullness: LipFullness) -> &'static [Tip] {
    match fullness {
        LipFullness::Thin => &[
            Tip { topic: "lipstick", advice: "Light, glossy shades make lips look fuller" },
            Tip { topic: "lipliner", advice: "Overline slightly with a matching liner" },
        ],
        LipFullness::Full => &[
            Tip { topic: "lipstick", advice: "Matte and satin finishes suit full lips" },
            Tip { topic: "lipliner", advice: "Line precisely along the natural border" },
        ],
        LipFullness::Medium => &[
            Tip { topic: "lipstick", advice: "Any finish works" },
            Tip { topic: "lipliner", advice: "Follow the natural shape" },
        ],
    }
}

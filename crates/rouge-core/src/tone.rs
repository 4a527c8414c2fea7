//! Skin tone readings and the color swatches suggested for them.
//!
//! The engine does not infer tone itself. A host plugs in whatever
//! classifier it has behind [`ToneClassifier`]; [`FixedToneClassifier`]
//! reports a constant reading for hosts without one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::landmarks::LandmarkSet;
use crate::types::RgbaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinTone {
    Fair,
    Light,
    #[default]
    Medium,
    Olive,
    Tan,
    Deep,
}

impl SkinTone {
    pub const ALL: [Self; 6] = [
        Self::Fair,
        Self::Light,
        Self::Medium,
        Self::Olive,
        Self::Tan,
        Self::Deep,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fair => "fair",
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Olive => "olive",
            Self::Tan => "tan",
            Self::Deep => "deep",
        }
    }

    /// A representative swatch for display.
    #[must_use]
    pub const fn swatch(self) -> Rgb {
        match self {
            Self::Fair => Rgb::new(0xFF, 0xDB, 0xAC),
            Self::Light => Rgb::new(0xF1, 0xC2, 0x7D),
            Self::Medium => Rgb::new(0xE0, 0xAC, 0x69),
            Self::Olive => Rgb::new(0xC6, 0x86, 0x42),
            Self::Tan => Rgb::new(0x8D, 0x55, 0x24),
            Self::Deep => Rgb::new(0x5D, 0x40, 0x37),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Undertone {
    Warm,
    Cool,
    #[default]
    Neutral,
}

impl Undertone {
    pub const ALL: [Self; 3] = [Self::Warm, Self::Cool, Self::Neutral];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Neutral => "neutral",
        }
    }
}

/// A tone or undertone name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} {name:?}")]
pub struct ToneParseError {
    kind: &'static str,
    name: String,
}

macro_rules! named_enum {
    ($ty:ty, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ToneParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .into_iter()
                    .find(|v| v.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ToneParseError {
                        kind: $kind,
                        name: wanted.to_owned(),
                    })
            }
        }
    };
}

named_enum!(SkinTone, "skin tone");
named_enum!(Undertone, "undertone");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteCategory {
    Lips,
    Eyes,
    Cheeks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToneReading {
    pub skin_tone: SkinTone,
    pub undertone: Undertone,
}

/// Classifies skin tone from a frame and its landmarks.
pub trait ToneClassifier {
    fn classify(&self, image: &RgbaImage, landmarks: &LandmarkSet) -> ToneReading;
}

/// Always returns the same reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedToneClassifier(pub ToneReading);

impl ToneClassifier for FixedToneClassifier {
    fn classify(&self, _image: &RgbaImage, _landmarks: &LandmarkSet) -> ToneReading {
        self.0
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn hex(v: u32) -> Rgb {
    Rgb::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

const WARM_LIPS: [Rgb; 5] = [hex(0xFF6B6B), hex(0xFF8E53), hex(0xFFAF40), hex(0xFF5252), hex(0xE65100)];
const WARM_EYES: [Rgb; 5] = [hex(0xFF9800), hex(0xFF5722), hex(0x795548), hex(0x8D6E63), hex(0x5D4037)];
const WARM_CHEEKS: [Rgb; 5] = [hex(0xFFAB91), hex(0xFF8A65), hex(0xFF7043), hex(0xFF5722), hex(0xD84315)];

const COOL_LIPS: [Rgb; 5] = [hex(0xE91E63), hex(0x9C27B0), hex(0x673AB7), hex(0x3F51B5), hex(0x2196F3)];
const COOL_EYES: [Rgb; 5] = [hex(0x7E57C2), hex(0x5C6BC0), hex(0x42A5F5), hex(0x26C6DA), hex(0x0097A7)];
const COOL_CHEEKS: [Rgb; 5] = [hex(0xF48FB1), hex(0xEC407A), hex(0xD81B60), hex(0xC2185B), hex(0x880E4F)];

const NEUTRAL_LIPS: [Rgb; 5] = [hex(0xFF4081), hex(0xF50057), hex(0xC51162), hex(0xFF5252), hex(0xFF1744)];
const NEUTRAL_EYES: [Rgb; 5] = [hex(0x9C27B0), hex(0x673AB7), hex(0x3F51B5), hex(0x2196F3), hex(0x00BCD4)];
const NEUTRAL_CHEEKS: [Rgb; 5] = [hex(0xFF80AB), hex(0xF06292), hex(0xEC407A), hex(0xE91E63), hex(0xD81B60)];

const DEFAULT_LIPS: [Rgb; 4] = [hex(0xFF4081), hex(0xD81B60), hex(0xC2185B), hex(0x880E4F)];
const DEFAULT_EYES: [Rgb; 4] = [hex(0x9C27B0), hex(0x673AB7), hex(0x3F51B5), hex(0x2196F3)];
const DEFAULT_CHEEKS: [Rgb; 4] = [hex(0xFF80AB), hex(0xF06292), hex(0xEC407A), hex(0xE91E63)];

/// Suggested swatches for an undertone.
#[must_use]
pub const fn palette(undertone: Undertone, category: PaletteCategory) -> &'static [Rgb] {
    match (undertone, category) {
        (Undertone::Warm, PaletteCategory::Lips) => &WARM_LIPS,
        (Undertone::Warm, PaletteCategory::Eyes) => &WARM_EYES,
        (Undertone::Warm, PaletteCategory::Cheeks) => &WARM_CHEEKS,
        (Undertone::Cool, PaletteCategory::Lips) => &COOL_LIPS,
        (Undertone::Cool, PaletteCategory::Eyes) => &COOL_EYES,
        (Undertone::Cool, PaletteCategory::Cheeks) => &COOL_CHEEKS,
        (Undertone::Neutral, PaletteCategory::Lips) => &NEUTRAL_LIPS,
        (Undertone::Neutral, PaletteCategory::Eyes) => &NEUTRAL_EYES,
        (Undertone::Neutral, PaletteCategory::Cheeks) => &NEUTRAL_CHEEKS,
    }
}

/// Swatches shown before any reading is available.
#[must_use]
pub const fn default_palette(category: PaletteCategory) -> &'static [Rgb] {
    match category {
        PaletteCategory::Lips => &DEFAULT_LIPS,
        PaletteCategory::Eyes => &DEFAULT_EYES,
        PaletteCategory::Cheeks => &DEFAULT_CHEEKS,
    }
}

/// A reading together with the swatches it suggests.
///
/// Without a reading the default palette is used and no skin swatch is
/// given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToneSuggestion {
    pub reading: Option<ToneReading>,
    pub skin_swatch: Option<Rgb>,
    pub lips: Vec<Rgb>,
    pub eyes: Vec<Rgb>,
    pub cheeks: Vec<Rgb>,
}

impl ToneSuggestion {
    #[must_use]
    pub fn new(reading: Option<ToneReading>) -> Self {
        let pick = |category| match reading {
            Some(r) => palette(r.undertone, category).to_vec(),
            None => default_palette(category).to_vec(),
        };
        Self {
            reading,
            skin_swatch: reading.map(|r| r.skin_tone.swatch()),
            lips: pick(PaletteCategory::Lips),
            eyes: pick(PaletteCategory::Eyes),
            cheeks: pick(PaletteCategory::Cheeks),
        }
    }
}

/// Classify a frame and look up the swatches for the reading.
#[must_use]
pub fn suggest<C: ToneClassifier + ?Sized>(
    classifier: &C,
    image: &RgbaImage,
    landmarks: &LandmarkSet,
) -> ToneSuggestion {
    let reading = classifier.classify(image, landmarks);
    tracing::debug!(skin_tone = %reading.skin_tone, undertone = %reading.undertone, "tone classified");
    ToneSuggestion::new(Some(reading))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn fixed_classifier_ignores_input() {
        let reading = ToneReading {
            skin_tone: SkinTone::Olive,
            undertone: Undertone::Warm,
        };
        let c = FixedToneClassifier(reading);
        let img = RgbaImage::new(2, 2);
        let lm = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0)]);
        assert_eq!(c.classify(&img, &lm), reading);
    }

    #[test]
    fn palettes_decode_hex() {
        assert_eq!(
            palette(Undertone::Cool, PaletteCategory::Cheeks)[4],
            Rgb::new(0x88, 0x0E, 0x4F)
        );
        assert_eq!(palette(Undertone::Warm, PaletteCategory::Lips)[0].to_string(), "#ff6b6b");
        assert_eq!(default_palette(PaletteCategory::Eyes).len(), 4);
    }

    #[test]
    fn swatches_get_darker() {
        let luma = |c: Rgb| u32::from(c.r) + u32::from(c.g) + u32::from(c.b);
        for pair in SkinTone::ALL.windows(2) {
            assert!(luma(pair[0].swatch()) > luma(pair[1].swatch()));
        }
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!("Olive".parse::<SkinTone>().unwrap(), SkinTone::Olive);
        assert_eq!(" cool ".parse::<Undertone>().unwrap(), Undertone::Cool);
        for tone in SkinTone::ALL {
            assert_eq!(tone.to_string().parse::<SkinTone>().unwrap(), tone);
        }
        let err = "purple".parse::<Undertone>().unwrap_err();
        assert_eq!(err.to_string(), "unknown undertone \"purple\"");
    }

    #[test]
    fn suggestion_follows_undertone() {
        let reading = ToneReading {
            skin_tone: SkinTone::Tan,
            undertone: Undertone::Cool,
        };
        let img = RgbaImage::new(2, 2);
        let lm = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0)]);
        let s = suggest(&FixedToneClassifier(reading), &img, &lm);
        assert_eq!(s.reading, Some(reading));
        assert_eq!(s.skin_swatch, Some(SkinTone::Tan.swatch()));
        assert_eq!(s.lips, palette(Undertone::Cool, PaletteCategory::Lips));
        assert_eq!(s.cheeks.len(), 5);
    }

    #[test]
    fn suggestion_without_reading_uses_default_palette() {
        let s = ToneSuggestion::new(None);
        assert_eq!(s.skin_swatch, None);
        assert_eq!(s.eyes, default_palette(PaletteCategory::Eyes));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["lips"][0], "#ff4081");
        assert!(json["reading"].is_null());
    }
}

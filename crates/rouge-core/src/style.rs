//! Per-feature cosmetic settings.
//!
//! [`StyleState`] is a fixed struct of typed records, one per
//! [`Feature`]. Rust code reads and writes fields directly; hosts that only
//! know feature and property names (sliders, presets, saved JSON) go
//! through [`StyleState::update`] and [`StyleState::get`], which check the
//! name and the value's JSON kind against the typed record before
//! accepting anything.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::color::Rgb;

/// A cosmetic category with its own record and draw routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Foundation,
    Concealer,
    Blush,
    Bronzer,
    Eyeshadow,
    Eyeliner,
    Brows,
    Lipliner,
    Lips,
    Highlighter,
    SettingSpray,
}

impl Feature {
    /// Every feature, in compositing order (bottom layer first).
    pub const DRAW_ORDER: [Self; 11] = [
        Self::Foundation,
        Self::Concealer,
        Self::Blush,
        Self::Bronzer,
        Self::Eyeshadow,
        Self::Eyeliner,
        Self::Brows,
        Self::Lipliner,
        Self::Lips,
        Self::Highlighter,
        Self::SettingSpray,
    ];

    /// The record's key in [`StyleState`] JSON.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::Concealer => "concealer",
            Self::Blush => "blush",
            Self::Bronzer => "bronzer",
            Self::Eyeshadow => "eyeshadow",
            Self::Eyeliner => "eyeliner",
            Self::Brows => "brows",
            Self::Lipliner => "lipliner",
            Self::Lips => "lips",
            Self::Highlighter => "highlighter",
            Self::SettingSpray => "setting_spray",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::DRAW_ORDER.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Option enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Texture {
    #[default]
    Matte,
    Dewy,
    Satin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoundationFinish {
    #[default]
    Natural,
    Full,
    Sheer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcealerArea {
    UnderEyes,
    Blemishes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Cream,
    Powder,
    Liquid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlushPlacement {
    /// A round patch on the apple of each cheek.
    #[default]
    Apples,
    /// An ellipse swept outward along the cheekbone.
    Cheekbones,
    /// The apple patch plus a lobe up toward the temple.
    Draping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BronzerArea {
    Forehead,
    Cheekbones,
    Jawline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightArea {
    Cheekbones,
    Nose,
    CupidsBow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowPosition {
    Crease,
    Lid,
    Browbone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadowFinish {
    #[default]
    Matte,
    Shimmer,
    Metallic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinerType {
    #[default]
    Liquid,
    Gel,
    Pencil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EyelinerStyle {
    Natural,
    #[default]
    Winged,
    CatEye,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowStyle {
    #[default]
    Natural,
    Defined,
    Feathered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowShape {
    #[default]
    Arched,
    Straight,
    Rounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LipType {
    #[default]
    Liquid,
    Bullet,
    Gloss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LipFinish {
    #[default]
    Matte,
    Satin,
    Gloss,
}

// ---------------------------------------------------------------------------
// Feature records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Foundation {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    pub coverage: f64,
    pub blend: f64,
    pub texture: Texture,
    pub finish: FoundationFinish,
}

impl Default for Foundation {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgb::new(0xF5, 0xDE, 0xB3),
            opacity: 0.7,
            coverage: 0.8,
            blend: 0.5,
            texture: Texture::Matte,
            finish: FoundationFinish::Natural,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Concealer {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    pub areas: Vec<ConcealerArea>,
    pub intensity: f64,
}

impl Default for Concealer {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::new(0xFF, 0xF8, 0xE1),
            opacity: 0.9,
            areas: vec![ConcealerArea::UnderEyes, ConcealerArea::Blemishes],
            intensity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Blush {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    #[serde(rename = "type")]
    pub kind: ProductType,
    pub placement: BlushPlacement,
    /// Gradient radius in pixels.
    pub radius: f64,
}

impl Default for Blush {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgb::new(0xFF, 0x80, 0xAB),
            opacity: 0.4,
            kind: ProductType::Cream,
            placement: BlushPlacement::Apples,
            radius: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Bronzer {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    pub areas: Vec<BronzerArea>,
    /// Scales contour stroke widths.
    pub contour: f64,
}

impl Default for Bronzer {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::new(0xD2, 0xB4, 0x8C),
            opacity: 0.3,
            areas: vec![
                BronzerArea::Forehead,
                BronzerArea::Cheekbones,
                BronzerArea::Jawline,
            ],
            contour: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Highlighter {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    #[serde(rename = "type")]
    pub kind: ProductType,
    pub areas: Vec<HighlightArea>,
    /// Alpha at the center of each highlight.
    pub intensity: f64,
    pub shimmer: f64,
    pub radius: f64,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::new(0xFF, 0xF8, 0xE1),
            opacity: 0.6,
            kind: ProductType::Powder,
            areas: vec![
                HighlightArea::Cheekbones,
                HighlightArea::Nose,
                HighlightArea::CupidsBow,
            ],
            intensity: 0.7,
            shimmer: 0.3,
            radius: 18.0,
        }
    }
}

/// One color of a multi-layer eyeshadow look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShadowLayer {
    pub color: Rgb,
    pub position: ShadowPosition,
    pub opacity: f64,
}

impl ShadowLayer {
    #[must_use]
    pub const fn new(color: Rgb, position: ShadowPosition, opacity: f64) -> Self {
        Self {
            color,
            position,
            opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Eyeshadow {
    pub enabled: bool,
    /// Master opacity, multiplied into each layer's own opacity.
    pub opacity: f64,
    pub layers: Vec<ShadowLayer>,
    /// Softening applied to the shadow edges; blur sigma is `blend * 3`.
    pub blend: f64,
    pub finish: ShadowFinish,
}

impl Default for Eyeshadow {
    fn default() -> Self {
        Self {
            enabled: true,
            opacity: 1.0,
            layers: vec![
                ShadowLayer::new(Rgb::new(0x9C, 0x27, 0xB0), ShadowPosition::Crease, 0.6),
                ShadowLayer::new(Rgb::new(0x67, 0x3A, 0xB7), ShadowPosition::Lid, 0.8),
                ShadowLayer::new(Rgb::new(0xE1, 0xBE, 0xE7), ShadowPosition::Browbone, 0.4),
            ],
            blend: 0.7,
            finish: ShadowFinish::Matte,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Eyeliner {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    #[serde(rename = "type")]
    pub kind: LinerType,
    pub style: EyelinerStyle,
    pub thickness: f64,
    pub wing_length: f64,
}

impl Default for Eyeliner {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgb::new(0, 0, 0),
            opacity: 0.9,
            kind: LinerType::Liquid,
            style: EyelinerStyle::Winged,
            thickness: 2.0,
            wing_length: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Brows {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    pub style: BrowStyle,
    pub fill: f64,
    pub shape: BrowShape,
    pub thickness: f64,
}

impl Default for Brows {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::new(0x3E, 0x27, 0x23),
            opacity: 0.6,
            style: BrowStyle::Natural,
            fill: 0.7,
            shape: BrowShape::Arched,
            thickness: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Lipliner {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    pub thickness: f64,
    /// Draw slightly outside the natural lip line.
    pub overlined: bool,
}

impl Default for Lipliner {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Rgb::new(0xD8, 0x1B, 0x60),
            opacity: 0.9,
            thickness: 1.0,
            overlined: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Lips {
    pub enabled: bool,
    pub color: Rgb,
    pub opacity: f64,
    #[serde(rename = "type")]
    pub kind: LipType,
    pub finish: LipFinish,
}

impl Default for Lips {
    fn default() -> Self {
        Self {
            enabled: true,
            color: Rgb::new(0xFF, 0x40, 0x81),
            opacity: 0.8,
            kind: LipType::Liquid,
            finish: LipFinish::Matte,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingSpray {
    pub enabled: bool,
    pub intensity: f64,
    pub dewy_finish: f64,
}

impl Default for SettingSpray {
    fn default() -> Self {
        Self {
            enabled: false,
            intensity: 0.5,
            dewy_finish: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// StyleState
// ---------------------------------------------------------------------------

/// The full set of cosmetic settings at one point in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleState {
    pub foundation: Foundation,
    pub concealer: Concealer,
    pub blush: Blush,
    pub bronzer: Bronzer,
    pub highlighter: Highlighter,
    pub eyeshadow: Eyeshadow,
    pub eyeliner: Eyeliner,
    pub brows: Brows,
    pub lipliner: Lipliner,
    pub lips: Lips,
    pub setting_spray: SettingSpray,
}

/// Result of a by-name [`StyleState::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    UnknownFeature,
    UnknownProperty,
    /// The value has the wrong JSON kind, is not a valid option, or is
    /// out of range. State is unchanged.
    Rejected(String),
}

impl UpdateOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Errors loading a [`StyleState`] from external data.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl StyleState {
    /// Whether `feature` is switched on.
    #[must_use]
    pub const fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Foundation => self.foundation.enabled,
            Feature::Concealer => self.concealer.enabled,
            Feature::Blush => self.blush.enabled,
            Feature::Bronzer => self.bronzer.enabled,
            Feature::Eyeshadow => self.eyeshadow.enabled,
            Feature::Eyeliner => self.eyeliner.enabled,
            Feature::Brows => self.brows.enabled,
            Feature::Lipliner => self.lipliner.enabled,
            Feature::Lips => self.lips.enabled,
            Feature::Highlighter => self.highlighter.enabled,
            Feature::SettingSpray => self.setting_spray.enabled,
        }
    }

    pub const fn set_enabled(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::Foundation => &mut self.foundation.enabled,
            Feature::Concealer => &mut self.concealer.enabled,
            Feature::Blush => &mut self.blush.enabled,
            Feature::Bronzer => &mut self.bronzer.enabled,
            Feature::Eyeshadow => &mut self.eyeshadow.enabled,
            Feature::Eyeliner => &mut self.eyeliner.enabled,
            Feature::Brows => &mut self.brows.enabled,
            Feature::Lipliner => &mut self.lipliner.enabled,
            Feature::Lips => &mut self.lips.enabled,
            Feature::Highlighter => &mut self.highlighter.enabled,
            Feature::SettingSpray => &mut self.setting_spray.enabled,
        };
        *slot = enabled;
    }

    /// Enabled and with something to paint.
    ///
    /// Setting spray has no opacity of its own; its `intensity` plays
    /// that role.
    #[must_use]
    pub fn is_active(&self, feature: Feature) -> bool {
        let strength = match feature {
            Feature::Foundation => self.foundation.opacity,
            Feature::Concealer => self.concealer.opacity,
            Feature::Blush => self.blush.opacity,
            Feature::Bronzer => self.bronzer.opacity,
            Feature::Eyeshadow => self.eyeshadow.opacity,
            Feature::Eyeliner => self.eyeliner.opacity,
            Feature::Brows => self.brows.opacity,
            Feature::Lipliner => self.lipliner.opacity,
            Feature::Lips => self.lips.opacity,
            Feature::Highlighter => self.highlighter.opacity,
            Feature::SettingSpray => self.setting_spray.intensity,
        };
        self.is_enabled(feature) && strength > 0.0
    }

    /// `true` if any feature is enabled.
    #[must_use]
    pub fn has_makeup_applied(&self) -> bool {
        Feature::DRAW_ORDER.iter().any(|&f| self.is_enabled(f))
    }

    /// Restore every record to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// An owned deep copy, suitable for history.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Replace the whole state with `snapshot`.
    pub fn restore(&mut self, snapshot: &Self) {
        self.clone_from(snapshot);
    }

    /// Set one property by name.
    ///
    /// Applied only when the feature and property exist, `value` has the
    /// same JSON kind as the current value, and the resulting record
    /// deserializes and passes range checks. Otherwise the state is left
    /// untouched and the outcome says why.
    pub fn update(&mut self, feature: &str, property: &str, value: Value) -> UpdateOutcome {
        let Some(feature) = Feature::from_name(feature) else {
            return UpdateOutcome::UnknownFeature;
        };
        let mut record = match self.record_map(feature) {
            Ok(map) => map,
            Err(e) => return UpdateOutcome::Rejected(e.to_string()),
        };
        let Some(current) = record.get_mut(property) else {
            return UpdateOutcome::UnknownProperty;
        };
        if !same_kind(current, &value) {
            return UpdateOutcome::Rejected(format!(
                "{feature}.{property} expects {}, got {}",
                kind_name(current),
                kind_name(&value)
            ));
        }
        *current = value;
        match self.with_record(feature, record) {
            Ok(next) => {
                *self = next;
                UpdateOutcome::Applied
            }
            Err(e) => UpdateOutcome::Rejected(e.to_string()),
        }
    }

    /// Read one property by name.
    ///
    /// Values come back in the record's canonical form, not as they were
    /// passed to [`update`](Self::update): numbers are floats (`4` reads
    /// back as `4.0`) and colors are lowercase `#rrggbb` (`"#D81B60"`
    /// reads back as `"#d81b60"`).
    #[must_use]
    pub fn get(&self, feature: &str, property: &str) -> Option<Value> {
        let feature = Feature::from_name(feature)?;
        self.record_map(feature).ok()?.remove(property)
    }

    /// Shallow-merge `partial` into a feature's record.
    ///
    /// Every key must name a property of the record; the merged record
    /// must deserialize and pass range checks. On error the state is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`] if the merged record is invalid.
    pub fn merge(&mut self, feature: Feature, partial: &Map<String, Value>) -> Result<(), StyleError> {
        let mut record = self.record_map(feature)?;
        for (key, value) in partial {
            record.insert(key.clone(), value.clone());
        }
        *self = self.with_record(feature, record)?;
        Ok(())
    }

    /// Serialize one feature's record.
    ///
    /// # Errors
    ///
    /// Serialization of these plain records does not fail in practice.
    pub fn record_json(&self, feature: Feature) -> Result<Value, serde_json::Error> {
        match feature {
            Feature::Foundation => serde_json::to_value(&self.foundation),
            Feature::Concealer => serde_json::to_value(&self.concealer),
            Feature::Blush => serde_json::to_value(&self.blush),
            Feature::Bronzer => serde_json::to_value(&self.bronzer),
            Feature::Eyeshadow => serde_json::to_value(&self.eyeshadow),
            Feature::Eyeliner => serde_json::to_value(&self.eyeliner),
            Feature::Brows => serde_json::to_value(&self.brows),
            Feature::Lipliner => serde_json::to_value(&self.lipliner),
            Feature::Lips => serde_json::to_value(&self.lips),
            Feature::Highlighter => serde_json::to_value(&self.highlighter),
            Feature::SettingSpray => serde_json::to_value(&self.setting_spray),
        }
    }

    fn record_map(&self, feature: Feature) -> Result<Map<String, Value>, serde_json::Error> {
        serde_json::from_value(self.record_json(feature)?)
    }

    /// A copy of `self` with one record replaced by `record`.
    fn with_record(&self, feature: Feature, record: Map<String, Value>) -> Result<Self, StyleError> {
        let record = Value::Object(record);
        let mut next = self.clone();
        match feature {
            Feature::Foundation => next.foundation = serde_json::from_value(record)?,
            Feature::Concealer => next.concealer = serde_json::from_value(record)?,
            Feature::Blush => next.blush = serde_json::from_value(record)?,
            Feature::Bronzer => next.bronzer = serde_json::from_value(record)?,
            Feature::Eyeshadow => next.eyeshadow = serde_json::from_value(record)?,
            Feature::Eyeliner => next.eyeliner = serde_json::from_value(record)?,
            Feature::Brows => next.brows = serde_json::from_value(record)?,
            Feature::Lipliner => next.lipliner = serde_json::from_value(record)?,
            Feature::Lips => next.lips = serde_json::from_value(record)?,
            Feature::Highlighter => next.highlighter = serde_json::from_value(record)?,
            Feature::SettingSpray => next.setting_spray = serde_json::from_value(record)?,
        }
        next.validate()?;
        Ok(next)
    }

    /// Check every numeric setting against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::OutOfRange`] for the first offending field.
    pub fn validate(&self) -> Result<(), StyleError> {
        let unit = [
            ("foundation.opacity", self.foundation.opacity),
            ("foundation.coverage", self.foundation.coverage),
            ("foundation.blend", self.foundation.blend),
            ("concealer.opacity", self.concealer.opacity),
            ("concealer.intensity", self.concealer.intensity),
            ("blush.opacity", self.blush.opacity),
            ("bronzer.opacity", self.bronzer.opacity),
            ("bronzer.contour", self.bronzer.contour),
            ("highlighter.opacity", self.highlighter.opacity),
            ("highlighter.intensity", self.highlighter.intensity),
            ("highlighter.shimmer", self.highlighter.shimmer),
            ("eyeshadow.opacity", self.eyeshadow.opacity),
            ("eyeshadow.blend", self.eyeshadow.blend),
            ("eyeliner.opacity", self.eyeliner.opacity),
            ("brows.opacity", self.brows.opacity),
            ("brows.fill", self.brows.fill),
            ("lipliner.opacity", self.lipliner.opacity),
            ("lips.opacity", self.lips.opacity),
            ("setting_spray.intensity", self.setting_spray.intensity),
            ("setting_spray.dewy_finish", self.setting_spray.dewy_finish),
        ];
        for (field, value) in unit {
            check_range(field, value, 0.0, 1.0)?;
        }
        for (i, layer) in self.eyeshadow.layers.iter().enumerate() {
            check_range(&format!("eyeshadow.layers[{i}].opacity"), layer.opacity, 0.0, 1.0)?;
        }
        let lengths = [
            ("blush.radius", self.blush.radius),
            ("highlighter.radius", self.highlighter.radius),
            ("eyeliner.thickness", self.eyeliner.thickness),
            ("eyeliner.wing_length", self.eyeliner.wing_length),
            ("brows.thickness", self.brows.thickness),
            ("lipliner.thickness", self.lipliner.thickness),
        ];
        for (field, value) in lengths {
            check_range(field, value, 0.0, MAX_LENGTH_PX)?;
        }
        Ok(())
    }

    /// Serialize the whole state.
    ///
    /// # Errors
    ///
    /// Serialization of these plain records does not fail in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse and validate a whole state. Missing records and properties
    /// take their defaults; unknown ones are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError`] on malformed JSON or out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let state: Self = serde_json::from_str(json)?;
        state.validate()?;
        Ok(state)
    }
}

/// Upper bound for pixel lengths (stroke widths, radii).
const MAX_LENGTH_PX: f64 = 500.0;

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), StyleError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(StyleError::OutOfRange {
            field: field.to_owned(),
            value,
            min,
            max,
        })
    }
}

const fn same_kind(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Null, Value::Null)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

const fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

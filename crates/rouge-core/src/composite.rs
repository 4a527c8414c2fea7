//! One composite pass: base image, then every active feature layer in a
//! fixed order.

use std::time::Duration;

use serde::Serialize;

use crate::draw::{Canvas, draw_feature};
use crate::landmarks::LandmarkSet;
use crate::style::{Feature, StyleState};
use crate::surface::Surface;
use crate::types::{ComposeError, GeometryError, RgbaImage};

/// Serialize a `Duration` as fractional seconds.
mod seconds {
    use std::time::Duration;

    use serde::{Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }
}

/// What happened to one feature layer during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum LayerOutcome {
    Drawn,
    /// Switched off, or nothing to draw at the current opacity.
    Disabled,
    /// The feature's geometry could not be resolved; nothing was drawn.
    Skipped(#[serde(serialize_with = "display")] GeometryError),
}

fn display<S: serde::Serializer>(err: &GeometryError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(err)
}

impl LayerOutcome {
    #[must_use]
    pub const fn is_drawn(&self) -> bool {
        matches!(self, Self::Drawn)
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

impl std::fmt::Display for LayerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drawn => f.write_str("drawn"),
            Self::Disabled => f.write_str("disabled"),
            Self::Skipped(e) => write!(f, "skipped ({e})"),
        }
    }
}

/// One row of a [`CompositeReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    pub feature: Feature,
    #[serde(flatten)]
    pub outcome: LayerOutcome,
}

/// Summary of a composite pass.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeReport {
    /// `false` when no landmarks were supplied and only the base was drawn.
    pub face_present: bool,
    /// Per-feature outcomes in draw order. Empty without a face.
    pub layers: Vec<LayerReport>,
    /// Wall-clock time of the whole pass (seconds when serialized).
    #[serde(with = "seconds")]
    pub elapsed: Duration,
}

impl CompositeReport {
    /// Outcome recorded for `feature`, if the pass reached it.
    #[must_use]
    pub fn outcome(&self, feature: Feature) -> Option<&LayerOutcome> {
        self.layers
            .iter()
            .find(|l| l.feature == feature)
            .map(|l| &l.outcome)
    }

    /// Features that were actually painted, in draw order.
    #[must_use]
    pub fn drawn(&self) -> Vec<Feature> {
        self.layers
            .iter()
            .filter(|l| l.outcome.is_drawn())
            .map(|l| l.feature)
            .collect()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.layers.iter().filter(|l| l.outcome.is_skipped()).count()
    }
}

/// Paints a single feature layer onto a canvas.
///
/// [`composite`] uses [`StandardPainter`]; hosts and tests can substitute
/// their own through [`composite_with`].
pub trait FeaturePainter {
    /// Paint `feature` from `style`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the feature's regions cannot be
    /// resolved. Implementations must not draw anything in that case.
    fn paint(
        &mut self,
        canvas: &mut Canvas<'_>,
        style: &StyleState,
        feature: Feature,
    ) -> Result<(), GeometryError>;
}

/// The built-in draw routines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPainter;

impl FeaturePainter for StandardPainter {
    fn paint(
        &mut self,
        canvas: &mut Canvas<'_>,
        style: &StyleState,
        feature: Feature,
    ) -> Result<(), GeometryError> {
        draw_feature(canvas, style, feature)
    }
}

/// Render `source` with `style` applied onto `surface`.
///
/// The surface is cleared and the source drawn as the base layer. With no
/// landmarks nothing else is drawn. Otherwise each feature in
/// [`Feature::DRAW_ORDER`] is either painted, reported disabled, or
/// skipped when its geometry cannot be resolved.
///
/// # Errors
///
/// Returns [`ComposeError`] if `source` is empty or its size differs from
/// the surface. The surface is left untouched in that case.
pub fn composite(
    surface: &mut Surface,
    source: &RgbaImage,
    landmarks: Option<&LandmarkSet>,
    style: &StyleState,
) -> Result<CompositeReport, ComposeError> {
    composite_with(&mut StandardPainter, surface, source, landmarks, style)
}

/// [`composite`] with a caller-supplied painter.
///
/// # Errors
///
/// Same as [`composite`].
pub fn composite_with<P: FeaturePainter>(
    painter: &mut P,
    surface: &mut Surface,
    source: &RgbaImage,
    landmarks: Option<&LandmarkSet>,
    style: &StyleState,
) -> Result<CompositeReport, ComposeError> {
    let start = web_time::Instant::now();

    surface.draw_base(source)?;

    let Some(landmarks) = landmarks else {
        tracing::debug!("no landmarks, drew base only");
        return Ok(CompositeReport {
            face_present: false,
            layers: Vec::new(),
            elapsed: start.elapsed(),
        });
    };

    let dimensions = surface.dimensions();
    let mut canvas = Canvas {
        pixmap: surface.pixmap_mut(),
        landmarks,
        dimensions,
    };
    let mut layers = Vec::with_capacity(Feature::DRAW_ORDER.len());
    for feature in Feature::DRAW_ORDER {
        let outcome = if style.is_active(feature) {
            match painter.paint(&mut canvas, style, feature) {
                Ok(()) => {
                    tracing::debug!(%feature, "layer drawn");
                    LayerOutcome::Drawn
                }
                Err(e) => {
                    tracing::warn!(%feature, error = %e, "skipping layer");
                    LayerOutcome::Skipped(e)
                }
            }
        } else {
            LayerOutcome::Disabled
        };
        layers.push(LayerReport { feature, outcome });
    }

    Ok(CompositeReport {
        face_present: true,
        layers,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::landmarks::{FACE_MESH_POINTS, Landmark};

    struct Recorder(Vec<Feature>);

    impl FeaturePainter for Recorder {
        fn paint(
            &mut self,
            _canvas: &mut Canvas<'_>,
            _style: &StyleState,
            feature: Feature,
        ) -> Result<(), GeometryError> {
            self.0.push(feature);
            Ok(())
        }
    }

    fn flat_face() -> LandmarkSet {
        LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0); FACE_MESH_POINTS])
    }

    fn gray(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([128, 128, 128, 255]))
    }

    #[test]
    fn no_landmarks_paints_nothing() {
        let mut surface = Surface::new(8, 8).unwrap();
        let mut spy = Recorder(Vec::new());
        let style = StyleState::default();
        let report = composite_with(&mut spy, &mut surface, &gray(8, 8), None, &style).unwrap();
        assert!(spy.0.is_empty());
        assert!(!report.face_present);
        assert!(report.layers.is_empty());
        assert_eq!(surface.to_rgba_image(), gray(8, 8));
    }

    #[test]
    fn painter_sees_active_features_in_order() {
        let mut surface = Surface::new(8, 8).unwrap();
        let mut spy = Recorder(Vec::new());
        let mut style = StyleState::default();
        style.lips.opacity = 0.0;
        let report =
            composite_with(&mut spy, &mut surface, &gray(8, 8), Some(&flat_face()), &style).unwrap();
        assert_eq!(
            spy.0,
            [
                Feature::Foundation,
                Feature::Blush,
                Feature::Eyeshadow,
                Feature::Eyeliner,
            ]
        );
        assert_eq!(report.layers.len(), Feature::DRAW_ORDER.len());
        assert_eq!(report.outcome(Feature::Lips), Some(&LayerOutcome::Disabled));
        assert_eq!(report.drawn(), spy.0);
    }

    #[test]
    fn mismatch_leaves_surface_untouched() {
        let mut surface = Surface::from_rgba_image(&gray(4, 4)).unwrap();
        let before = surface.data().to_vec();
        let err = composite(&mut surface, &gray(5, 4), None, &StyleState::default()).unwrap_err();
        assert!(matches!(err, ComposeError::DimensionMismatch { .. }));
        assert_eq!(surface.data(), before.as_slice());
    }

    #[test]
    fn short_landmark_set_skips_without_aborting() {
        let mut surface = Surface::new(16, 16).unwrap();
        let landmarks = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0); 10]);
        let report = composite(
            &mut surface,
            &gray(16, 16),
            Some(&landmarks),
            &StyleState::default(),
        )
        .unwrap();
        // Foundation needs no landmarks; the rest reference high indices.
        assert_eq!(report.outcome(Feature::Foundation), Some(&LayerOutcome::Drawn));
        assert!(report.outcome(Feature::Lips).unwrap().is_skipped());
        assert_eq!(report.skipped_count(), 4);
    }

    #[test]
    fn report_serializes_outcomes() {
        let report = CompositeReport {
            face_present: true,
            layers: vec![
                LayerReport {
                    feature: Feature::Lips,
                    outcome: LayerOutcome::Drawn,
                },
                LayerReport {
                    feature: Feature::SettingSpray,
                    outcome: LayerOutcome::Skipped(GeometryError::MissingLandmarks),
                },
            ],
            elapsed: Duration::from_millis(1500),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed"], 1.5);
        assert_eq!(json["layers"][0]["feature"], "lips");
        assert_eq!(json["layers"][0]["status"], "drawn");
        assert_eq!(json["layers"][1]["status"], "skipped");
        assert_eq!(json["layers"][1]["reason"], "no landmarks available");
    }
}

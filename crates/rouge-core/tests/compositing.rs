//! Integration tests: full composite passes over a synthetic face.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rouge_core::composite::LayerReport;
use rouge_core::draw::Canvas;
use rouge_core::landmarks::{
    FACE_MESH_POINTS, LEFT_EYE_OUTLINE, LIPS_INNER, LIPS_OUTER, RIGHT_EYE_OUTLINE,
};
use rouge_core::style::{EyelinerStyle, LipFinish, ShadowFinish};
use rouge_core::{
    Feature, FeaturePainter, GeometryError, Landmark, LandmarkSet, LayerOutcome, RgbaImage,
    StyleState, Surface, composite, composite_with,
};

const W: u32 = 96;
const H: u32 = 112;

/// Every mesh index spread over the middle of the frame on a sunflower
/// spiral, so each region has distinct, non-collinear points.
fn synthetic_face() -> LandmarkSet {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    let n = f64::from(u32::try_from(FACE_MESH_POINTS).unwrap());
    let points = (0..FACE_MESH_POINTS)
        .map(|i| {
            let i = f64::from(u32::try_from(i).unwrap());
            let r = 0.35 * ((i + 0.5) / n).sqrt();
            let theta = i * golden;
            Landmark::new(0.5 + r * theta.cos(), 0.5 + r * theta.sin(), 0.0)
        })
        .collect();
    LandmarkSet::new(points)
}

fn portrait() -> RgbaImage {
    RgbaImage::from_fn(W, H, |x, y| {
        let r = u8::try_from(120 + (x * 100 / W)).unwrap();
        let g = u8::try_from(90 + (y * 80 / H)).unwrap();
        image::Rgba([r, g, 80, 255])
    })
}

fn everything_on() -> StyleState {
    let mut style = StyleState::default();
    for feature in Feature::DRAW_ORDER {
        style.set_enabled(feature, true);
    }
    style.eyeshadow.finish = ShadowFinish::Shimmer;
    style.lips.finish = LipFinish::Gloss;
    style.lipliner.overlined = true;
    style.blush.placement = rouge_core::style::BlushPlacement::Draping;
    style
}

fn only(feature: Feature) -> StyleState {
    let mut style = StyleState::default();
    for f in Feature::DRAW_ORDER {
        style.set_enabled(f, f == feature);
    }
    style
}

/// Move `indices` onto the curve `at(t)`, `t` running over `0..1` in
/// table order. Coordinates are normalized.
fn place(points: &mut [Landmark], indices: &[usize], at: impl Fn(f64) -> (f64, f64)) {
    let n = f64::from(u32::try_from(indices.len()).unwrap());
    for (i, &index) in indices.iter().enumerate() {
        let (x, y) = at(f64::from(u32::try_from(i).unwrap()) / n);
        points[index] = Landmark::new(x, y, 0.0);
    }
}

/// Centre of the round mouth in [`mouth_face`], in pixels.
const MOUTH: (u32, u32) = (48, 67);

/// The outer lip loop is a circle around [`MOUTH`]; the inner loop is a
/// speck in the top-left corner, away from everything under test.
fn mouth_face() -> LandmarkSet {
    let mut points = synthetic_face().points().to_vec();
    let tau = std::f64::consts::TAU;
    place(&mut points, LIPS_OUTER, |t| {
        (0.5 + 0.15 * (t * tau).cos(), 0.6 + 0.15 * (t * tau).sin())
    });
    place(&mut points, LIPS_INNER, |t| {
        (0.05 + 0.005 * (t * tau).cos(), 0.05 + 0.005 * (t * tau).sin())
    });
    LandmarkSet::new(points)
}

/// Both eye outlines are straight left-to-right lines at row 33.
fn level_eyes_face() -> LandmarkSet {
    let mut points = synthetic_face().points().to_vec();
    place(&mut points, LEFT_EYE_OUTLINE, |t| (0.2 + 0.2 * t, 0.3));
    place(&mut points, RIGHT_EYE_OUTLINE, |t| (0.6 + 0.15 * t, 0.3));
    LandmarkSet::new(points)
}

fn render(face: &LandmarkSet, style: &StyleState) -> RgbaImage {
    let mut surface = Surface::new(W, H).unwrap();
    composite(&mut surface, &portrait(), Some(face), style).unwrap();
    surface.to_rgba_image()
}

fn channels(img: &RgbaImage, x: u32, y: u32) -> [u8; 4] {
    img.get_pixel(x, y).0
}

/// `brighter` is at least `base` in every color channel everywhere, and
/// strictly above it somewhere.
fn assert_brightened(brighter: &RgbaImage, base: &RgbaImage) {
    let mut lifted = false;
    for (a, b) in brighter.pixels().zip(base.pixels()) {
        for c in 0..3 {
            assert!(a.0[c] >= b.0[c], "{a:?} darker than {b:?}");
            lifted |= a.0[c] > b.0[c];
        }
    }
    assert!(lifted, "nothing was brightened");
}

#[test]
fn identical_inputs_render_identical_bytes() {
    let face = synthetic_face();
    let source = portrait();
    let style = everything_on();

    let mut first = Surface::new(W, H).unwrap();
    let mut second = Surface::new(W, H).unwrap();
    composite(&mut first, &source, Some(&face), &style).unwrap();
    // Dirty the second surface first; the pass must not depend on it.
    composite(&mut second, &RgbaImage::new(W, H), None, &style).ok();
    composite(&mut second, &source, Some(&face), &style).unwrap();

    assert_eq!(first.data(), second.data());
}

#[test]
fn every_enabled_feature_is_drawn_in_order() {
    let mut surface = Surface::new(W, H).unwrap();
    let report = composite(&mut surface, &portrait(), Some(&synthetic_face()), &everything_on()).unwrap();
    assert!(report.face_present);
    let order: Vec<Feature> = report.layers.iter().map(|l| l.feature).collect();
    assert_eq!(order, Feature::DRAW_ORDER);
    assert_eq!(report.drawn(), Feature::DRAW_ORDER);
}

#[test]
fn makeup_changes_the_frame() {
    let source = portrait();
    let mut surface = Surface::new(W, H).unwrap();
    composite(&mut surface, &source, Some(&synthetic_face()), &everything_on()).unwrap();
    assert_ne!(surface.to_rgba_image(), source);
}

#[test]
fn all_disabled_leaves_base_untouched() {
    let mut style = StyleState::default();
    for feature in Feature::DRAW_ORDER {
        style.set_enabled(feature, false);
    }
    let source = portrait();
    let mut surface = Surface::new(W, H).unwrap();
    let report = composite(&mut surface, &source, Some(&synthetic_face()), &style).unwrap();
    assert!(report.layers.iter().all(|l| l.outcome == LayerOutcome::Disabled));
    assert_eq!(surface.to_rgba_image(), source);
}

#[test]
fn missing_face_draws_base_only() {
    struct Counter(usize);
    impl FeaturePainter for Counter {
        fn paint(&mut self, _: &mut Canvas<'_>, _: &StyleState, _: Feature) -> Result<(), GeometryError> {
            self.0 += 1;
            Ok(())
        }
    }

    let source = portrait();
    let mut surface = Surface::new(W, H).unwrap();
    let mut counter = Counter(0);
    let report = composite_with(&mut counter, &mut surface, &source, None, &everything_on()).unwrap();
    assert_eq!(counter.0, 0);
    assert!(!report.face_present);
    assert_eq!(surface.to_rgba_image(), source);
}

#[test]
fn non_finite_landmark_skips_only_affected_layers() {
    let mut points = synthetic_face().points().to_vec();
    // 13 is on the inner lip loop only.
    points[13] = Landmark::new(f64::NAN, 0.5, 0.0);
    let face = LandmarkSet::new(points);

    let mut surface = Surface::new(W, H).unwrap();
    let report = composite(&mut surface, &portrait(), Some(&face), &everything_on()).unwrap();
    let skipped: Vec<&LayerReport> = report.layers.iter().filter(|l| l.outcome.is_skipped()).collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].feature, Feature::Lips);
    assert_eq!(
        skipped[0].outcome,
        LayerOutcome::Skipped(GeometryError::NonFinite { index: 13 })
    );
    assert!(report.outcome(Feature::Highlighter).unwrap().is_drawn());
}

#[test]
fn report_serializes_to_json() {
    let mut surface = Surface::new(W, H).unwrap();
    let report = composite(&mut surface, &portrait(), Some(&synthetic_face()), &StyleState::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["face_present"], true);
    assert_eq!(json["layers"][0]["feature"], "foundation");
    assert_eq!(json["layers"][0]["status"], "drawn");
    assert_eq!(json["layers"][1]["status"], "disabled");
    assert!(json["elapsed"].as_f64().unwrap() >= 0.0);
}

#[test]
fn default_style_over_gradient_photo() {
    let source = portrait();
    let mut surface = Surface::new(W, H).unwrap();
    let report = composite(&mut surface, &source, Some(&synthetic_face()), &StyleState::default()).unwrap();
    assert!(report.outcome(Feature::Foundation).unwrap().is_drawn());
    let out = surface.to_rgba_image();
    // Foundation tints the whole frame, corners included.
    assert_ne!(channels(&out, 0, 0), channels(&source, 0, 0));
    assert_ne!(channels(&out, W - 1, H - 1), channels(&source, W - 1, H - 1));
}

#[test]
fn lips_cover_foundation() {
    let face = mouth_face();
    let mut style = only(Feature::Lips);
    style.set_enabled(Feature::Foundation, true);
    style.lips.opacity = 1.0;
    let out = render(&face, &style);

    let (x, y) = MOUTH;
    assert_eq!(channels(&out, x, y), [0xFF, 0x40, 0x81, 0xFF]);
    // Foundation still shows outside the mouth.
    assert_ne!(channels(&out, 5, H - 5), channels(&portrait(), 5, H - 5));
}

#[test]
fn gloss_adds_a_highlight_above_the_lower_lip() {
    let face = mouth_face();
    let mut style = only(Feature::Lips);
    let matte = render(&face, &style);
    style.lips.finish = LipFinish::Gloss;
    let gloss = render(&face, &style);

    assert_brightened(&gloss, &matte);
    // Halfway from the mouth centre to the lowest lip point, lifted 5px.
    let (x, y) = MOUTH;
    let shine = channels(&gloss, x, y + 4);
    let flat = channels(&matte, x, y + 4);
    assert!(shine[1] > flat[1] && shine[2] > flat[2], "{shine:?} vs {flat:?}");
    // The upper lip is outside the highlight.
    assert_eq!(channels(&gloss, x, y - 10), channels(&matte, x, y - 10));
}

#[test]
fn satin_brightens_only_the_lips() {
    let face = mouth_face();
    let mut style = only(Feature::Lips);
    let matte = render(&face, &style);
    style.lips.finish = LipFinish::Satin;
    let satin = render(&face, &style);

    assert_brightened(&satin, &matte);
    let (x, y) = MOUTH;
    assert!(channels(&satin, x, y)[1] > channels(&matte, x, y)[1]);
    assert_eq!(channels(&satin, 2, 2), channels(&matte, 2, 2));
    assert_eq!(channels(&satin, W - 2, H - 2), channels(&matte, W - 2, H - 2));
}

#[test]
fn shimmer_is_brighter_than_matte_shadow() {
    let face = synthetic_face();
    let mut style = only(Feature::Eyeshadow);
    let matte = render(&face, &style);
    style.eyeshadow.finish = ShadowFinish::Shimmer;
    let shimmer = render(&face, &style);

    assert_ne!(matte, portrait());
    assert_brightened(&shimmer, &matte);
}

#[test]
fn winged_liner_extends_past_the_eye() {
    let face = level_eyes_face();
    let mut style = only(Feature::Eyeliner);
    style.eyeliner.style = EyelinerStyle::Natural;
    let natural = render(&face, &style);
    style.eyeliner.style = EyelinerStyle::Winged;
    let winged = render(&face, &style);
    let source = portrait();

    // The left eye ends at x = 38; the wing runs 20px further.
    assert_ne!(channels(&natural, 30, 33), channels(&source, 30, 33));
    assert_eq!(channels(&natural, 50, 33), channels(&source, 50, 33));
    assert_ne!(channels(&winged, 50, 33), channels(&source, 50, 33));

    let changed = |img: &RgbaImage| img.pixels().zip(source.pixels()).filter(|(a, b)| a != b).count();
    assert!(changed(&winged) > changed(&natural));

    style.eyeliner.style = EyelinerStyle::CatEye;
    assert_eq!(render(&face, &style), winged);
}

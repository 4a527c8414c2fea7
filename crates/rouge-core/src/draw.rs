//! Per-feature draw routines.
//!
//! Every routine resolves all of its geometry first and only then
//! touches the pixmap, so a [`GeometryError`] never leaves a
//! half-painted feature behind.

use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, GradientStop, LineCap, LineJoin, Mask, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, RadialGradient, Rect, Shader, SpreadMode, Stroke, Transform,
};

use crate::color::{Rgb, WHITE};
use crate::filter::{blur_pixmap, brighten_pixmap};
use crate::geometry::{centroid, extrapolate_tail, resolve_point, resolve_points};
use crate::landmarks::{LEFT_CHEEKBONE, LandmarkSet, RIGHT_CHEEKBONE, Region, Side};
use crate::style::{
    BlushPlacement, BronzerArea, ConcealerArea, EyelinerStyle, Feature, HighlightArea, LipFinish,
    ShadowFinish, ShadowPosition, StyleState,
};
use crate::types::{Dimensions, GeometryError, Point};

/// Blur sigma for the concealer's blemish pass.
const BLEMISH_BLUR_SIGMA: f32 = 2.0;

/// Brightness multiplier for a satin lip finish.
const SATIN_BRIGHTNESS: f32 = 1.15;

/// Brightness multipliers for eyeshadow finishes.
const SHIMMER_BRIGHTNESS: f32 = 1.2;
const METALLIC_BRIGHTNESS: f32 = 1.3;

/// Cheekbone contour strokes run this far either side of the cheekbone.
const CONTOUR_HALF_LENGTH: f64 = 20.0;

/// Overlined lip liner sits this far outside the lip line.
const OVERLINE_OFFSET: f64 = 3.0;

/// Gloss highlight geometry.
const GLOSS_RADIUS_X: f32 = 10.0;
const GLOSS_RADIUS_Y: f32 = 5.0;
const GLOSS_LIFT: f64 = 5.0;
const GLOSS_ALPHA: f32 = 0.3;

/// Borrowed inputs for one feature's draw call.
pub struct Canvas<'a> {
    pub pixmap: &'a mut Pixmap,
    pub landmarks: &'a LandmarkSet,
    pub dimensions: Dimensions,
}

impl Canvas<'_> {
    fn region(&self, region: Region) -> Result<Vec<Point>, GeometryError> {
        resolve_points(region, Some(self.landmarks), self.dimensions)
    }

    fn point(&self, index: usize) -> Result<Point, GeometryError> {
        resolve_point(index, Some(self.landmarks), self.dimensions)
    }

    fn region_centroid(&self, region: Region) -> Result<Point, GeometryError> {
        centroid(&self.region(region)?).ok_or(GeometryError::Degenerate("empty region"))
    }

    fn scratch(&self) -> Option<Pixmap> {
        Pixmap::new(self.pixmap.width(), self.pixmap.height())
    }

    fn mask(&self) -> Option<Mask> {
        Mask::new(self.pixmap.width(), self.pixmap.height())
    }

    /// Composite `layer` over the canvas.
    fn draw_layer(&mut self, layer: &Pixmap, opacity: f32, blend_mode: BlendMode, mask: Option<&Mask>) {
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0),
            blend_mode,
            quality: FilterQuality::Nearest,
        };
        self.pixmap
            .draw_pixmap(0, 0, layer.as_ref(), &paint, Transform::identity(), mask);
    }

    /// Brighten whatever is already on the canvas inside `mask`.
    fn brighten_region(&mut self, mask: &Mask, factor: f32) {
        let mut lifted = self.pixmap.clone();
        brighten_pixmap(&mut lifted, factor);
        self.draw_layer(&lifted, 1.0, BlendMode::Source, Some(mask));
    }
}

/// Paint one feature.
///
/// # Errors
///
/// Returns the first [`GeometryError`] hit while resolving the
/// feature's regions. Nothing has been drawn in that case.
pub fn draw_feature(canvas: &mut Canvas<'_>, style: &StyleState, feature: Feature) -> Result<(), GeometryError> {
    match feature {
        Feature::Foundation => foundation(canvas, style),
        Feature::Concealer => concealer(canvas, style),
        Feature::Blush => blush(canvas, style),
        Feature::Bronzer => bronzer(canvas, style),
        Feature::Eyeshadow => eyeshadow(canvas, style),
        Feature::Eyeliner => eyeliner(canvas, style),
        Feature::Brows => brows(canvas, style),
        Feature::Lipliner => lipliner(canvas, style),
        Feature::Lips => lips(canvas, style),
        Feature::Highlighter => highlighter(canvas, style),
        Feature::SettingSpray => {
            setting_spray(canvas, style);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Routines
// ---------------------------------------------------------------------------

#[allow(clippy::unnecessary_wraps)]
fn foundation(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let f = &style.foundation;
    let w = canvas.dimensions.width;
    let h = canvas.dimensions.height;
    let center = Point::new(f64::from(w) / 2.0, f64::from(h) / 2.0);
    let radius = f64::from(w.max(h)) / 2.0;
    let alpha = as_f32(f.opacity);

    let stops = vec![
        GradientStop::new(0.0, f.color.with_alpha(alpha)),
        GradientStop::new(1.0, f.color.adjust_brightness(0.2).with_alpha(alpha)),
    ];
    let (Some(shader), Some(rect)) = (
        radial_shader(center, radius, stops),
        Rect::from_xywh(0.0, 0.0, as_f32(f64::from(w)), as_f32(f64::from(h))),
    ) else {
        return Ok(());
    };
    // The 16-bit overlay stage overflows on real photos.
    let paint = Paint {
        shader,
        blend_mode: BlendMode::Overlay,
        force_hq_pipeline: true,
        ..Paint::default()
    };
    canvas.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    Ok(())
}

fn concealer(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let c = &style.concealer;
    let under_eyes = if c.areas.contains(&ConcealerArea::UnderEyes) {
        Side::BOTH
            .iter()
            .map(|&side| canvas.region(Region::UnderEye(side)))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };
    let cheeks = if c.areas.contains(&ConcealerArea::Blemishes) {
        Side::BOTH
            .iter()
            .map(|&side| canvas.region(Region::Cheek(side)))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    let radius = 30.0 * c.intensity;
    let center_alpha = as_f32(0.8 * c.intensity * c.opacity);
    for points in &under_eyes {
        let (Some(path), Some(center)) = (polygon(points), centroid(points)) else {
            continue;
        };
        let Some(shader) = radial_shader(center, radius, fade_stops(c.color, center_alpha)) else {
            continue;
        };
        fill(canvas.pixmap, &path, shader, BlendMode::SourceOver, FillRule::Winding);
    }

    if !cheeks.is_empty()
        && let Some(mut mask) = canvas.mask()
    {
        for points in &cheeks {
            if let Some(path) = polygon(points) {
                mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
            }
        }
        let softened = blur_pixmap(canvas.pixmap, BLEMISH_BLUR_SIGMA);
        canvas.draw_layer(
            &softened,
            as_f32(c.opacity * c.intensity),
            BlendMode::Lighten,
            Some(&mask),
        );
    }
    Ok(())
}

fn blush(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let b = &style.blush;
    let left = canvas.region_centroid(Region::Cheek(Side::Left))?;
    let right = canvas.region_centroid(Region::Cheek(Side::Right))?;
    let mid_x = (left.x + right.x) / 2.0;
    let r = b.radius;
    let alpha = as_f32(b.opacity);

    for cheek in [left, right] {
        // +1 points away from the nose on this side.
        let outward = if cheek.x < mid_x { -1.0 } else { 1.0 };
        match b.placement {
            BlushPlacement::Apples => {
                soft_disc(canvas.pixmap, cheek, r, (1.0, 1.0), b.color, alpha);
            }
            BlushPlacement::Cheekbones => {
                let center = Point::new((outward * r).mul_add(0.4, cheek.x), r.mul_add(-0.2, cheek.y));
                soft_disc(canvas.pixmap, center, r, (1.6, 0.7), b.color, alpha);
            }
            BlushPlacement::Draping => {
                soft_disc(canvas.pixmap, cheek, r, (1.0, 1.0), b.color, alpha);
                let temple = Point::new((outward * r).mul_add(0.8, cheek.x), r.mul_add(-1.2, cheek.y));
                soft_disc(canvas.pixmap, temple, r * 0.8, (0.8, 1.2), b.color, alpha * 0.6);
            }
        }
    }
    Ok(())
}

fn bronzer(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let b = &style.bronzer;
    let forehead = if b.areas.contains(&BronzerArea::Forehead) {
        Some(canvas.region(Region::Forehead)?)
    } else {
        None
    };
    let cheekbones = if b.areas.contains(&BronzerArea::Cheekbones) {
        Some([canvas.point(LEFT_CHEEKBONE)?, canvas.point(RIGHT_CHEEKBONE)?])
    } else {
        None
    };
    let jawline = if b.areas.contains(&BronzerArea::Jawline) {
        Some(canvas.region(Region::Jawline)?)
    } else {
        None
    };

    let color = b.color.with_alpha(as_f32(b.opacity));
    let paint = solid(color, BlendMode::Multiply);

    if let Some(path) = forehead.as_deref().and_then(polygon) {
        canvas
            .pixmap
            .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
    }
    if let Some(points) = cheekbones {
        let mut pb = PathBuilder::new();
        for p in points {
            pb.move_to(as_f32(p.x - CONTOUR_HALF_LENGTH), as_f32(p.y));
            pb.line_to(as_f32(p.x + CONTOUR_HALF_LENGTH), as_f32(p.y));
        }
        if let Some(path) = pb.finish() {
            stroke(canvas.pixmap, &path, &paint, 5.0 * b.contour);
        }
    }
    if let Some(path) = jawline.as_deref().and_then(polyline) {
        stroke(canvas.pixmap, &path, &paint, 3.0 * b.contour);
    }
    Ok(())
}

fn eyeshadow(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let e = &style.eyeshadow;
    let mut shapes = Vec::with_capacity(e.layers.len() * 2);
    for layer in &e.layers {
        for side in Side::BOTH {
            let region = match layer.position {
                ShadowPosition::Crease => Region::EyeCrease(side),
                ShadowPosition::Lid => Region::EyeLid(side),
                ShadowPosition::Browbone => Region::Browbone(side),
            };
            shapes.push((layer, canvas.region(region)?));
        }
    }

    let Some(mut scratch) = canvas.scratch() else {
        return Ok(());
    };
    for (layer, points) in &shapes {
        if let Some(path) = polygon(points) {
            let paint = solid(
                layer.color.with_alpha(as_f32(layer.opacity * e.opacity)),
                BlendMode::SourceOver,
            );
            scratch.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
    match e.finish {
        ShadowFinish::Matte => {}
        ShadowFinish::Shimmer => brighten_pixmap(&mut scratch, SHIMMER_BRIGHTNESS),
        ShadowFinish::Metallic => brighten_pixmap(&mut scratch, METALLIC_BRIGHTNESS),
    }
    let scratch = blur_pixmap(&scratch, as_f32(e.blend * 3.0));
    canvas.draw_layer(&scratch, 1.0, BlendMode::SourceOver, None);
    Ok(())
}

fn eyeliner(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let l = &style.eyeliner;
    let outlines = [
        canvas.region(Region::EyeOutline(Side::Left))?,
        canvas.region(Region::EyeOutline(Side::Right))?,
    ];
    let wing_length = match l.style {
        EyelinerStyle::Natural => None,
        EyelinerStyle::Winged | EyelinerStyle::CatEye => Some(l.wing_length),
    };

    let paint = solid(l.color.with_alpha(as_f32(l.opacity)), BlendMode::SourceOver);
    for points in &outlines {
        let mut pb = PathBuilder::new();
        push_polyline(&mut pb, points);
        if let Some(wing) = wing_length.and_then(|len| extrapolate_tail(points, len)) {
            pb.line_to(as_f32(wing.x), as_f32(wing.y));
        }
        if let Some(path) = pb.finish() {
            stroke(canvas.pixmap, &path, &paint, l.thickness);
        }
    }
    Ok(())
}

fn brows(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let b = &style.brows;
    let arcs = [
        canvas.region(Region::Eyebrow(Side::Left))?,
        canvas.region(Region::Eyebrow(Side::Right))?,
    ];
    let lift = 0.01 * f64::from(canvas.dimensions.height);

    let mut pb = PathBuilder::new();
    for points in &arcs {
        for pair in points.windows(2) {
            let [start, end] = pair else { continue };
            let control = start.lerp(*end, 0.5);
            pb.move_to(as_f32(start.x), as_f32(start.y));
            pb.quad_to(
                as_f32(control.x),
                as_f32(control.y - lift),
                as_f32(end.x),
                as_f32(end.y),
            );
        }
    }
    if let Some(path) = pb.finish() {
        let paint = solid(b.color.with_alpha(as_f32(b.opacity)), BlendMode::SourceOver);
        stroke(canvas.pixmap, &path, &paint, b.thickness);
    }
    Ok(())
}

fn lipliner(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let l = &style.lipliner;
    let mut points = canvas.region(Region::LipsOuter)?;
    if l.overlined
        && let Some(center) = centroid(&points)
    {
        for p in &mut points {
            *p = p.push_away_from(center, OVERLINE_OFFSET);
        }
    }
    if let Some(path) = polygon(&points) {
        let paint = solid(l.color.with_alpha(as_f32(l.opacity)), BlendMode::SourceOver);
        stroke(canvas.pixmap, &path, &paint, l.thickness);
    }
    Ok(())
}

fn lips(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let l = &style.lips;
    let outer = canvas.region(Region::LipsOuter)?;
    let inner = canvas.region(Region::LipsInner)?;

    let mut pb = PathBuilder::new();
    push_polygon(&mut pb, &outer);
    push_polygon(&mut pb, &inner);
    let Some(path) = pb.finish() else {
        return Ok(());
    };
    let paint = solid(l.color.with_alpha(as_f32(l.opacity)), BlendMode::SourceOver);
    canvas
        .pixmap
        .fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);

    match l.finish {
        LipFinish::Matte => {}
        LipFinish::Gloss => {
            let lowest = outer.iter().copied().reduce(|a, b| if b.y > a.y { b } else { a });
            if let (Some(center), Some(lowest)) = (centroid(&outer), lowest) {
                let spot = center.lerp(lowest, 0.5);
                let oval = Rect::from_xywh(
                    as_f32(spot.x) - GLOSS_RADIUS_X,
                    as_f32(spot.y - GLOSS_LIFT) - GLOSS_RADIUS_Y,
                    GLOSS_RADIUS_X * 2.0,
                    GLOSS_RADIUS_Y * 2.0,
                );
                if let Some(shine) = oval.and_then(PathBuilder::from_oval) {
                    let paint = solid(WHITE.with_alpha(GLOSS_ALPHA), BlendMode::SourceOver);
                    canvas
                        .pixmap
                        .fill_path(&shine, &paint, FillRule::Winding, Transform::identity(), None);
                }
            }
        }
        LipFinish::Satin => {
            if let Some(mut mask) = canvas.mask() {
                mask.fill_path(&path, FillRule::EvenOdd, true, Transform::identity());
                canvas.brighten_region(&mask, SATIN_BRIGHTNESS);
            }
        }
    }
    Ok(())
}

fn highlighter(canvas: &mut Canvas<'_>, style: &StyleState) -> Result<(), GeometryError> {
    let h = &style.highlighter;
    let mut spots = Vec::with_capacity(4);
    for area in &h.areas {
        match area {
            HighlightArea::Cheekbones => {
                for side in Side::BOTH {
                    spots.push(canvas.region_centroid(Region::CheekboneRidge(side))?);
                }
            }
            HighlightArea::Nose => spots.push(canvas.region_centroid(Region::NoseBridge)?),
            HighlightArea::CupidsBow => spots.push(canvas.region_centroid(Region::CupidsBow)?),
        }
    }

    let Some(mut scratch) = canvas.scratch() else {
        return Ok(());
    };
    let alpha = as_f32(h.intensity * h.opacity);
    for spot in spots {
        soft_disc(&mut scratch, spot, h.radius, (1.0, 1.0), h.color, alpha);
    }
    if h.shimmer > 0.0 {
        brighten_pixmap(&mut scratch, as_f32(1.0 + h.shimmer));
    }
    canvas.draw_layer(&scratch, 1.0, BlendMode::SourceOver, None);
    Ok(())
}

fn setting_spray(canvas: &mut Canvas<'_>, style: &StyleState) {
    let s = &style.setting_spray;
    let mut mist = blur_pixmap(canvas.pixmap, as_f32(s.dewy_finish));
    brighten_pixmap(&mut mist, as_f32(s.dewy_finish.mul_add(0.1, 1.0)));
    canvas.draw_layer(&mist, as_f32(s.intensity * 0.1), BlendMode::SourceOver, None);
}

// ---------------------------------------------------------------------------
// Path and paint helpers
// ---------------------------------------------------------------------------

#[allow(clippy::cast_possible_truncation)]
const fn as_f32(v: f64) -> f32 {
    v as f32
}

fn push_polyline(pb: &mut PathBuilder, points: &[Point]) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    pb.move_to(as_f32(first.x), as_f32(first.y));
    for p in rest {
        pb.line_to(as_f32(p.x), as_f32(p.y));
    }
}

fn push_polygon(pb: &mut PathBuilder, points: &[Point]) {
    if points.len() < 3 {
        return;
    }
    push_polyline(pb, points);
    pb.close();
}

fn polyline(points: &[Point]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    push_polyline(&mut pb, points);
    pb.finish()
}

fn polygon(points: &[Point]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    push_polygon(&mut pb, points);
    pb.finish()
}

fn solid(color: Color, blend_mode: BlendMode) -> Paint<'static> {
    let mut paint = Paint {
        blend_mode,
        ..Paint::default()
    };
    paint.set_color(color);
    paint
}

fn fill(pixmap: &mut Pixmap, path: &Path, shader: Shader<'static>, blend_mode: BlendMode, rule: FillRule) {
    let paint = Paint {
        shader,
        blend_mode,
        ..Paint::default()
    };
    pixmap.fill_path(path, &paint, rule, Transform::identity(), None);
}

/// Round-capped, round-joined stroke. Non-positive widths draw nothing.
fn stroke(pixmap: &mut Pixmap, path: &Path, paint: &Paint<'_>, width: f64) {
    if width <= 0.0 || !width.is_finite() {
        return;
    }
    let stroke = Stroke {
        width: as_f32(width),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(path, paint, &stroke, Transform::identity(), None);
}

/// `color` at `alpha` in the center, fully transparent at the rim.
fn fade_stops(color: Rgb, alpha: f32) -> Vec<GradientStop> {
    vec![
        GradientStop::new(0.0, color.with_alpha(alpha)),
        GradientStop::new(1.0, color.with_alpha(0.0)),
    ]
}

fn radial_shader(center: Point, radius: f64, stops: Vec<GradientStop>) -> Option<Shader<'static>> {
    if radius <= 0.0 || !radius.is_finite() {
        return None;
    }
    let c = tiny_skia::Point::from_xy(as_f32(center.x), as_f32(center.y));
    RadialGradient::new(c, 0.0, c, as_f32(radius), stops, SpreadMode::Pad, Transform::identity())
}

/// A disc of `color` fading to transparent at `radius`, stretched by
/// `scale` around `center`.
fn soft_disc(pixmap: &mut Pixmap, center: Point, radius: f64, scale: (f32, f32), color: Rgb, alpha: f32) {
    let transform = Transform::from_row(
        scale.0,
        0.0,
        0.0,
        scale.1,
        as_f32(center.x),
        as_f32(center.y),
    );
    let (Some(shader), Some(disc)) = (
        radial_shader(Point::new(0.0, 0.0), radius, fade_stops(color, alpha)),
        PathBuilder::from_circle(0.0, 0.0, as_f32(radius)),
    ) else {
        return;
    };
    let paint = Paint {
        shader,
        ..Paint::default()
    };
    pixmap.fill_path(&disc, &paint, FillRule::Winding, transform, None);
}

//! Resolve normalized landmarks into surface pixel coordinates.
//!
//! Every draw routine goes through [`resolve_points`] so that a missing
//! face or a truncated landmark set is reported as a [`GeometryError`]
//! instead of producing fabricated coordinates.

use crate::landmarks::{LandmarkSet, Region};
use crate::types::{Dimensions, GeometryError, Point};

/// Resolve one landmark index to pixel coordinates.
///
/// # Errors
///
/// Returns [`GeometryError::MissingLandmarks`] if `landmarks` is `None`,
/// [`GeometryError::IndexOutOfRange`] if the set has no such index, and
/// [`GeometryError::NonFinite`] if the landmark is NaN or infinite.
pub fn resolve_point(
    index: usize,
    landmarks: Option<&LandmarkSet>,
    dimensions: Dimensions,
) -> Result<Point, GeometryError> {
    let set = landmarks.ok_or(GeometryError::MissingLandmarks)?;
    let lm = set.get(index).ok_or(GeometryError::IndexOutOfRange {
        index,
        len: set.len(),
    })?;
    if !lm.is_finite() {
        return Err(GeometryError::NonFinite { index });
    }
    Ok(Point::new(
        lm.x * f64::from(dimensions.width),
        lm.y * f64::from(dimensions.height),
    ))
}

/// Resolve an arbitrary ordered index list, preserving its order.
///
/// # Errors
///
/// Fails on the first index that [`resolve_point`] rejects.
pub fn resolve_indices(
    indices: &[usize],
    landmarks: Option<&LandmarkSet>,
    dimensions: Dimensions,
) -> Result<Vec<Point>, GeometryError> {
    // Report a missing face even for an empty table.
    let set = landmarks.ok_or(GeometryError::MissingLandmarks)?;
    indices
        .iter()
        .map(|&i| resolve_point(i, Some(set), dimensions))
        .collect()
}

/// Resolve a named region to pixel coordinates, in table order.
///
/// Each point is `(landmark.x * width, landmark.y * height)`.
///
/// # Errors
///
/// See [`resolve_point`].
pub fn resolve_points(
    region: Region,
    landmarks: Option<&LandmarkSet>,
    dimensions: Dimensions,
) -> Result<Vec<Point>, GeometryError> {
    resolve_indices(region.indices(), landmarks, dimensions)
}

/// Arithmetic mean of a point set. `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let n = points.len() as f64;
    Some(Point::new(sx / n, sy / n))
}

/// Extend a polyline past its last point along the direction of its
/// final segment.
///
/// Returns `None` if there are fewer than two points or the final
/// segment has zero length.
#[must_use]
pub fn extrapolate_tail(points: &[Point], length: f64) -> Option<Point> {
    let [.., before, last] = points else {
        return None;
    };
    let dx = last.x - before.x;
    let dy = last.y - before.y;
    let seg = dx.hypot(dy);
    if seg <= f64::EPSILON {
        return None;
    }
    Some(Point::new(
        (dx / seg).mul_add(length, last.x),
        (dy / seg).mul_add(length, last.y),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use crate::landmarks::{LEFT_EYE_LID, Landmark, Side};

    /// A full-size mesh where landmark `i` sits at `(i / 1000, i / 2000)`.
    fn indexed_mesh() -> LandmarkSet {
        LandmarkSet::new(
            (0..468)
                .map(|i| Landmark::new(i as f64 / 1000.0, i as f64 / 2000.0, 0.0))
                .collect(),
        )
    }

    const DIMS: Dimensions = Dimensions {
        width: 640,
        height: 480,
    };

    #[test]
    fn left_eye_lid_scales_in_table_order() {
        let mesh = indexed_mesh();
        let points = resolve_points(Region::EyeLid(Side::Left), Some(&mesh), DIMS).unwrap();
        assert_eq!(points.len(), LEFT_EYE_LID.len());
        for (p, &i) in points.iter().zip(LEFT_EYE_LID) {
            let lm = mesh.get(i).unwrap();
            assert_eq!(*p, Point::new(lm.x * 640.0, lm.y * 480.0));
        }
        // First entry is landmark 159.
        assert!((points[0].x - 0.159 * 640.0).abs() < 1e-9);
        assert!((points[0].y - 0.0795 * 480.0).abs() < 1e-9);
    }

    #[test]
    fn missing_landmarks_reported() {
        let err = resolve_points(Region::LipsOuter, None, DIMS).unwrap_err();
        assert_eq!(err, GeometryError::MissingLandmarks);
    }

    #[test]
    fn truncated_set_reports_first_bad_index() {
        let short = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0); 100]);
        let err = resolve_points(Region::LipsOuter, Some(&short), DIMS).unwrap_err();
        // LIPS_OUTER starts with 61, then 146.
        assert_eq!(err, GeometryError::IndexOutOfRange { index: 146, len: 100 });
    }

    #[test]
    fn non_finite_coordinate_rejected() {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); 468];
        points[10] = Landmark::new(f64::NAN, 0.5, 0.0);
        let set = LandmarkSet::new(points);
        assert_eq!(
            resolve_point(10, Some(&set), DIMS).unwrap_err(),
            GeometryError::NonFinite { index: 10 }
        );
    }

    #[test]
    fn centroid_of_square() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert_eq!(centroid(&pts), Some(Point::new(5.0, 5.0)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn extrapolate_tail_follows_last_segment() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)];
        let wing = extrapolate_tail(&pts, 5.0).unwrap();
        assert!((wing.x - 25.0).abs() < 1e-9);
        assert!(wing.y.abs() < 1e-9);
    }

    #[test]
    fn extrapolate_tail_needs_two_distinct_points() {
        assert!(extrapolate_tail(&[Point::new(1.0, 1.0)], 5.0).is_none());
        assert!(extrapolate_tail(&[Point::new(1.0, 1.0), Point::new(1.0, 1.0)], 5.0).is_none());
    }
}

//! Raster filters used by the draw routines.
//!
//! Both filters work directly on premultiplied [`Pixmap`] data, which is
//! what `tiny-skia` renders into. A Gaussian blur is linear, so blurring
//! premultiplied channels gives the same result as blurring straight
//! color weighted by coverage, without dark fringes around transparent
//! edges.

use image::{GrayImage, Luma};
use tiny_skia::Pixmap;

/// A blurred copy of `pixmap`.
///
/// Each premultiplied channel is pulled out as its own plane, run
/// through `imageproc`'s Gaussian, and written back in place. Rounding
/// can leave a color channel one step above its alpha, so colors are
/// clamped back afterwards. Non-positive sigma is a plain copy since
/// `imageproc` panics on it.
#[must_use = "returns the blurred pixmap"]
pub fn blur_pixmap(pixmap: &Pixmap, sigma: f32) -> Pixmap {
    let mut out = pixmap.clone();
    if sigma <= 0.0 || !sigma.is_finite() {
        return out;
    }
    for channel in 0..4 {
        let Some(plane) = channel_plane(pixmap, channel) else {
            return out;
        };
        let soft = imageproc::filter::gaussian_blur_f32(&plane, sigma);
        for (px, Luma([v])) in out.data_mut().chunks_exact_mut(4).zip(soft.pixels()) {
            px[channel] = *v;
        }
    }
    clamp_to_alpha(out.data_mut());
    out
}

/// One byte lane of the pixmap as a grayscale image.
fn channel_plane(pixmap: &Pixmap, channel: usize) -> Option<GrayImage> {
    let lane = pixmap.data().iter().skip(channel).step_by(4).copied().collect();
    GrayImage::from_raw(pixmap.width(), pixmap.height(), lane)
}

/// Multiply color channels by `factor`, like CSS `brightness(factor)`.
///
/// Channels are clamped to the pixel's alpha to stay premultiplied.
pub fn brighten_pixmap(pixmap: &mut Pixmap, factor: f32) {
    if (factor - 1.0).abs() <= f32::EPSILON || !factor.is_finite() {
        return;
    }
    let factor = factor.max(0.0);
    for px in pixmap.data_mut().chunks_exact_mut(4) {
        let alpha = px[3];
        for c in &mut px[..3] {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let scaled = (f32::from(*c) * factor).round().min(255.0) as u8;
            *c = scaled.min(alpha);
        }
    }
}

fn clamp_to_alpha(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let alpha = px[3];
        for c in &mut px[..3] {
            *c = (*c).min(alpha);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Pixmap {
        let mut p = Pixmap::new(w, h).unwrap();
        for px in p.data_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        p
    }

    #[test]
    fn zero_sigma_is_a_copy() {
        let p = solid(4, 4, [100, 150, 200, 255]);
        assert_eq!(blur_pixmap(&p, 0.0).data(), p.data());
        assert_eq!(blur_pixmap(&p, -1.0).data(), p.data());
    }

    #[test]
    fn channel_plane_reads_one_lane() {
        let p = solid(3, 2, [10, 20, 30, 40]);
        let plane = channel_plane(&p, 2).unwrap();
        assert_eq!(plane.dimensions(), (3, 2));
        assert!(plane.pixels().all(|Luma([v])| *v == 30));
    }

    #[test]
    fn blur_softens_a_hard_edge() {
        let mut p = Pixmap::new(10, 10).unwrap();
        for (i, px) in p.data_mut().chunks_exact_mut(4).enumerate() {
            let rgba = if i % 10 < 5 { [255, 0, 0, 255] } else { [0, 0, 255, 255] };
            px.copy_from_slice(&rgba);
        }
        let out = blur_pixmap(&p, 2.0);
        let at = |x: usize| &out.data()[(5 * 10 + x) * 4..(5 * 10 + x) * 4 + 4];
        assert!(at(4)[0] < 255);
        assert!(at(5)[0] > 0);
    }

    #[test]
    fn blur_pixmap_keeps_uniform_color() {
        let p = solid(8, 8, [40, 80, 120, 200]);
        let out = blur_pixmap(&p, 1.5);
        for px in out.data().chunks_exact(4) {
            for (got, want) in px.iter().zip([40u8, 80, 120, 200]) {
                assert!(got.abs_diff(want) <= 1, "{px:?}");
            }
        }
    }

    #[test]
    fn blur_pixmap_stays_premultiplied() {
        let mut p = Pixmap::new(12, 12).unwrap();
        // Opaque white block in one corner, transparent elsewhere.
        for (i, px) in p.data_mut().chunks_exact_mut(4).enumerate() {
            if i % 12 < 4 && i / 12 < 4 {
                px.copy_from_slice(&[255, 255, 255, 255]);
            }
        }
        let out = blur_pixmap(&p, 2.0);
        for px in out.data().chunks_exact(4) {
            assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3], "{px:?}");
        }
        assert_ne!(out.data(), p.data());
    }

    #[test]
    fn brighten_scales_and_clamps_to_alpha() {
        let mut p = solid(1, 1, [100, 150, 20, 160]);
        brighten_pixmap(&mut p, 1.2);
        assert_eq!(p.data(), &[120, 160, 24, 160]);
    }

    #[test]
    fn brighten_by_one_is_noop() {
        let mut p = solid(2, 2, [10, 20, 30, 40]);
        let before = p.clone();
        brighten_pixmap(&mut p, 1.0);
        assert_eq!(p.data(), before.data());
    }
}

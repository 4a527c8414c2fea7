//! The raster the compositor paints into.

use image::ImageEncoder;
use tiny_skia::{Color, ColorU8, Pixmap};

use crate::types::{ComposeError, Dimensions, RgbaImage, SurfaceError};

/// An owned RGBA canvas.
///
/// Pixels are stored premultiplied, as `tiny-skia` renders them. Export
/// helpers convert back to straight alpha.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidDimensions`] if either side is zero
    /// or the buffer would be too large to allocate.
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height)
            .ok_or(SurfaceError::InvalidDimensions(Dimensions { width, height }))?;
        Ok(Self { pixmap })
    }

    /// A surface holding a copy of `image`.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidDimensions`] for an empty image.
    pub fn from_rgba_image(image: &RgbaImage) -> Result<Self, SurfaceError> {
        let mut surface = Self::new(image.width(), image.height())?;
        surface.copy_premultiplied(image);
        Ok(surface)
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Replace the surface contents with `image` at full opacity.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::EmptySource`] for a zero-sized image and
    /// [`ComposeError::DimensionMismatch`] if its size differs from the
    /// surface.
    pub fn draw_base(&mut self, image: &RgbaImage) -> Result<(), ComposeError> {
        let image_dims = Dimensions {
            width: image.width(),
            height: image.height(),
        };
        if image_dims.is_empty() {
            return Err(ComposeError::EmptySource(image_dims));
        }
        if image_dims != self.dimensions() {
            return Err(ComposeError::DimensionMismatch {
                surface: self.dimensions(),
                image: image_dims,
            });
        }
        self.copy_premultiplied(image);
        Ok(())
    }

    fn copy_premultiplied(&mut self, image: &RgbaImage) {
        for (dst, src) in self.pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }

    /// Premultiplied RGBA bytes, row-major.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    #[must_use]
    pub const fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub const fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Straight-alpha RGBA bytes, row-major, as canvas `ImageData` expects.
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Convert to a straight-alpha [`RgbaImage`].
    #[must_use]
    pub fn to_rgba_image(&self) -> RgbaImage {
        let (w, h) = (self.width(), self.height());
        // Length always matches w * h * 4.
        RgbaImage::from_raw(w, h, self.to_rgba_bytes()).unwrap_or_else(|| RgbaImage::new(w, h))
    }

    /// Encode the surface as PNG.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Encode`] if the encoder fails.
    pub fn encode_png(&self) -> Result<Vec<u8>, SurfaceError> {
        encode_rgba_png(&self.to_rgba_image())
    }

    /// Encode a thumbnail whose longer side is at most `max_dimension`.
    ///
    /// Surfaces already within the limit are encoded at full size.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::InvalidDimensions`] if `max_dimension` is
    /// zero, or [`SurfaceError::Encode`] if the encoder fails.
    pub fn preview_png(&self, max_dimension: u32) -> Result<Vec<u8>, SurfaceError> {
        let Some((w, h)) = fit_within(self.dimensions(), max_dimension) else {
            return Err(SurfaceError::InvalidDimensions(Dimensions {
                width: max_dimension,
                height: max_dimension,
            }));
        };
        let full = self.to_rgba_image();
        if (w, h) == (full.width(), full.height()) {
            return encode_rgba_png(&full);
        }
        encode_rgba_png(&image::imageops::thumbnail(&full, w, h))
    }
}

/// Scale `dims` down so the longer side is at most `max_dimension`,
/// preserving aspect ratio. Never scales up.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn fit_within(dims: Dimensions, max_dimension: u32) -> Option<(u32, u32)> {
    if max_dimension == 0 || dims.is_empty() {
        return None;
    }
    let longest = dims.width.max(dims.height);
    if longest <= max_dimension {
        return Some((dims.width, dims.height));
    }
    let scale = f64::from(max_dimension) / f64::from(longest);
    let w = (f64::from(dims.width) * scale).round().max(1.0) as u32;
    let h = (f64::from(dims.height) * scale).round().max(1.0) as u32;
    Some((w.min(max_dimension), h.min(max_dimension)))
}

fn encode_rgba_png(image: &RgbaImage) -> Result<Vec<u8>, SurfaceError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([200, 40, 90, 255])
            } else {
                image::Rgba([10, 220, 30, 128])
            }
        })
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(matches!(
            Surface::new(0, 10),
            Err(SurfaceError::InvalidDimensions(Dimensions { width: 0, height: 10 }))
        ));
    }

    #[test]
    fn new_surface_is_transparent() {
        let s = Surface::new(3, 2).unwrap();
        assert!(s.data().iter().all(|&b| b == 0));
        assert_eq!(s.dimensions(), Dimensions { width: 3, height: 2 });
    }

    #[test]
    fn opaque_pixels_round_trip_exactly() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([12, 34, 56, 255]));
        let s = Surface::from_rgba_image(&img).unwrap();
        assert_eq!(s.to_rgba_image(), img);
    }

    #[test]
    fn stored_data_is_premultiplied() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 128]));
        let s = Surface::from_rgba_image(&img).unwrap();
        assert_eq!(s.data(), &[128, 128, 128, 128]);
    }

    #[test]
    fn draw_base_rejects_mismatch() {
        let mut s = Surface::new(4, 4).unwrap();
        let err = s.draw_base(&checker(2, 4)).unwrap_err();
        assert_eq!(
            err,
            ComposeError::DimensionMismatch {
                surface: Dimensions { width: 4, height: 4 },
                image: Dimensions { width: 2, height: 4 },
            }
        );
        assert!(matches!(
            s.draw_base(&RgbaImage::new(0, 0)),
            Err(ComposeError::EmptySource(_))
        ));
    }

    #[test]
    fn clear_wipes_pixels() {
        let mut s = Surface::from_rgba_image(&checker(4, 4)).unwrap();
        s.clear();
        assert!(s.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn png_has_signature_and_decodes() {
        let s = Surface::from_rgba_image(&checker(5, 3)).unwrap();
        let png = s.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 3));
    }

    #[test]
    fn preview_is_bounded() {
        let s = Surface::new(400, 100).unwrap();
        let png = s.preview_png(64).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 16));
        assert!(s.preview_png(0).is_err());
    }

    #[test]
    fn fit_within_never_upscales() {
        let dims = Dimensions { width: 20, height: 10 };
        assert_eq!(fit_within(dims, 256), Some((20, 10)));
        assert_eq!(fit_within(dims, 10), Some((10, 5)));
        assert_eq!(fit_within(Dimensions { width: 1000, height: 1 }, 10), Some((10, 1)));
    }
}

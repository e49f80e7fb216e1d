//! Production codec backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Extract | `image::DynamicImage::crop_imm` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Blur | `image::DynamicImage::blur` (true Gaussian) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_resize_height;
use super::params::{CropRect, Encoding, JpegOptions, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use std::io::Cursor;

/// Backend using the `image` crate ecosystem plus libwebp.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Lossy WebP via libwebp. The `image` crate's own WebP encoder is lossless only.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let encoder = webp::Encoder::from_rgba(&rgba, width, height);
    let memory = encoder
        .encode_simple(false, quality.value() as f32)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {e:?}")))?;
    Ok(memory.to_vec())
}

/// Baseline JPEG. The effort flags only matter for deflate-style encoders;
/// this encoder is driven by quality alone.
fn encode_jpeg(img: &DynamicImage, options: JpegOptions) -> Result<Vec<u8>, BackendError> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, options.quality.value() as u8)
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))?;
    Ok(buffer)
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<(Dimensions, DynamicImage), BackendError> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BackendError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let dims = Dimensions {
            width: img.width(),
            height: img.height(),
        };
        Ok((dims, img))
    }

    fn extract(&self, image: DynamicImage, crop: CropRect) -> Result<DynamicImage, BackendError> {
        if !crop.fits_within(image.width(), image.height()) {
            return Err(BackendError::InvalidCrop {
                crop,
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(image.crop_imm(crop.left, crop.top, crop.width, crop.height))
    }

    fn resize(&self, image: DynamicImage, width: u32) -> Result<DynamicImage, BackendError> {
        if width == 0 {
            return Err(BackendError::ProcessingFailed(
                "Resize width must be positive".into(),
            ));
        }
        let height = calculate_resize_height((image.width(), image.height()), width);
        Ok(image.resize_exact(width, height, FilterType::Lanczos3))
    }

    fn blur(&self, image: DynamicImage, sigma: f32) -> Result<DynamicImage, BackendError> {
        Ok(image.blur(sigma))
    }

    fn encode(&self, image: &DynamicImage, encoding: Encoding) -> Result<Vec<u8>, BackendError> {
        match encoding {
            Encoding::WebP { quality } => encode_webp(image, quality),
            Encoding::Jpeg(options) => encode_jpeg(image, options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    /// Encode a gradient as JPEG bytes with the given dimensions.
    fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buffer = Vec::new();
        JpegEncoder::new(&mut buffer)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        buffer
    }

    /// Alternating black/white columns: maximum horizontal contrast.
    fn stripes(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, _| {
            if x % 2 == 0 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        }))
    }

    fn horizontal_contrast(img: &DynamicImage) -> u32 {
        let gray = img.to_luma8();
        let (w, h) = gray.dimensions();
        let mut total = 0u32;
        for y in 0..h {
            for x in 1..w {
                let a = gray.get_pixel(x - 1, y)[0] as i32;
                let b = gray.get_pixel(x, y)[0] as i32;
                total += (a - b).unsigned_abs();
            }
        }
        total
    }

    #[test]
    fn decode_synthetic_jpeg() {
        let backend = RustBackend::new();
        let (dims, img) = backend.decode(&test_jpeg(200, 150)).unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 150 });
        assert_eq!(img.dimensions(), (200, 150));
    }

    #[test]
    fn decode_garbage_errors() {
        let backend = RustBackend::new();
        let result = backend.decode(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }

    #[test]
    fn extract_returns_requested_region() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(400, 200)).unwrap();
        let crop = CropRect {
            left: 50,
            top: 0,
            width: 300,
            height: 200,
        };
        let cropped = backend.extract(img, crop).unwrap();
        assert_eq!(cropped.dimensions(), (300, 200));
    }

    #[test]
    fn extract_out_of_bounds_errors() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(100, 100)).unwrap();
        let crop = CropRect {
            left: 10,
            top: 10,
            width: 100,
            height: 50,
        };
        assert!(matches!(
            backend.extract(img, crop),
            Err(BackendError::InvalidCrop { .. })
        ));
    }

    #[test]
    fn resize_derives_height() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(300, 200)).unwrap();
        let resized = backend.resize(img, 48).unwrap();
        assert_eq!(resized.dimensions(), (48, 32));
    }

    #[test]
    fn resize_upscales() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(30, 20)).unwrap();
        let resized = backend.resize(img, 300).unwrap();
        assert_eq!(resized.dimensions(), (300, 200));
    }

    #[test]
    fn blur_smooths_pixels() {
        let backend = RustBackend::new();
        let sharp = stripes(48, 32);
        let before = horizontal_contrast(&sharp);
        let blurred = backend.blur(sharp, 25.0).unwrap();
        assert_eq!(blurred.dimensions(), (48, 32));
        assert!(horizontal_contrast(&blurred) < before / 10);
    }

    #[test]
    fn encode_webp_has_riff_signature() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(120, 80)).unwrap();
        let bytes = backend
            .encode(
                &img,
                Encoding::WebP {
                    quality: Quality::new(60),
                },
            )
            .unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn encode_jpeg_has_soi_marker() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(48, 32)).unwrap();
        let bytes = backend
            .encode(&img, Encoding::Jpeg(JpegOptions::aggressive(Quality::new(50))))
            .unwrap();
        assert_eq!(&bytes[0..3], &[0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn lower_webp_quality_is_smaller() {
        let backend = RustBackend::new();
        let (_, img) = backend.decode(&test_jpeg(400, 300)).unwrap();
        let high = backend
            .encode(&img, Encoding::WebP { quality: Quality::new(95) })
            .unwrap();
        let low = backend
            .encode(&img, Encoding::WebP { quality: Quality::new(10) })
            .unwrap();
        assert!(low.len() < high.len());
    }
}

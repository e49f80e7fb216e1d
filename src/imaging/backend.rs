//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the five operations the render step
//! needs: decode, extract, resize, blur, and encode. Images flow through the
//! trait by value so a backend can reuse buffers between steps.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate with libwebp for lossy WebP.

use super::params::{CropRect, Encoding};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode source image: {0}")]
    Decode(String),
    #[error("Crop {0:?} has no area")]
    EmptyCrop(CropRect),
    #[error("Crop {crop:?} does not fit a {width}x{height} image")]
    InvalidCrop {
        crop: CropRect,
        width: u32,
        height: u32,
    },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of a decode operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image codec backends.
///
/// Every backend must implement all five operations so the render step is
/// backend-agnostic. `Image` is whatever the backend decodes into; the
/// pipeline never looks inside it.
pub trait ImageBackend: Send + Sync {
    type Image: Send + 'static;

    /// Decode bytes and report the source dimensions.
    fn decode(&self, bytes: &[u8]) -> Result<(Dimensions, Self::Image), BackendError>;

    /// Cut out a sub-region. Must reject rectangles that do not fit.
    fn extract(&self, image: Self::Image, crop: CropRect) -> Result<Self::Image, BackendError>;

    /// Resize to `width`, deriving height from the current aspect ratio.
    fn resize(&self, image: Self::Image, width: u32) -> Result<Self::Image, BackendError>;

    /// Gaussian blur with the given sigma.
    fn blur(&self, image: Self::Image, sigma: f32) -> Result<Self::Image, BackendError>;

    /// Encode to bytes in the requested format.
    fn encode(&self, image: &Self::Image, encoding: Encoding) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::calculate_resize_height;
    use crate::imaging::params::{JpegOptions, Quality};
    use std::sync::Mutex;

    /// Minimal byte sequences that carry each format's signature.
    pub const FAKE_WEBP: &[u8] = b"RIFF\x1a\x00\x00\x00WEBPVP8 ";
    pub const FAKE_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    /// Mock backend that records operations without touching pixels.
    /// Its "image" is just the dimensions the real image would have.
    /// Uses Mutex (not RefCell) so it is Sync and can cross into blocking tasks.
    #[derive(Default)]
    pub struct MockBackend {
        pub decode_result: Mutex<Option<Dimensions>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode { bytes: usize },
        Extract(CropRect),
        Resize { width: u32 },
        Blur { sigma: f32 },
        Encode(Encoding),
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(width: u32, height: u32) -> Self {
            Self {
                decode_result: Mutex::new(Some(Dimensions { width, height })),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageBackend for MockBackend {
        type Image = Dimensions;

        fn decode(&self, bytes: &[u8]) -> Result<(Dimensions, Dimensions), BackendError> {
            self.record(RecordedOp::Decode { bytes: bytes.len() });
            self.decode_result
                .lock()
                .unwrap()
                .as_ref()
                .map(|d| (*d, *d))
                .ok_or_else(|| BackendError::Decode("No mock dimensions".to_string()))
        }

        fn extract(&self, image: Dimensions, crop: CropRect) -> Result<Dimensions, BackendError> {
            self.record(RecordedOp::Extract(crop));
            if !crop.fits_within(image.width, image.height) {
                return Err(BackendError::InvalidCrop {
                    crop,
                    width: image.width,
                    height: image.height,
                });
            }
            Ok(Dimensions {
                width: crop.width,
                height: crop.height,
            })
        }

        fn resize(&self, image: Dimensions, width: u32) -> Result<Dimensions, BackendError> {
            self.record(RecordedOp::Resize { width });
            Ok(Dimensions {
                width,
                height: calculate_resize_height(image.as_tuple(), width),
            })
        }

        fn blur(&self, image: Dimensions, sigma: f32) -> Result<Dimensions, BackendError> {
            self.record(RecordedOp::Blur { sigma });
            Ok(image)
        }

        fn encode(&self, _image: &Dimensions, encoding: Encoding) -> Result<Vec<u8>, BackendError> {
            self.record(RecordedOp::Encode(encoding));
            Ok(match encoding {
                Encoding::WebP { .. } => FAKE_WEBP.to_vec(),
                Encoding::Jpeg(_) => FAKE_JPEG.to_vec(),
            })
        }
    }

    #[test]
    fn mock_records_decode() {
        let backend = MockBackend::with_dimensions(800, 600);

        let (dims, _) = backend.decode(&[1, 2, 3]).unwrap();
        assert_eq!(dims.width, 800);
        assert_eq!(dims.height, 600);

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Decode { bytes: 3 }]);
    }

    #[test]
    fn mock_decode_without_dimensions_fails() {
        let backend = MockBackend::new();
        assert!(matches!(backend.decode(&[]), Err(BackendError::Decode(_))));
    }

    #[test]
    fn mock_extract_rejects_out_of_bounds() {
        let backend = MockBackend::new();
        let image = Dimensions {
            width: 100,
            height: 100,
        };
        let crop = CropRect {
            left: 50,
            top: 0,
            width: 60,
            height: 100,
        };
        let result = backend.extract(image, crop);
        assert!(matches!(result, Err(BackendError::InvalidCrop { width: 100, .. })));
    }

    #[test]
    fn mock_records_resize_and_encode() {
        let backend = MockBackend::new();
        let image = Dimensions {
            width: 1500,
            height: 1000,
        };

        let resized = backend.resize(image, 300).unwrap();
        assert_eq!(resized.height, 200);

        let bytes = backend
            .encode(
                &resized,
                Encoding::Jpeg(JpegOptions::aggressive(Quality::new(50))),
            )
            .unwrap();
        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], RecordedOp::Resize { width: 300 }));
        assert!(matches!(ops[1], RecordedOp::Encode(Encoding::Jpeg(_))));
    }
}

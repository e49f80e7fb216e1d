//! High-level image operations.
//!
//! These functions combine the plan with backend execution: crop, resize,
//! optionally blur, encode, and package the result for the response.

use super::backend::{BackendError, ImageBackend};
use super::params::{Encoding, JpegOptions, OutputMode, RenderingPlan};
use super::svg::{baked_blur_svg, css_blur_svg};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Gaussian sigma for the baked placeholder blur.
pub const BAKED_BLUR_SIGMA: f32 = 25.0;

/// How a [`RenderedOutput`] payload must be carried by a transport that only
/// accepts text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingHint {
    /// Binary image bytes. Text-only transports must base64-encode them.
    Raw,
    /// Text, sent as-is: the SVG wrappers (which embed their JPEG as
    /// base64), error messages, and empty bodies.
    Text,
}

/// Final payload for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub payload: Vec<u8>,
    pub content_type: &'static str,
    pub encoding_hint: EncodingHint,
}

/// Execute a plan against a decoded image.
///
/// The crop is validated before any backend call; an empty crop rectangle is
/// reported as [`BackendError::EmptyCrop`] and nothing else runs.
pub fn render<B: ImageBackend>(
    backend: &B,
    image: B::Image,
    plan: &RenderingPlan,
) -> Result<RenderedOutput> {
    let mut image = image;
    if let Some(crop) = plan.crop {
        if crop.width == 0 || crop.height == 0 {
            return Err(BackendError::EmptyCrop(crop));
        }
        image = backend.extract(image, crop)?;
    }

    let resized = backend.resize(image, plan.target_width)?;
    let content_type = plan.output_mode.content_type();

    match plan.output_mode {
        OutputMode::WebP => {
            let payload = backend.encode(
                &resized,
                Encoding::WebP {
                    quality: plan.quality,
                },
            )?;
            Ok(RenderedOutput {
                payload,
                content_type,
                encoding_hint: EncodingHint::Raw,
            })
        }
        OutputMode::BakedBlurSvg => {
            let blurred = if plan.apply_blur {
                backend.blur(resized, BAKED_BLUR_SIGMA)?
            } else {
                resized
            };
            let jpeg = encode_placeholder_jpeg(backend, &blurred, plan)?;
            Ok(RenderedOutput {
                payload: baked_blur_svg(plan.target_width, &jpeg).into_bytes(),
                content_type,
                encoding_hint: EncodingHint::Text,
            })
        }
        OutputMode::CssBlurSvg => {
            let jpeg = encode_placeholder_jpeg(backend, &resized, plan)?;
            Ok(RenderedOutput {
                payload: css_blur_svg(&jpeg).into_bytes(),
                content_type,
                encoding_hint: EncodingHint::Text,
            })
        }
    }
}

/// Encode the small embedded JPEG and return it as base64.
fn encode_placeholder_jpeg<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    plan: &RenderingPlan,
) -> Result<String> {
    let bytes = backend.encode(image, Encoding::Jpeg(JpegOptions::aggressive(plan.quality)))?;
    Ok(STANDARD.encode(bytes))
}

//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`plan`](super::plan) builder (which decides what the
//! response should look like) and the [`backend`](super::backend) (which does
//! the actual pixel work). Nothing here touches pixels or performs I/O.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 60). Clamped on construction.
//! - [`SizeTier`] — The six named size classes and their fixed target widths.
//! - [`RenderMethod`] — Who applies the placeholder blur: the SVG consumer or the codec.
//! - [`RequestParams`] — Caller input after defaulting.
//! - [`CropRect`] — A sub-region in source pixel coordinates.
//! - [`OutputMode`] / [`RenderingPlan`] — The immutable result of plan building.
//! - [`Encoding`] / [`JpegOptions`] — Encoder selection handed to the backend.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    /// Quality used for both SVG placeholder modes, regardless of the request.
    pub const PLACEHOLDER: Quality = Quality(50);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Parse a caller-supplied quality from its leading digits, so `"80abc"`
    /// reads as 80 and `"7.5"` as 7. No leading digit falls back to the default.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(leading_digits)
            .map(|digits| digits.parse::<u32>().map(Self::new).unwrap_or(Self(100)))
            .unwrap_or_default()
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

fn leading_digits(raw: &str) -> Option<&str> {
    let s = raw.trim_start();
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

impl Default for Quality {
    fn default() -> Self {
        Self(60)
    }
}

/// Named size class. Each tier maps to a fixed output width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SizeTier {
    Xxs,
    Xs,
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

impl SizeTier {
    pub const ALL: [SizeTier; 6] = [
        SizeTier::Xxs,
        SizeTier::Xs,
        SizeTier::Sm,
        SizeTier::Md,
        SizeTier::Lg,
        SizeTier::Xl,
    ];

    /// Resolve a `size` query value. Missing or unknown keys resolve to [`SizeTier::Md`].
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some("xxs") => SizeTier::Xxs,
            Some("xs") => SizeTier::Xs,
            Some("sm") => SizeTier::Sm,
            Some("md") => SizeTier::Md,
            Some("lg") => SizeTier::Lg,
            Some("xl") => SizeTier::Xl,
            _ => SizeTier::default(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            SizeTier::Xxs => "xxs",
            SizeTier::Xs => "xs",
            SizeTier::Sm => "sm",
            SizeTier::Md => "md",
            SizeTier::Lg => "lg",
            SizeTier::Xl => "xl",
        }
    }

    /// Target output width in pixels.
    pub fn width(self) -> u32 {
        match self {
            SizeTier::Xxs => 48,
            SizeTier::Xs => 300,
            SizeTier::Sm => 600,
            SizeTier::Md => 1200,
            SizeTier::Lg => 2048,
            SizeTier::Xl => 2048,
        }
    }
}

/// How the blurred `xxs` placeholder gets its blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMethod {
    /// The SVG wrapper declares a Gaussian blur filter; the consumer renders it.
    #[default]
    CssBlur,
    /// The codec blurs the pixels before encoding.
    BakedBlur,
}

impl RenderMethod {
    /// Resolve an `svgMethod` query value: `css` or absent is CSS blur, anything else is baked.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            None | Some("css") => RenderMethod::CssBlur,
            Some(_) => RenderMethod::BakedBlur,
        }
    }
}

/// Caller input, already defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestParams {
    pub size_tier: SizeTier,
    pub quality: Quality,
    pub render_method: RenderMethod,
}

/// Sub-region of the source image, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// True when the rectangle is non-empty and lies fully inside a `width`×`height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && u64::from(self.left) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.top) + u64::from(self.height) <= u64::from(height)
    }
}

/// Output representation selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Lossy WebP bytes, no wrapper.
    WebP,
    /// JPEG with blur baked into the pixels, wrapped in a plain SVG.
    BakedBlurSvg,
    /// Unblurred JPEG wrapped in an SVG that declares the blur filter.
    CssBlurSvg,
}

impl OutputMode {
    pub fn content_type(self) -> &'static str {
        match self {
            OutputMode::WebP => "image/webp",
            OutputMode::BakedBlurSvg | OutputMode::CssBlurSvg => "image/svg+xml",
        }
    }
}

/// Everything the render step needs, decided up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderingPlan {
    /// `None` when the source is already within tolerance of the target ratio.
    pub crop: Option<CropRect>,
    pub target_width: u32,
    pub output_mode: OutputMode,
    pub quality: Quality,
    /// Only ever true for [`OutputMode::BakedBlurSvg`].
    pub apply_blur: bool,
}

/// JPEG encoder settings for the embedded placeholder image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegOptions {
    pub quality: Quality,
    /// Spend maximum effort on entropy coding.
    pub max_compression: bool,
    pub adaptive_filtering: bool,
}

impl JpegOptions {
    /// The settings used for every SVG-embedded JPEG.
    pub fn aggressive(quality: Quality) -> Self {
        Self {
            quality,
            max_compression: true,
            adaptive_filtering: true,
        }
    }
}

/// Target format for the backend's encode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    WebP { quality: Quality },
    Jpeg(JpegOptions),
}

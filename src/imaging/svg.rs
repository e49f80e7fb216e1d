//! SVG wrapper documents for the `xxs` placeholder modes.
//!
//! Both wrappers embed a base64 JPEG as a `data:` URI. The CSS-blur wrapper
//! also declares the blur filter and always uses a fixed 1200-wide canvas, so
//! every placeholder blurs identically no matter how small the embedded image is.

use super::calculations::target_height;

/// Canvas width of the CSS-blur wrapper. Independent of the requested tier.
pub const CSS_BLUR_CANVAS_WIDTH: u32 = 1200;

/// `stdDeviation` of the declared Gaussian blur, in canvas units.
pub const CSS_BLUR_STD_DEVIATION: u32 = 20;

fn jpeg_data_uri(jpeg_base64: &str) -> String {
    format!("data:image/jpeg;base64,{jpeg_base64}")
}

/// Plain wrapper around an already-blurred JPEG, sized to the render width.
pub fn baked_blur_svg(width: u32, jpeg_base64: &str) -> String {
    let height = target_height(width);
    let href = jpeg_data_uri(jpeg_base64);
    format!(
        r#"<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
<image href="{href}" width="100%" height="100%" />
</svg>
"#
    )
}

/// Wrapper that blurs the embedded JPEG through an SVG filter.
///
/// The alpha transfer pass forces full opacity so the blurred edges do not
/// fade to transparent.
pub fn css_blur_svg(jpeg_base64: &str) -> String {
    let width = CSS_BLUR_CANVAS_WIDTH;
    let height = target_height(width);
    let sd = CSS_BLUR_STD_DEVIATION;
    let href = jpeg_data_uri(jpeg_base64);
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}" version="1.1">
<filter id="blur" filterUnits="userSpaceOnUse" color-interpolation-filters="sRGB">
<feGaussianBlur stdDeviation="{sd} {sd}" edgeMode="duplicate"/>
<feComponentTransfer>
<feFuncA type="discrete" tableValues="1 1"/>
</feComponentTransfer>
</filter>
<image filter="url(#blur)" xlink:href="{href}" x="0" y="0" width="100%" height="100%" />
</svg>
"##
    )
}

/// Pull the base64 payload back out of a wrapper's `data:` URI.
pub fn embedded_jpeg_base64(svg: &str) -> Option<&str> {
    const PREFIX: &str = "data:image/jpeg;base64,";
    let start = svg.find(PREFIX)? + PREFIX.len();
    let rest = &svg[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

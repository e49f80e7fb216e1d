//! Rendering plan builder.
//!
//! Turns source dimensions and request parameters into a [`RenderingPlan`].
//! Pure and total: every input produces a plan, and the same input always
//! produces the same plan.
//!
//! Output mode policy:
//!
//! | tier | render method | mode | quality | codec blur |
//! |---|---|---|---|---|
//! | `xxs` | CSS | [`OutputMode::CssBlurSvg`] | 50 | no |
//! | `xxs` | baked | [`OutputMode::BakedBlurSvg`] | 50 | yes |
//! | other | any | [`OutputMode::WebP`] | requested | no |

use super::backend::Dimensions;
use super::calculations::{calculate_crop, calculate_resize_height};
use super::params::{
    OutputMode, Quality, RenderMethod, RenderingPlan, RequestParams, SizeTier,
};

/// Build the plan for one request.
pub fn build_plan(source: Dimensions, params: &RequestParams) -> RenderingPlan {
    let output_mode = select_output_mode(params.size_tier, params.render_method);
    let quality = match output_mode {
        OutputMode::WebP => params.quality,
        OutputMode::BakedBlurSvg | OutputMode::CssBlurSvg => Quality::PLACEHOLDER,
    };

    RenderingPlan {
        crop: calculate_crop(source.as_tuple()),
        target_width: params.size_tier.width(),
        output_mode,
        quality,
        apply_blur: output_mode == OutputMode::BakedBlurSvg,
    }
}

/// Pixel size the plan produces, before any SVG wrapping.
pub fn output_dimensions(source: Dimensions, plan: &RenderingPlan) -> Dimensions {
    let cropped = plan
        .crop
        .map(|c| (c.width, c.height))
        .unwrap_or(source.as_tuple());
    Dimensions {
        width: plan.target_width,
        height: calculate_resize_height(cropped, plan.target_width),
    }
}

fn select_output_mode(tier: SizeTier, method: RenderMethod) -> OutputMode {
    match (tier, method) {
        (SizeTier::Xxs, RenderMethod::CssBlur) => OutputMode::CssBlurSvg,
        (SizeTier::Xxs, RenderMethod::BakedBlur) => OutputMode::BakedBlurSvg,
        _ => OutputMode::WebP,
    }
}

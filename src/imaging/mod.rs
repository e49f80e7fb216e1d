//! Image processing: plan building and rendering.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (format sniffed from bytes) |
//! | **Crop to 3:2** | [`calculate_crop`] + `crop_imm` |
//! | **Resize** | Lanczos3 to the tier width |
//! | **Encode → WebP** | libwebp via the `webp` crate |
//! | **Placeholder** | JPEG q50, base64, wrapped in SVG |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for ratio and dimension math (unit testable)
//! - **Parameters**: Data structures describing requests, plans, and encodings
//! - **Plan**: [`build_plan`], the whole output policy in one pure function
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: [`render`], which executes a plan against a backend
//! - **SVG**: the two placeholder wrapper documents

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod plan;
pub mod rust_backend;
pub mod svg;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{RATIO_TOLERANCE, TARGET_RATIO, calculate_crop, target_height};
pub use operations::{EncodingHint, RenderedOutput, render};
pub use params::{
    CropRect, Encoding, JpegOptions, OutputMode, Quality, RenderMethod, RenderingPlan,
    RequestParams, SizeTier,
};
pub use plan::{build_plan, output_dimensions};
pub use rust_backend::RustBackend;

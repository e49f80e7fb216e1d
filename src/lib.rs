//! # Image Scaler
//!
//! An on-demand image resizing proxy. A request names an asset path on a
//! fixed origin plus a size tier; the service fetches the original, crops it
//! to 3:2, resizes it to the tier width, and returns WebP. The smallest tier
//! returns a blurred SVG placeholder instead.
//!
//! # Architecture: One Core, Two Shells
//!
//! ```text
//! axum server ─┐                                  ┌─► WebP bytes
//!              ├─► Scaler ─► fetch ─► plan ─► render
//! Lambda event ┘                                  └─► SVG text (embedded JPEG)
//! ```
//!
//! The policy lives in one pure function, [`imaging::build_plan`], which turns
//! source dimensions and request parameters into a [`imaging::RenderingPlan`].
//! [`imaging::render`] executes that plan against an
//! [`imaging::ImageBackend`]. Everything around it is plumbing:
//!
//! - **Testability**: the plan builder has no I/O, and the render executor
//!   runs against a recording mock backend, so every branch is unit tested
//!   without decoding a pixel.
//! - **One policy, many hosts**: the persistent server and the Lambda handler
//!   are thin adapters over [`service::Scaler`]; neither contains any
//!   transformation logic.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Plan builder, render executor, codec backend, SVG wrappers |
//! | [`service`] | Request pipeline: favicon short circuit, fetch, size ceiling, render |
//! | [`fetch`] | Origin fetch with header validation and a streamed size ceiling |
//! | [`request`] | Query parameter parsing and origin URL construction |
//! | [`error`] | Error taxonomy and its status/message mapping |
//! | [`config`] | Layered configuration: defaults, TOML file, environment |
//! | [`logging`] | `tracing` subscriber setup for each shell |
//! | [`output`] | Conversion statistics |
//! | [`shell`] | axum server and Lambda adapters |
//!
//! # Design Decisions
//!
//! ## Fixed Ratio, Fixed Tiers
//!
//! Every output is 3:2 at one of six widths. Sources within 0.01 of the ratio
//! pass through uncropped; everything else is center-cropped. Callers cannot
//! ask for arbitrary sizes, which keeps the set of possible outputs small and
//! CDN-friendly.
//!
//! ## Two Placeholder Flavours
//!
//! The `xxs` tier exists for blur-up placeholders. With `svgMethod=css` (the
//! default) the SVG carries a sharp 48px JPEG and a Gaussian blur filter, so
//! the browser does the blurring. Any other method bakes a blur into the JPEG
//! pixels and wraps it in a plain SVG. The CSS variant always declares a
//! 1200×800 canvas, independent of the tier width.
//!
//! ## Blocking Work Off the Runtime
//!
//! Decode, resize, and encode are CPU-bound. [`service::Scaler`] runs them on
//! tokio's blocking pool so a slow encode never stalls other requests' fetches.

pub mod config;
pub mod error;
pub mod fetch;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod request;
pub mod service;
pub mod shell;

//! Caller input: query parameters and asset paths.
//!
//! Both shells hand their query strings to [`RequestParams::from_query`] as a lookup
//! function, so a missing map (Lambda sends `null` for an empty query) and an
//! absent key behave the same.

use crate::imaging::{Quality, RenderMethod, RequestParams, SizeTier};

/// Path browsers request on their own; answered with 204 and never fetched.
pub const FAVICON_PATH: &str = "/favicon.ico";

impl RequestParams {
    /// Build params from `size`, `quality`, and `svgMethod`.
    pub fn from_query<'a>(lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        Self {
            size_tier: SizeTier::from_key(lookup("size")),
            quality: Quality::parse(lookup("quality")),
            render_method: RenderMethod::from_param(lookup("svgMethod")),
        }
    }
}

pub fn is_favicon(path: &str) -> bool {
    path == FAVICON_PATH
}

/// Origin URL for an asset path. The path is appended verbatim.
pub fn source_url(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

//! Request pipeline shared by both shells.
//!
//! ```text
//! path + params ─► favicon? ─► fetch ─► size check ─► decode ─► plan ─► render
//!                    │ 204                                   (blocking thread)
//! ```
//!
//! [`Scaler::handle`] never fails: every outcome, including errors, becomes a
//! [`ScaleResponse`] the shell only has to serialize.

use crate::config::ScalerConfig;
use crate::error::{Result, ScalerError};
use crate::fetch::SourceFetcher;
use crate::imaging::{
    EncodingHint, ImageBackend, RenderedOutput, RequestParams, build_plan, output_dimensions,
    render,
};
use crate::output::ConversionStats;
use crate::request::{is_favicon, source_url};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Instant;

/// Content type of every error body.
pub const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Shell-agnostic response.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleResponse {
    pub status: u16,
    /// `None` only for 204.
    pub content_type: Option<&'static str>,
    pub body: Bytes,
    pub encoding: EncodingHint,
}

impl ScaleResponse {
    pub fn no_content() -> Self {
        Self {
            status: 204,
            content_type: None,
            body: Bytes::new(),
            encoding: EncodingHint::Text,
        }
    }

    pub fn from_error(err: &ScalerError) -> Self {
        Self {
            status: err.status_code(),
            content_type: Some(ERROR_CONTENT_TYPE),
            body: Bytes::from(err.public_message()),
            encoding: EncodingHint::Text,
        }
    }

    pub fn from_output(output: RenderedOutput) -> Self {
        Self {
            status: 200,
            content_type: Some(output.content_type),
            body: Bytes::from(output.payload),
            encoding: output.encoding_hint,
        }
    }
}

/// Decode, plan, and render one source buffer.
///
/// Synchronous and CPU-bound. The server runs it on a blocking thread; the
/// `render` CLI command calls it directly.
pub fn render_source<B: ImageBackend>(
    backend: &B,
    bytes: &[u8],
    params: &RequestParams,
) -> Result<(RenderedOutput, ConversionStats)> {
    let (source, image) = backend.decode(bytes)?;
    let plan = build_plan(source, params);
    match plan.crop {
        Some(crop) => tracing::debug!(
            width = source.width,
            height = source.height,
            ?crop,
            "Cropping to 3:2"
        ),
        None => tracing::debug!(
            width = source.width,
            height = source.height,
            "Ratio within tolerance, no crop"
        ),
    }

    let output = render(backend, image, &plan)?;
    let produced = output_dimensions(source, &plan);
    let stats = ConversionStats {
        original_bytes: bytes.len(),
        output_bytes: output.payload.len(),
        width: produced.width,
        height: produced.height,
    };
    Ok((output, stats))
}

/// Owns the configuration, the origin fetcher, and the codec backend.
pub struct Scaler<F, B> {
    config: ScalerConfig,
    fetcher: F,
    backend: Arc<B>,
}

impl<F, B> Scaler<F, B>
where
    F: SourceFetcher,
    B: ImageBackend + 'static,
{
    pub fn new(config: ScalerConfig, fetcher: F, backend: B) -> Self {
        Self {
            config,
            fetcher,
            backend: Arc::new(backend),
        }
    }

    pub fn config(&self) -> &ScalerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Serve one request.
    pub async fn handle(&self, path: &str, params: RequestParams) -> ScaleResponse {
        if is_favicon(path) {
            tracing::debug!("Favicon request, answering 204");
            return ScaleResponse::no_content();
        }

        let started = Instant::now();
        let url = source_url(&self.config.base_url, path);
        let response = match self.process(&url, params).await {
            Ok(output) => ScaleResponse::from_output(output),
            Err(err) => {
                let status = err.status_code();
                if err.is_client_side() {
                    tracing::warn!(%url, status, error = %err, "Request failed");
                } else {
                    tracing::error!(%url, status, error = %err, "Request failed");
                }
                ScaleResponse::from_error(&err)
            }
        };
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            status = response.status,
            " - done - "
        );
        response
    }

    async fn process(&self, url: &str, params: RequestParams) -> Result<RenderedOutput> {
        tracing::debug!(url, size = params.size_tier.key(), "Requesting image");
        let source = self.fetcher.fetch(url).await?;

        let limit = self.config.origin.max_source_bytes;
        let received = source.bytes.len() as u64;
        if received > limit {
            return Err(ScalerError::PayloadTooLarge {
                bytes: received,
                limit,
            });
        }
        tracing::debug!(bytes = received, "Image loaded");

        let backend = Arc::clone(&self.backend);
        let bytes = source.bytes;
        let (output, stats) =
            tokio::task::spawn_blocking(move || render_source(backend.as_ref(), &bytes, &params))
                .await
                .map_err(|e| ScalerError::Internal(format!("render task failed: {e}")))??;

        tracing::debug!("{stats}");
        Ok(output)
    }
}

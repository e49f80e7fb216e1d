//! Persistent HTTP server.
//!
//! Every `GET` path is an asset path on the origin. The request path is taken
//! from the URI as received (still percent-encoded) so it reaches the origin
//! unchanged.

use crate::config::ScalerConfig;
use crate::fetch::SourceFetcher;
use crate::imaging::{ImageBackend, RequestParams};
use crate::service::{ScaleResponse, Scaler};
use axum::Router;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use std::collections::HashMap;
use std::sync::Arc;

/// Build the router. `/` and every other path go to the same handler.
pub fn router<F, B>(scaler: Arc<Scaler<F, B>>) -> Router
where
    F: SourceFetcher + 'static,
    B: ImageBackend + 'static,
{
    Router::new()
        .route("/", get(scale::<F, B>))
        .route("/{*path}", get(scale::<F, B>))
        .with_state(scaler)
}

async fn scale<F, B>(
    State(scaler): State<Arc<Scaler<F, B>>>,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
) -> Response
where
    F: SourceFetcher + 'static,
    B: ImageBackend + 'static,
{
    let params = RequestParams::from_query(|key| query.get(key).map(String::as_str));
    into_http(scaler.handle(uri.path(), params).await)
}

/// Bytes and text are both written verbatim.
fn into_http(response: ScaleResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Body::from(response.body);
    match response.content_type {
        Some(content_type) => (status, [(header::CONTENT_TYPE, content_type)], body).into_response(),
        None => (status, body).into_response(),
    }
}

/// Bind and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &ScalerConfig, app: Router) -> std::io::Result<()> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        origin = %config.base_url,
        max_source_bytes = config.origin.max_source_bytes,
        "Image scaler listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        _ = terminate => tracing::info!("Received terminate signal"),
    }

    tracing::info!("Shutting down gracefully...");
}

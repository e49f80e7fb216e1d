//! Origin fetch.
//!
//! The response head is validated before any body bytes are read: a wrong
//! status, a non-image content type, or a declared length over the ceiling
//! all fail without buffering. The body is then streamed and counted, so an
//! origin that omits or understates `Content-Length` still cannot push more
//! than the ceiling into memory.

use crate::config::{ScalerConfig, user_agent};
use crate::error::{Result, ScalerError};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::redirect::Policy;
use std::time::Duration;

/// A successfully fetched source image.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedSource {
    pub status: u16,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Retrieves source images from the origin.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedSource>;
}

pub(crate) fn is_image_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().starts_with("image/")
}

/// Fetcher backed by a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(config: &ScalerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let agent = HeaderValue::from_str(&user_agent())
            .map_err(|e| ScalerError::Internal(format!("invalid user agent: {e}")))?;
        headers.insert(USER_AGENT, agent);

        let name = HeaderName::from_bytes(config.origin.auth_header.as_bytes())
            .map_err(|e| ScalerError::Internal(format!("invalid auth header name: {e}")))?;
        let mut token = HeaderValue::from_str(&config.origin.auth_token)
            .map_err(|e| ScalerError::Internal(format!("invalid auth token: {e}")))?;
        token.set_sensitive(true);
        headers.insert(name, token);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.origin.timeout_secs))
            .redirect(Policy::none())
            .default_headers(headers)
            .build()
            .map_err(|e| ScalerError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_bytes: config.origin.max_source_bytes,
        })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedSource> {
        let fetch_error = |source: reqwest::Error| ScalerError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(ScalerError::UpstreamStatus {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_image_content_type(&content_type) {
            return Err(ScalerError::NotAnImage {
                url: url.to_string(),
                status,
                content_type,
            });
        }

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Err(ScalerError::PayloadTooLarge {
                    bytes: declared,
                    limit: self.max_bytes,
                });
            }
        }

        let mut buffer = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(fetch_error)?;
            let total = (buffer.len() + chunk.len()) as u64;
            if total > self.max_bytes {
                return Err(ScalerError::PayloadTooLarge {
                    bytes: total,
                    limit: self.max_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        tracing::debug!(url, bytes = buffer.len(), %content_type, "Fetched source image");

        Ok(FetchedSource {
            status,
            content_type,
            bytes: Bytes::from(buffer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn fetcher_with_limit(max_source_bytes: u64) -> HttpFetcher {
        let mut config = ScalerConfig::default();
        config.origin.max_source_bytes = max_source_bytes;
        HttpFetcher::new(&config).unwrap()
    }

    /// One-shot origin answering with a chunked image body and no
    /// `Content-Length`, so only the streamed count can enforce the ceiling.
    async fn chunked_origin(chunks: usize, chunk_len: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 2048];
            let _ = socket.read(&mut request).await;

            let mut response = b"HTTP/1.1 200 OK\r\n\
                Content-Type: image/jpeg\r\n\
                Transfer-Encoding: chunked\r\n\
                Connection: close\r\n\r\n"
                .to_vec();
            for _ in 0..chunks {
                response.extend_from_slice(format!("{chunk_len:x}\r\n").as_bytes());
                response.extend_from_slice(&vec![0xAB; chunk_len]);
                response.extend_from_slice(b"\r\n");
            }
            response.extend_from_slice(b"0\r\n\r\n");
            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/stream.jpg")
    }

    fn fetcher_for(server: &MockServer, max_source_bytes: u64) -> HttpFetcher {
        let mut config = ScalerConfig::default();
        config.base_url = server.base_url();
        config.origin.auth_token = "secret".into();
        config.origin.max_source_bytes = max_source_bytes;
        HttpFetcher::new(&config).unwrap()
    }

    // =========================================================================
    // Content type check
    // =========================================================================

    #[test]
    fn image_content_types() {
        assert!(is_image_content_type("image/jpeg"));
        assert!(is_image_content_type("image/png; charset=binary"));
        assert!(is_image_content_type("Image/WebP"));
        assert!(!is_image_content_type("text/html"));
        assert!(!is_image_content_type(""));
        assert!(!is_image_content_type("application/image"));
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    #[tokio::test]
    async fn fetch_returns_body_and_sends_headers() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/images/a.jpg")
                    .header("vs-auth", "secret")
                    .header("user-agent", user_agent());
                then.status(200)
                    .header("Content-Type", "image/jpeg")
                    .body(b"jpegbytes".as_slice());
            })
            .await;

        let fetched = fetcher_for(&server, 1024)
            .fetch(&server.url("/images/a.jpg"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.content_type, "image/jpeg");
        assert_eq!(fetched.bytes.as_ref(), b"jpegbytes");
    }

    #[tokio::test]
    async fn non_200_is_upstream_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing.jpg");
                then.status(404).header("Content-Type", "text/html").body("nope");
            })
            .await;

        let err = fetcher_for(&server, 1024)
            .fetch(&server.url("/missing.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScalerError::UpstreamStatus { status: 404, .. }));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let server = MockServer::start_async().await;
        let target = server
            .mock_async(|when, then| {
                when.method(GET).path("/moved.jpg");
                then.status(200).header("Content-Type", "image/jpeg").body("x");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/old.jpg");
                then.status(302).header("Location", "/moved.jpg");
            })
            .await;

        let err = fetcher_for(&server, 1024)
            .fetch(&server.url("/old.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ScalerError::UpstreamStatus { status: 302, .. }));
        assert_eq!(err.status_code(), 502);
        target.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn non_image_content_type_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/page");
                then.status(200)
                    .header("Content-Type", "text/html")
                    .body("<html></html>");
            })
            .await;

        let err = fetcher_for(&server, 1024)
            .fetch(&server.url("/page"))
            .await
            .unwrap_err();
        match err {
            ScalerError::NotAnImage {
                status,
                content_type,
                ..
            } => {
                assert_eq!(status, 200);
                assert_eq!(content_type, "text/html");
            }
            other => panic!("expected NotAnImage, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/big.jpg");
                then.status(200)
                    .header("Content-Type", "image/jpeg")
                    .body(vec![0u8; 2048]);
            })
            .await;

        let err = fetcher_for(&server, 1024)
            .fetch(&server.url("/big.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ScalerError::PayloadTooLarge { limit: 1024, .. }
        ));
        assert_eq!(err.status_code(), 413);
    }

    #[tokio::test]
    async fn chunked_body_over_ceiling_stops_streaming() {
        let url = chunked_origin(4, 512).await;

        let err = fetcher_with_limit(1024).fetch(&url).await.unwrap_err();

        match &err {
            ScalerError::PayloadTooLarge { bytes, limit } => {
                assert_eq!(*limit, 1024);
                assert!(*bytes > 1024, "reported {bytes} bytes");
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }
        assert_eq!(err.status_code(), 413);
    }

    #[tokio::test]
    async fn chunked_body_within_ceiling_is_accumulated() {
        let url = chunked_origin(2, 512).await;

        let fetched = fetcher_with_limit(1024).fetch(&url).await.unwrap();

        assert_eq!(fetched.content_type, "image/jpeg");
        assert_eq!(fetched.bytes.len(), 1024);
        assert!(fetched.bytes.iter().all(|b| *b == 0xAB));
    }

    #[tokio::test]
    async fn body_at_ceiling_is_accepted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/exact.jpg");
                then.status(200)
                    .header("Content-Type", "image/jpeg")
                    .body(vec![7u8; 1024]);
            })
            .await;

        let fetched = fetcher_for(&server, 1024)
            .fetch(&server.url("/exact.jpg"))
            .await
            .unwrap();
        assert_eq!(fetched.bytes.len(), 1024);
    }

    #[tokio::test]
    async fn unreachable_origin_is_fetch_error() {
        let config = ScalerConfig::default();
        let fetcher = HttpFetcher::new(&config).unwrap();
        // Port 9 (discard) on localhost is closed in test environments.
        let err = fetcher.fetch("http://127.0.0.1:9/a.jpg").await.unwrap_err();
        assert!(matches!(err, ScalerError::Fetch { .. }));
        assert_eq!(err.status_code(), 502);
    }
}

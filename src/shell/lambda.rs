//! Stateless invocation adapter.
//!
//! Maps the API Gateway / function URL event shape onto [`Scaler::handle`]
//! and back. The envelope body is a string, so binary payloads travel as
//! base64 with `isBase64Encoded` set; SVG and error text travel verbatim.
//!
//! These types only depend on serde. The `lambda` binary wires them to
//! `lambda_runtime`.

use crate::fetch::SourceFetcher;
use crate::imaging::{EncodingHint, ImageBackend, RequestParams};
use crate::service::{ScaleResponse, Scaler};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaRequest {
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// `null` when the request has no query string.
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
}

impl LambdaRequest {
    /// `rawPath` (function URLs, HTTP API v2), then `path` (REST API v1).
    pub fn asset_path(&self) -> &str {
        self.raw_path
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or_default()
    }

    pub fn params(&self) -> RequestParams {
        RequestParams::from_query(|key| {
            self.query_string_parameters
                .as_ref()
                .and_then(|query| query.get(key))
                .map(String::as_str)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

pub fn to_lambda_response(response: ScaleResponse) -> LambdaResponse {
    let mut headers = HashMap::new();
    if let Some(content_type) = response.content_type {
        headers.insert("Content-Type".to_string(), content_type.to_string());
    }

    let (body, is_base64_encoded) = match response.encoding {
        EncodingHint::Raw => (STANDARD.encode(&response.body), true),
        EncodingHint::Text => (String::from_utf8_lossy(&response.body).into_owned(), false),
    };

    LambdaResponse {
        status_code: response.status,
        headers,
        body,
        is_base64_encoded,
    }
}

/// Handle one invocation.
pub async fn handle_event<F, B>(scaler: &Scaler<F, B>, request: LambdaRequest) -> LambdaResponse
where
    F: SourceFetcher,
    B: ImageBackend + 'static,
{
    let response = scaler.handle(request.asset_path(), request.params()).await;
    to_lambda_response(response)
}

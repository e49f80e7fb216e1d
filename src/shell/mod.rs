//! Deployment shells around [`Scaler`](crate::service::Scaler).
//!
//! Both adapters do nothing but translate: caller input into a path and
//! [`RequestParams`](crate::imaging::RequestParams), and a
//! [`ScaleResponse`](crate::service::ScaleResponse) back into the host's
//! response shape.
//!
//! | Shell | Host | Binary payloads |
//! |---|---|---|
//! | [`server`] | axum on tokio | written as bytes |
//! | [`lambda`] | `lambda_runtime` event loop | base64 + `isBase64Encoded` |

pub mod lambda;
pub mod server;

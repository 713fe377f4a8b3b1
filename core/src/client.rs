//! Authenticated request plumbing shared by both capture services.
//!
//! # Design
//! `BaseClient` holds the transport, access token and versioned base path,
//! all fixed at construction. It stamps `x-access-token` on every request it
//! builds and hands requests to the transport unmodified. There are no
//! retries: a transport failure is the caller's to handle.

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

pub struct BaseClient<T> {
    transport: T,
    access_token: String,
    base_path: String,
}

impl<T> std::fmt::Debug for BaseClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseClient")
            .field("access_token", &"<redacted>")
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BaseClient<T> {
    pub fn new(transport: T, access_token: &str, base_path: &str) -> Self {
        Self {
            transport,
            access_token: access_token.to_string(),
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a request against `path`, relative to the base path, with the
    /// access token header attached.
    pub fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}/{}", self.base_path, path.trim_start_matches('/')),
            headers: vec![(ACCESS_TOKEN_HEADER.to_string(), self.access_token.clone())],
            body: None,
        }
    }

    pub fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "dispatching request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, bytes = response.body.len(), "response received");
        Ok(response)
    }
}

//! The seam between request building and the network.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};

use crate::error::Result;

/// The engine's default listener speaks plain HTTP
pub const HTTP_SCHEME: &str = "http";

/// A fully built request, ready to be written to the wire
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub host: String,
    /// Sent verbatim as the request-target; never normalized or re-encoded
    pub target: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl TransportRequest {
    pub fn new(method: Method, host: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            target: target.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Attach a UTF-8 JSON body
    pub fn with_json_body(mut self, body: impl Into<Bytes>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body.into());
        self
    }

    pub fn content_length(&self) -> usize {
        self.body.as_ref().map_or(0, |body| body.len())
    }

    pub fn scheme(&self) -> &'static str {
        HTTP_SCHEME
    }

    /// Display form, for logs
    pub fn url(&self) -> String {
        format!("{}://{}{}", self.scheme(), self.host, self.target)
    }
}

/// A response whose body has been read to the end
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Lossy text view of the body, for error messages
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and returns the complete response.
///
/// Implementations must release the connection before returning, on success
/// and on every error path. Failures to connect or read surface as
/// `Error::Transport`; a non-2xx status is a normal `Ok` response here and is
/// judged by the decoder.
pub trait Transport: Send + Sync {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse> {
        (**self).send(request)
    }
}

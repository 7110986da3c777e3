//! Transport envelope types handed to the external HTTP collaborator.
//!
//! The crate never performs network calls itself; it prepares [`Request`]
//! values and leaves delivery, retries and timeouts to the integration.

use error_stack::{IntoReport, ResultExt};
use masking::{Mask, Maskable, Secret};
use serde::Serialize;

use crate::errors::{CustomResult, ParsingError};

/// Header names used on gateway calls.
pub mod headers {
    /// Authorization header.
    pub const AUTHORIZATION: &str = "Authorization";
    /// Content type header.
    pub const CONTENT_TYPE: &str = "Content-Type";
}

/// HTTP methods the gateway endpoints accept.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    /// HTTP GET.
    Get,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP DELETE.
    Delete,
}

/// Body content attached to an outbound request.
///
/// Payloads are wrapped in [`Secret`] so a logged envelope never exposes
/// request bodies, which may carry customer data.
#[derive(Clone, Debug)]
pub enum RequestContent {
    /// JSON payload.
    Json(Secret<serde_json::Value>),
    /// URL-encoded form payload.
    FormUrlEncoded(Secret<String>),
}

impl RequestContent {
    /// Encodes `body` as a JSON payload.
    pub fn json<T: Serialize>(body: &T) -> CustomResult<Self, ParsingError> {
        serde_json::to_value(body)
            .into_report()
            .change_context(ParsingError)
            .map(|value| Self::Json(Secret::new(value)))
    }
}

/// A fully prepared call for the transport collaborator to deliver.
#[derive(Clone, Debug)]
pub struct Request {
    /// Absolute request URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Header pairs; secret values stay masked until delivery.
    pub headers: Vec<(String, Maskable<String>)>,
    /// Optional body payload.
    pub body: Option<RequestContent>,
}

impl Request {
    /// Creates an empty request for `method` and `url`.
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Attaches a header.
    pub fn add_header(&mut self, header: &str, value: Maskable<String>) {
        self.headers.push((header.into(), value));
    }

    /// Attaches a body payload.
    pub fn set_body(&mut self, body: RequestContent) {
        self.body = Some(body);
    }
}

/// Fluent constructor for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    url: String,
    method: Method,
    headers: Vec<(String, Maskable<String>)>,
    body: Option<RequestContent>,
}

impl RequestBuilder {
    /// Starts a new builder with GET and an empty URL.
    pub fn new() -> Self {
        Self {
            url: String::new(),
            method: Method::Get,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sets the absolute URL.
    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    /// Sets the method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a plain header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a header whose value must stay masked in logs.
    pub fn header_masked(mut self, name: &str, value: Secret<String>) -> Self {
        self.headers.push((name.into(), value.into_masked()));
        self
    }

    /// Attaches the body payload.
    pub fn set_body(mut self, body: RequestContent) -> Self {
        self.body = Some(body);
        self
    }

    /// Finalizes the request.
    pub fn build(self) -> Request {
        Request {
            url: self.url,
            method: self.method,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

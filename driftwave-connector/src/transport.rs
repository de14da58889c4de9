//! Seam between the connector core and the HTTP collaborator.
//!
//! The batch runner only ever sees [`Transport`]; production code wires in
//! [`ApiTransport`], which injects the credential header on top of the
//! request description built by the operations. Tests substitute a stub.

use async_trait::async_trait;
use driftwave_http::{HttpClient, HttpError, RequestOpts, api_key_header};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::borrow::Cow;

/// Default upstream endpoint; overridable for self-hosted or test targets.
pub const API_BASE: &str = "https://api.driftwave.com";

/// Fixed identifying header value attached to every outbound call.
pub const CONNECTOR_USER_AGENT: &str = concat!("driftwave-connector/", env!("CARGO_PKG_VERSION"));

/// Credential header injected by the transport, never by the builders.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Headers every built request carries, regardless of operation.
pub const IDENTIFYING_HEADERS: &[(&str, &str)] = &[
    ("user-agent", CONNECTOR_USER_AGENT),
    ("accept", "application/json"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Fully-formed outbound request description produced by a request
/// builder: everything the transport needs except the credential.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub path: &'static str,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
    pub headers: &'static [(&'static str, &'static str)],
}

impl OutboundRequest {
    pub fn get(path: &'static str, query: Vec<(&'static str, String)>) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            query,
            body: None,
            headers: IDENTIFYING_HEADERS,
        }
    }

    pub fn post(path: &'static str, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
            query: Vec::new(),
            body: Some(body),
            headers: IDENTIFYING_HEADERS,
        }
    }
}

/// Executes one outbound request and returns the raw JSON payload.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &OutboundRequest) -> Result<Value, HttpError>;
}

/// Production transport: one HTTP call per request against the Driftwave
/// API, with the API key injected as `x-api-key`.
#[derive(Clone)]
pub struct ApiTransport {
    http: HttpClient,
    auth: HeaderValue,
}

impl ApiTransport {
    pub fn new(api_key: &str) -> Result<Self, HttpError> {
        Self::with_base(API_BASE, api_key)
    }

    pub fn with_base(base: &str, api_key: &str) -> Result<Self, HttpError> {
        Ok(Self {
            http: HttpClient::new(base)?,
            auth: api_key_header(api_key)?,
        })
    }

    /// Override the HTTP client's default per-request timeout.
    pub fn with_timeout(mut self, dur: std::time::Duration) -> Self {
        self.http = self.http.with_timeout(dur);
        self
    }

    fn headers_for(&self, request: &OutboundRequest) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, self.auth.clone());
        for (name, value) in request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpError::Build(e.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| HttpError::Build(e.to_string()))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for ApiTransport {
    async fn execute(&self, request: &OutboundRequest) -> Result<Value, HttpError> {
        let headers = self.headers_for(request)?;
        let query: Vec<(&str, Cow<'_, str>)> = request
            .query
            .iter()
            .map(|(k, v)| (*k, Cow::from(v.as_str())))
            .collect();
        let opts = RequestOpts {
            headers: Some(headers),
            query: if query.is_empty() { None } else { Some(query) },
            ..Default::default()
        };
        match request.method {
            HttpMethod::Get => self.http.get_json(request.path, opts).await,
            HttpMethod::Post => {
                let body = request.body.as_ref().unwrap_or(&Value::Null);
                self.http.post_json(request.path, body, opts).await
            }
        }
    }
}

//! Minimal HTTP client shared by the Driftwave connector crates.
//!
//! - Request options: headers, query params, timeout
//! - Redacts credential headers and query params before anything is logged
//! - Exactly one attempt per call: failed items are reported upstream by
//!   the batch runner, never retried here
//!
//! Example (no_run):
//! ```rust
//! # async fn demo() -> Result<(), driftwave_http::HttpError> {
//! let client = driftwave_http::HttpClient::new("https://api.example.com")?;
//! let got: serde_json::Value = client
//!     .get_json("v1/items", driftwave_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Security: API keys are sanitized with [`api_key_header`] before they
//! become header values, and logs only ever see `<redacted>` in their place.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

// ==============================
// Request options
// ==============================

/// Per-request tuning knobs for the HTTP client.
///
/// ```
/// use driftwave_http::RequestOpts;
/// use std::borrow::Cow;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     query: Some(vec![("q", Cow::Borrowed("term"))]),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>, // e.g. [("query", "term".into())]
}

// ==============================
// Client
// ==============================

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// ```no_run
    /// use driftwave_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com")?;
    /// assert_eq!(client.default_timeout, Duration::from_secs(15));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(15),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    /// GET JSON with per-request options (headers/query/timeout).
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        self.request_json_internal::<(), T>(Method::GET, path, None, opts)
            .await
    }

    /// POST JSON with per-request options (headers/query/timeout).
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json_internal(Method::POST, path, Some(body), opts)
            .await
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn request_json_internal<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))?;

        let mut rb = self.inner.request(method.clone(), url.clone());

        let timeout = opts.timeout.unwrap_or(self.default_timeout);
        rb = rb.timeout(timeout);

        if let Some(q) = &opts.query {
            let pairs: Vec<(&str, &str)> = q.iter().map(|(k, v)| (*k, v.as_ref())).collect();
            rb = rb.query(&pairs);
        }

        if let Some(b) = body {
            let bytes = serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes);
        }

        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }

        // ----- Safe request logging (pre-send) -----
        let redacted_q = redact_query_pairs(opts.query.as_deref());
        let redacted_h = opts.headers.as_ref().map(redact_headers).unwrap_or_default();

        tracing::debug!(
            method=%method,
            host_path=%format!("{}{}", url.domain().unwrap_or("-"), url.path()),
            query=?redacted_q,
            headers=?redacted_h,
            timeout_ms=timeout.as_millis() as u64,
            has_body=%body.is_some(),
            "http.request.start"
        );

        // ----- Send (single attempt) -----
        let t0 = std::time::Instant::now();
        let resp = match rb.send().await {
            Ok(resp) => resp,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(message=%message, "http.network_error.send");
                return Err(HttpError::Network(message));
            }
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = match resp.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(message=%message, "http.network_error.body");
                return Err(HttpError::Network(message));
            }
        };
        let dur_ms = t0.elapsed().as_millis() as u64;

        let request_id = headers
            .get("x-request-id")
            .or_else(|| headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%request_id,
            "http.response"
        );

        let snippet = snip_body(&bytes);
        tracing::trace!(body_snippet=%snippet, "http.response.body_snippet");

        if status.is_success() {
            return serde_json::from_slice::<T>(&bytes).map_err(|e| {
                tracing::warn!(
                    serde_line=%e.line(),
                    serde_col=%e.column(),
                    serde_err=%e.to_string(),
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = extract_error_message(&bytes);
        tracing::warn!(
            %status,
            message=%message,
            x_request_id=%request_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status,
            message,
            request_id: request_id.to_string(),
        })
    }
}

// ==============================
// Helpers
// ==============================

const SECRET_QUERY_KEYS: &[&str] = &[
    "access_token",
    "authorization",
    "auth",
    "key",
    "api_key",
    "token",
    "secret",
    "client_secret",
    "bearer",
];

fn is_secret_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "authorization" || lower == "x-api-key" || lower.contains("token")
}

fn redact_query_pairs(query: Option<&[(&str, Cow<'_, str>)]>) -> Vec<(String, String)> {
    query
        .map(|q| {
            q.iter()
                .map(|(k, v)| {
                    let is_secret = SECRET_QUERY_KEYS.contains(&k.to_ascii_lowercase().as_str());
                    (
                        (*k).to_string(),
                        if is_secret {
                            "<redacted>".to_string()
                        } else {
                            v.as_ref().to_string()
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Redact credential headers for logging.
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(k.as_str()) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

/// Best-effort extraction of a human message from an upstream error body.
///
/// Providers disagree on the envelope; we accept the common shapes
/// `{"error":{"message":...}}`, `{"message":...}`, `{"detail":...}` and
/// `{"error":"..."}` before falling back to a body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct Nested {
        error: NestedDetail,
    }
    #[derive(serde::Deserialize)]
    struct NestedDetail {
        message: String,
    }

    #[derive(serde::Deserialize)]
    struct Flat {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    if let Ok(env) = serde_json::from_slice::<Nested>(body) {
        return env.error.message;
    }
    if let Ok(m) = serde_json::from_slice::<Flat>(body) {
        if !m.message.is_empty() {
            return m.message;
        }
        if !m.detail.is_empty() {
            return m.detail;
        }
        if !m.error.is_empty() {
            return m.error;
        }
    }
    snip_body(body)
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).to_string();
    if snip.len() > 500 {
        snip.truncate(500);
        snip.push_str("...");
    }
    snip
}

/// Sanitize a raw API key into an `X-API-Key` header value.
///
/// Keys pasted from dashboards routinely pick up quotes, spaces, or a stray
/// newline; those would make the header invalid or, worse, silently change
/// the credential. Strip them and reject anything non-ASCII.
///
/// ```
/// let value = driftwave_http::api_key_header(" \"dw-123\"\n ").unwrap();
/// assert_eq!(value.to_str().unwrap(), "dw-123");
/// ```
pub fn api_key_header(raw: &str) -> Result<HeaderValue, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    HeaderValue::from_str(&s).map_err(|e| HttpError::Build(format!("invalid API key header: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_stripped_of_quotes_and_whitespace() {
        let v = api_key_header("  'dw-secret-key'\n").unwrap();
        assert_eq!(v.to_str().unwrap(), "dw-secret-key");
    }

    #[test]
    fn api_key_rejects_empty_and_non_ascii() {
        assert!(matches!(api_key_header("   "), Err(HttpError::Build(_))));
        assert!(matches!(
            api_key_header("clé-secrète"),
            Err(HttpError::Build(_))
        ));
    }

    #[test]
    fn error_message_prefers_structured_shapes() {
        let nested = br#"{"error":{"message":"quota exhausted"}}"#;
        assert_eq!(extract_error_message(nested), "quota exhausted");

        let flat = br#"{"detail":"missing api key"}"#;
        assert_eq!(extract_error_message(flat), "missing api key");

        let opaque = b"upstream fell over";
        assert_eq!(extract_error_message(opaque), "upstream fell over");
    }

    #[test]
    fn secret_query_params_and_headers_are_redacted() {
        let q: Vec<(&str, Cow<'_, str>)> = vec![
            ("query", Cow::Borrowed("rust")),
            ("api_key", Cow::Borrowed("dw-secret")),
        ];
        let redacted = redact_query_pairs(Some(&q));
        assert_eq!(redacted[0].1, "rust");
        assert_eq!(redacted[1].1, "<redacted>");

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("dw-secret"));
        headers.insert("accept", HeaderValue::from_static("application/json"));
        let redacted = redact_headers(&headers);
        assert!(
            redacted
                .iter()
                .any(|(k, v)| k == "x-api-key" && v == "<redacted>")
        );
        assert!(
            redacted
                .iter()
                .any(|(k, v)| k == "accept" && v == "application/json")
        );
    }

    #[test]
    fn long_bodies_are_snipped() {
        let body = vec![b'x'; 600];
        let snip = snip_body(&body);
        assert_eq!(snip.len(), 503);
        assert!(snip.ends_with("..."));
    }
}

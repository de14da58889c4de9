//! Contents operation: URL-list parsing, request body, response model.
//!
//! The host hands us one string of comma-separated URLs. Splitting and
//! cleanup happen here at request-build time; an input that empties out
//! after cleanup is a domain failure, not a schema failure.

use crate::schema::{Checker, Violation, ViolationKind, Violations, as_params_object};
use crate::transport::OutboundRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

pub const CONTENTS_PATH: &str = "v1/contents";

/// Domain-rule failure raised while shaping a request, after the options
/// schema has already accepted the item.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct InvalidInput(pub String);

// ==============================
// Options & input
// ==============================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Markdown,
    Html,
    Metadata,
}

impl ContentFormat {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "markdown" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "metadata" => Some(Self::Metadata),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Metadata => "metadata",
        }
    }
}

/// Both fields independently optional. `formats` preserves caller order;
/// `crawl_timeout` is seconds, 1–60 inclusive (zero is out of range, so
/// present-vs-absent is the only omission rule the builder needs).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentsOptions {
    pub formats: Option<Vec<ContentFormat>>,
    pub crawl_timeout: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ContentsInput {
    /// Raw comma-separated URL string, exactly as the host collected it.
    pub urls: String,
    pub options: ContentsOptions,
}

impl ContentsInput {
    /// Validate raw host parameters, collecting every violation in one
    /// pass. Unknown keys are ignored (host-declared form input).
    pub fn from_value(params: &Value) -> Result<Self, Violations> {
        let obj = as_params_object(params)?;
        let mut c = Checker::new();

        let urls = c.required_str(&obj, "urls");
        let options = ContentsOptions {
            formats: c.optional_token_list(
                &obj,
                "formats",
                ContentFormat::parse,
                "markdown, html, metadata",
            ),
            crawl_timeout: c.optional_int(&obj, "crawl_timeout", 1, 60),
        };

        c.finish()?;
        match urls {
            Some(urls) => Ok(Self { urls, options }),
            None => Err(Violations::single(Violation::new(
                &["urls"],
                ViolationKind::Missing,
                "is required",
            ))),
        }
    }
}

/// Split a comma-separated URL string: trim each piece, drop empties.
pub fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

// ==============================
// Request builder
// ==============================

#[derive(Debug, Clone, Serialize)]
struct ContentsRequestBody {
    urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formats: Option<Vec<ContentFormat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    crawl_timeout: Option<i64>,
}

/// Shape the POST request. `formats` goes on the wire only when the
/// caller supplied a non-empty set; `crawl_timeout` only when present.
pub fn build_request(input: &ContentsInput) -> Result<OutboundRequest, InvalidInput> {
    let urls = split_urls(&input.urls);
    if urls.is_empty() {
        return Err(InvalidInput("at least one URL is required".into()));
    }

    let formats = input
        .options
        .formats
        .as_ref()
        .filter(|f| !f.is_empty())
        .cloned();
    let body = ContentsRequestBody {
        urls,
        formats,
        crawl_timeout: input.options.crawl_timeout,
    };
    // ContentsRequestBody is a plain struct of strings and ints; encoding
    // it cannot fail.
    let body = serde_json::to_value(&body)
        .map_err(|e| InvalidInput(format!("could not encode request body: {e}")))?;
    Ok(OutboundRequest::post(CONTENTS_PATH, body))
}

// ==============================
// Response model
// ==============================

/// One extraction result per requested URL, open to upstream additions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentsResult {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Validate the upstream payload (an ordered list of per-URL results),
/// reporting every shape problem at once.
pub fn results_from_value(value: Value) -> Result<Vec<ContentsResult>, Violations> {
    let mut c = Checker::new();
    check_shape(&value, &mut c);
    c.finish()?;

    serde_json::from_value(value).map_err(|e| {
        Violations::single(Violation::new(
            &[],
            ViolationKind::WrongType,
            format!("response shape mismatch: {e}"),
        ))
    })
}

fn check_shape(value: &Value, c: &mut Checker) {
    let Some(items) = value.as_array() else {
        c.error(&[], ViolationKind::WrongType, "must be a list");
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let idx = i.to_string();
        let Some(entry) = item.as_object() else {
            c.error(&[idx.as_str()], ViolationKind::WrongType, "must be an object");
            continue;
        };
        match entry.get("url") {
            None => c.error(&[idx.as_str(), "url"], ViolationKind::Missing, "is required"),
            Some(Value::String(s)) => {
                if Url::parse(s).is_err() {
                    c.error(
                        &[idx.as_str(), "url"],
                        ViolationKind::InvalidValue,
                        "must be a syntactically valid URL",
                    );
                }
            }
            Some(_) => c.error(
                &[idx.as_str(), "url"],
                ViolationKind::WrongType,
                "must be a string",
            ),
        }
        for field in ["markdown", "html"] {
            if let Some(v) = entry.get(field) {
                if !v.is_string() {
                    c.error(
                        &[idx.as_str(), field],
                        ViolationKind::WrongType,
                        "must be a string",
                    );
                }
            }
        }
        if let Some(v) = entry.get("metadata") {
            if !v.is_object() {
                c.error(
                    &[idx.as_str(), "metadata"],
                    ViolationKind::WrongType,
                    "must be an object",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpMethod;
    use serde_json::json;

    #[test]
    fn urls_are_split_trimmed_and_cleared_of_empties() {
        assert_eq!(
            split_urls("https://a.com, https://b.com ,,  "),
            vec!["https://a.com".to_string(), "https://b.com".to_string()]
        );
        assert!(split_urls("").is_empty());
        assert!(split_urls(",").is_empty());
        assert!(split_urls(" , ,  ,").is_empty());
    }

    #[test]
    fn empty_url_input_fails_as_a_domain_rule_not_a_schema_error() {
        for raw in ["", ",", "  ,  "] {
            let input = ContentsInput::from_value(&json!({"urls": raw})).unwrap();
            let err = build_request(&input).unwrap_err();
            assert_eq!(err.to_string(), "at least one URL is required");
        }
    }

    #[test]
    fn body_carries_urls_and_only_supplied_options() {
        let input = ContentsInput::from_value(&json!({"urls": "https://a.com,https://b.com"}))
            .unwrap();
        let req = build_request(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, CONTENTS_PATH);
        let body = req.body.unwrap();
        assert_eq!(body["urls"], json!(["https://a.com", "https://b.com"]));
        assert!(body.get("formats").is_none());
        assert!(body.get("crawl_timeout").is_none());
    }

    #[test]
    fn formats_keep_caller_order_and_empty_set_is_omitted() {
        let input = ContentsInput::from_value(&json!({
            "urls": "https://a.com",
            "formats": ["metadata", "markdown"],
            "crawl_timeout": 30,
        }))
        .unwrap();
        let req = build_request(&input).unwrap();
        let body = req.body.unwrap();
        assert_eq!(body["formats"], json!(["metadata", "markdown"]));
        assert_eq!(body["crawl_timeout"], json!(30));

        let input =
            ContentsInput::from_value(&json!({"urls": "https://a.com", "formats": []})).unwrap();
        let body = build_request(&input).unwrap().body.unwrap();
        assert!(body.get("formats").is_none());
    }

    #[test]
    fn options_outside_their_declared_shapes_are_all_reported() {
        let err = ContentsInput::from_value(&json!({
            "urls": "https://a.com",
            "formats": ["markdown", "pdf"],
            "crawl_timeout": 0,
        }))
        .unwrap_err();
        assert_eq!(err.len(), 2);
        let rendered = err.to_string();
        assert!(rendered.contains("formats.1: must be one of markdown, html, metadata"));
        assert!(rendered.contains("crawl_timeout: must be at least 1"));

        let err = ContentsInput::from_value(&json!({"urls": "https://a.com", "crawl_timeout": 61}))
            .unwrap_err();
        assert_eq!(err.iter().next().unwrap().kind, ViolationKind::TooBig);
    }

    #[test]
    fn minimal_result_with_unknown_fields_passes_through() {
        let payload = json!([
            {"url": "https://a.com", "markdown": "# A", "fetch_ms": 114},
            {"url": "https://b.com", "html": "<p>B</p>", "metadata": {"lang": "en"}},
        ]);
        let results = results_from_value(payload).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].extra.get("fetch_ms"), Some(&json!(114)));
        assert_eq!(results[1].metadata.as_ref().unwrap()["lang"], json!("en"));

        let back = serde_json::to_value(&results).unwrap();
        assert_eq!(back[0]["fetch_ms"], json!(114));
        assert!(back[0].get("html").is_none());
    }

    #[test]
    fn malformed_urls_and_shapes_are_all_reported() {
        let payload = json!([
            {"url": "not a url"},
            {"markdown": "# no url"},
            "just a string",
        ]);
        let err = results_from_value(payload).unwrap_err();
        let paths: Vec<_> = err.iter().map(|v| v.dotted_path()).collect();
        assert_eq!(paths, vec!["0.url", "1.url", "2"]);
        let kinds: Vec<_> = err.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::InvalidValue,
                ViolationKind::Missing,
                ViolationKind::WrongType
            ]
        );

        let err = results_from_value(json!({"results": []})).unwrap_err();
        assert_eq!(err.to_string(), "1. root: must be a list");
    }
}

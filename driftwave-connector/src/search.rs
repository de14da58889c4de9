//! Search operation: options schema, request shaping, response model.
//!
//! The query string is opaque: callers may embed provider operators
//! (`site:`, quoted phrases, booleans) and we pass it through untouched.
//! Option fields are strictly present-or-absent: an absent field never
//! reaches the wire, so upstream defaults apply; a present zero does.

use crate::schema::{Checker, Violation, ViolationKind, Violations, as_params_object};
use crate::transport::OutboundRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SEARCH_PATH: &str = "v1/search";

// ==============================
// Option enums
// ==============================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Day,
    Week,
    Month,
    Year,
}

impl Freshness {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

/// Which result vertical gets live page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivecrawlScope {
    Web,
    News,
    All,
}

impl LivecrawlScope {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "web" => Some(Self::Web),
            "news" => Some(Self::News),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Web => "web",
            Self::News => "news",
            Self::All => "all",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivecrawlFormat {
    Html,
    Markdown,
}

impl LivecrawlFormat {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "html" => Some(Self::Html),
            "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeSearch {
    Off,
    Moderate,
    Strict,
}

impl SafeSearch {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "off" => Some(Self::Off),
            "moderate" => Some(Self::Moderate),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Moderate => "moderate",
            Self::Strict => "strict",
        }
    }
}

// ==============================
// Options & input
// ==============================

/// All fields independently optional; no cross-field rules here. The
/// pairing of livecrawl format with livecrawl scope is a display-layer
/// concern declared in the parameter catalog, not enforced in validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOptions {
    pub count: Option<i64>,
    pub country: Option<String>,
    pub freshness: Option<Freshness>,
    pub language: Option<String>,
    pub livecrawl: Option<LivecrawlScope>,
    pub livecrawl_formats: Option<LivecrawlFormat>,
    pub offset: Option<i64>,
    pub safesearch: Option<SafeSearch>,
}

#[derive(Debug, Clone)]
pub struct SearchInput {
    pub query: String,
    pub options: SearchOptions,
}

impl SearchInput {
    /// Validate raw host parameters into a typed input, collecting every
    /// violation in one pass. Unknown keys are ignored: option input comes
    /// from the host's own declared form.
    pub fn from_value(params: &Value) -> Result<Self, Violations> {
        let obj = as_params_object(params)?;
        let mut c = Checker::new();

        let query = c.required_str(&obj, "query");

        let options = SearchOptions {
            count: c.optional_int(&obj, "count", 1, 100),
            country: c.optional_str(&obj, "country"),
            freshness: c.optional_token(
                &obj,
                "freshness",
                Freshness::parse,
                "day, week, month, year",
            ),
            language: c.optional_str(&obj, "language"),
            livecrawl: c.optional_token(&obj, "livecrawl", LivecrawlScope::parse, "web, news, all"),
            livecrawl_formats: c.optional_token(
                &obj,
                "livecrawl_formats",
                LivecrawlFormat::parse,
                "html, markdown",
            ),
            offset: c.optional_int(&obj, "offset", 0, 9),
            safesearch: c.optional_token(
                &obj,
                "safesearch",
                SafeSearch::parse,
                "off, moderate, strict",
            ),
        };

        c.finish()?;
        // finish() returned Ok, so every recorded field parsed; query in
        // particular is present.
        match query {
            Some(query) => Ok(Self { query, options }),
            None => Err(Violations::single(Violation::new(
                &["query"],
                ViolationKind::Missing,
                "is required",
            ))),
        }
    }
}

// ==============================
// Request builder
// ==============================

/// Shape the GET request: `query` always, each present option under its
/// API name, absent options omitted entirely.
pub fn build_request(input: &SearchInput) -> OutboundRequest {
    let opts = &input.options;
    let mut query: Vec<(&'static str, String)> = vec![("query", input.query.clone())];

    if let Some(v) = opts.count {
        query.push(("count", v.to_string()));
    }
    if let Some(v) = &opts.country {
        query.push(("country", v.clone()));
    }
    if let Some(v) = opts.freshness {
        query.push(("freshness", v.as_str().to_string()));
    }
    if let Some(v) = &opts.language {
        query.push(("language", v.clone()));
    }
    if let Some(v) = opts.livecrawl {
        query.push(("livecrawl", v.as_str().to_string()));
    }
    if let Some(v) = opts.livecrawl_formats {
        query.push(("livecrawl_formats", v.as_str().to_string()));
    }
    if let Some(v) = opts.offset {
        query.push(("offset", v.to_string()));
    }
    if let Some(v) = opts.safesearch {
        query.push(("safesearch", v.as_str().to_string()));
    }

    OutboundRequest::get(SEARCH_PATH, query)
}

// ==============================
// Response model
// ==============================

/// Open response shape: the declared subset is validated strictly, and
/// everything else the upstream adds rides along in `extra` unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: SearchResults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<Vec<WebResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news: Option<Vec<NewsResult>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebResult {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResult {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResponse {
    /// Validate an upstream payload, reporting every shape problem at
    /// once, then materialise the typed (still open) response.
    pub fn from_value(value: Value) -> Result<Self, Violations> {
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
}

fn check_shape(value: &Value, c: &mut Checker) {
    let Some(obj) = value.as_object() else {
        c.error(&[], ViolationKind::WrongType, "must be an object");
        return;
    };

    let Some(results) = obj.get("results") else {
        c.error(&["results"], ViolationKind::Missing, "is required");
        return;
    };
    let Some(results) = results.as_object() else {
        c.error(&["results"], ViolationKind::WrongType, "must be an object");
        return;
    };

    check_result_list(results, "web", c);
    check_result_list(results, "news", c);

    if let Some(metadata) = obj.get("metadata") {
        if !metadata.is_object() {
            c.error(&["metadata"], ViolationKind::WrongType, "must be an object");
        }
    }
}

fn check_result_list(results: &Map<String, Value>, vertical: &str, c: &mut Checker) {
    let Some(list) = results.get(vertical) else {
        return;
    };
    let Some(items) = list.as_array() else {
        c.error(
            &["results", vertical],
            ViolationKind::WrongType,
            "must be a list",
        );
        return;
    };
    for (i, item) in items.iter().enumerate() {
        let idx = i.to_string();
        let Some(entry) = item.as_object() else {
            c.error(
                &["results", vertical, idx.as_str()],
                ViolationKind::WrongType,
                "must be an object",
            );
            continue;
        };
        for field in ["url", "title", "description"] {
            match entry.get(field) {
                None => c.error(
                    &["results", vertical, idx.as_str(), field],
                    ViolationKind::Missing,
                    "is required",
                ),
                Some(Value::String(_)) => {}
                Some(_) => c.error(
                    &["results", vertical, idx.as_str(), field],
                    ViolationKind::WrongType,
                    "must be a string",
                ),
            }
        }
    }
}

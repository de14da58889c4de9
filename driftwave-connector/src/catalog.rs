//! Host-facing parameter catalog: what the workflow editor renders.
//!
//! Pure data. The validation and request logic never reads these tables;
//! they exist so the host can draw dropdowns, placeholders, and defaults.

use serde::Serialize;
use serde_json::Value;

use crate::runner::Operation;
use crate::transport::CONNECTOR_USER_AGENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Number,
    Options,
    MultiOptions,
}

/// One dropdown entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

/// One field of the configuration surface.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Inclusive bounds for number fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<(i64, i64)>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub choices: &'static [Choice],
    /// Display-layer conditioning: only show this field once the named
    /// field has a value. Not enforced by validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<&'static str>,
}

impl ParamSpec {
    fn new(name: &'static str, label: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            label,
            kind,
            required: false,
            description: None,
            placeholder: None,
            default: None,
            range: None,
            choices: &[],
            depends_on: None,
        }
    }
}

/// One operation as the host sees it.
#[derive(Debug, Clone, Serialize)]
pub struct OperationSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamSpec>,
}

/// The whole connector surface: identity plus both operations.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub version: &'static str,
    pub user_agent: &'static str,
    pub credential: &'static str,
    pub operations: Vec<OperationSpec>,
}

pub fn descriptor() -> ConnectorDescriptor {
    ConnectorDescriptor {
        name: "driftwave",
        label: "Driftwave",
        version: env!("CARGO_PKG_VERSION"),
        user_agent: CONNECTOR_USER_AGENT,
        credential: "driftwaveApi",
        operations: vec![
            OperationSpec {
                name: Operation::Search.as_str(),
                label: "Search",
                description: "Search the web and news with optional live page content",
                parameters: search_parameters(),
            },
            OperationSpec {
                name: Operation::Contents.as_str(),
                label: "Get Contents",
                description: "Extract page content from one or more URLs",
                parameters: contents_parameters(),
            },
        ],
    }
}

pub fn search_parameters() -> Vec<ParamSpec> {
    vec![
        ParamSpec {
            required: true,
            description: Some("Search terms; Driftwave operators like site: and quoted phrases pass through unchanged"),
            placeholder: Some("e.g. rust async runtime site:docs.rs"),
            ..ParamSpec::new("query", "Query", ParamKind::String)
        },
        ParamSpec {
            description: Some("Number of results to return"),
            default: Some(Value::from(10)),
            range: Some((1, 100)),
            ..ParamSpec::new("count", "Result Count", ParamKind::Number)
        },
        ParamSpec {
            description: Some("Country to prioritise results from"),
            choices: COUNTRIES,
            ..ParamSpec::new("country", "Country", ParamKind::Options)
        },
        ParamSpec {
            description: Some("Only return results first seen within this window"),
            choices: &[
                Choice { value: "day", label: "Past Day" },
                Choice { value: "week", label: "Past Week" },
                Choice { value: "month", label: "Past Month" },
                Choice { value: "year", label: "Past Year" },
            ],
            ..ParamSpec::new("freshness", "Freshness", ParamKind::Options)
        },
        ParamSpec {
            description: Some("Preferred language for results"),
            choices: LANGUAGES,
            ..ParamSpec::new("language", "Language", ParamKind::Options)
        },
        ParamSpec {
            description: Some("Fetch live page content for results in this vertical"),
            choices: &[
                Choice { value: "web", label: "Web Results" },
                Choice { value: "news", label: "News Results" },
                Choice { value: "all", label: "All Results" },
            ],
            ..ParamSpec::new("livecrawl", "Livecrawl", ParamKind::Options)
        },
        ParamSpec {
            description: Some("Format of live-crawled page content"),
            choices: &[
                Choice { value: "html", label: "HTML" },
                Choice { value: "markdown", label: "Markdown" },
            ],
            depends_on: Some("livecrawl"),
            ..ParamSpec::new("livecrawl_formats", "Livecrawl Format", ParamKind::Options)
        },
        ParamSpec {
            description: Some("Results page to fetch, starting at 0"),
            default: Some(Value::from(0)),
            range: Some((0, 9)),
            ..ParamSpec::new("offset", "Page Offset", ParamKind::Number)
        },
        ParamSpec {
            description: Some("Content moderation level"),
            default: Some(Value::from("moderate")),
            choices: &[
                Choice { value: "off", label: "Off" },
                Choice { value: "moderate", label: "Moderate" },
                Choice { value: "strict", label: "Strict" },
            ],
            ..ParamSpec::new("safesearch", "Safe Search", ParamKind::Options)
        },
    ]
}

pub fn contents_parameters() -> Vec<ParamSpec> {
    vec![
        ParamSpec {
            required: true,
            description: Some("One or more URLs, separated by commas"),
            placeholder: Some("https://example.com, https://example.org/post"),
            ..ParamSpec::new("urls", "URLs", ParamKind::String)
        },
        ParamSpec {
            description: Some("Content representations to extract, in order of preference"),
            choices: &[
                Choice { value: "markdown", label: "Markdown" },
                Choice { value: "html", label: "HTML" },
                Choice { value: "metadata", label: "Metadata" },
            ],
            ..ParamSpec::new("formats", "Formats", ParamKind::MultiOptions)
        },
        ParamSpec {
            description: Some("Seconds to wait for a page crawl before the API gives up"),
            range: Some((1, 60)),
            ..ParamSpec::new("crawl_timeout", "Crawl Timeout", ParamKind::Number)
        },
    ]
}

// Dropdown tables. Values are what the API accepts; labels are what the
// editor shows.

pub const COUNTRIES: &[Choice] = &[
    Choice { value: "AR", label: "Argentina" },
    Choice { value: "AU", label: "Australia" },
    Choice { value: "AT", label: "Austria" },
    Choice { value: "BE", label: "Belgium" },
    Choice { value: "BR", label: "Brazil" },
    Choice { value: "CA", label: "Canada" },
    Choice { value: "CL", label: "Chile" },
    Choice { value: "CN", label: "China" },
    Choice { value: "DK", label: "Denmark" },
    Choice { value: "FI", label: "Finland" },
    Choice { value: "FR", label: "France" },
    Choice { value: "DE", label: "Germany" },
    Choice { value: "HK", label: "Hong Kong" },
    Choice { value: "IN", label: "India" },
    Choice { value: "ID", label: "Indonesia" },
    Choice { value: "IT", label: "Italy" },
    Choice { value: "JP", label: "Japan" },
    Choice { value: "KR", label: "South Korea" },
    Choice { value: "MY", label: "Malaysia" },
    Choice { value: "MX", label: "Mexico" },
    Choice { value: "NL", label: "Netherlands" },
    Choice { value: "NZ", label: "New Zealand" },
    Choice { value: "NO", label: "Norway" },
    Choice { value: "PH", label: "Philippines" },
    Choice { value: "PL", label: "Poland" },
    Choice { value: "PT", label: "Portugal" },
    Choice { value: "RU", label: "Russia" },
    Choice { value: "SA", label: "Saudi Arabia" },
    Choice { value: "SG", label: "Singapore" },
    Choice { value: "ZA", label: "South Africa" },
    Choice { value: "ES", label: "Spain" },
    Choice { value: "SE", label: "Sweden" },
    Choice { value: "CH", label: "Switzerland" },
    Choice { value: "TW", label: "Taiwan" },
    Choice { value: "TH", label: "Thailand" },
    Choice { value: "TR", label: "Türkiye" },
    Choice { value: "GB", label: "United Kingdom" },
    Choice { value: "US", label: "United States" },
];

pub const LANGUAGES: &[Choice] = &[
    Choice { value: "ar", label: "Arabic" },
    Choice { value: "bn", label: "Bengali" },
    Choice { value: "zh", label: "Chinese" },
    Choice { value: "cs", label: "Czech" },
    Choice { value: "da", label: "Danish" },
    Choice { value: "nl", label: "Dutch" },
    Choice { value: "en", label: "English" },
    Choice { value: "fi", label: "Finnish" },
    Choice { value: "fr", label: "French" },
    Choice { value: "de", label: "German" },
    Choice { value: "el", label: "Greek" },
    Choice { value: "he", label: "Hebrew" },
    Choice { value: "hi", label: "Hindi" },
    Choice { value: "hu", label: "Hungarian" },
    Choice { value: "id", label: "Indonesian" },
    Choice { value: "it", label: "Italian" },
    Choice { value: "ja", label: "Japanese" },
    Choice { value: "ko", label: "Korean" },
    Choice { value: "ms", label: "Malay" },
    Choice { value: "no", label: "Norwegian" },
    Choice { value: "pl", label: "Polish" },
    Choice { value: "pt", label: "Portuguese" },
    Choice { value: "ro", label: "Romanian" },
    Choice { value: "ru", label: "Russian" },
    Choice { value: "es", label: "Spanish" },
    Choice { value: "sv", label: "Swedish" },
    Choice { value: "th", label: "Thai" },
    Choice { value: "tr", label: "Turkish" },
    Choice { value: "uk", label: "Ukrainian" },
    Choice { value: "vi", label: "Vietnamese" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn descriptor_lists_both_operations() {
        let d = descriptor();
        let names: Vec<_> = d.operations.iter().map(|op| op.name).collect();
        assert_eq!(names, vec!["search", "contents"]);
        assert!(d.user_agent.starts_with("driftwave-connector/"));
    }

    #[test]
    fn search_surface_matches_the_wire_parameters() {
        let params = search_parameters();
        let names: Vec<_> = params.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                "query",
                "count",
                "country",
                "freshness",
                "language",
                "livecrawl",
                "livecrawl_formats",
                "offset",
                "safesearch"
            ]
        );
        assert!(params.iter().filter(|p| p.required).count() == 1);

        let formats = params
            .iter()
            .find(|p| p.name == "livecrawl_formats")
            .unwrap();
        assert_eq!(formats.depends_on, Some("livecrawl"));
    }

    #[test]
    fn dropdown_values_are_unique() {
        for table in [COUNTRIES, LANGUAGES] {
            let mut seen = HashSet::new();
            assert!(table.iter().all(|c| seen.insert(c.value)));
        }
    }
}

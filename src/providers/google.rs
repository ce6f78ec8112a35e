use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{MAX_RESULTS, ProviderAccessKind, SearchError, SearchProvider};
use crate::config::{GoogleCredentials, HttpConfig};
use crate::data_models::SearchResult;

const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
// Only the fields we map; keeps the response payload minimal.
const CSE_FIELDS: &str = "items(title,link,snippet,pagemap/metatags)";
const NO_DESCRIPTION: &str = "No description available";

/// API-based provider over the Google Custom Search JSON API. Requires an
/// API key and a search engine id (`cx`); both come from configuration.
pub struct GoogleSearchProvider {
    client: Client,
    credentials: GoogleCredentials,
}

impl GoogleSearchProvider {
    pub fn new(credentials: GoogleCredentials, config: &HttpConfig) -> GoogleSearchProvider {
        let client = Client::builder()
            .timeout(config.search_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to build HTTP client");

        GoogleSearchProvider {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(CSE_ENDPOINT)
            .query(&[
                ("key", self.credentials.api_key.as_str()),
                ("cx", self.credentials.engine_id.as_str()),
                ("q", query),
                ("num", "5"),
                ("fields", CSE_FIELDS),
            ])
            .send()
            .await
            .map_err(SearchError::from_reqwest)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(SearchError::from_reqwest)?;

        if !(200..300).contains(&status) {
            return Err(classify_error_body(status, &body));
        }

        let parsed: CseResponse =
            serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;
        Ok(map_items(parsed))
    }

    fn name(&self) -> &'static str {
        "google"
    }
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    #[serde(default)]
    items: Vec<CseItem>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    #[serde(default)]
    title: String,
    link: String,
    snippet: Option<String>,
    pagemap: Option<CsePageMap>,
}

#[derive(Debug, Deserialize)]
struct CsePageMap {
    #[serde(default)]
    metatags: Vec<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct CseErrorBody {
    error: CseError,
}

#[derive(Debug, Deserialize)]
struct CseError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<CseErrorItem>,
}

#[derive(Debug, Deserialize)]
struct CseErrorItem {
    #[serde(default)]
    reason: String,
}

fn map_items(response: CseResponse) -> Vec<SearchResult> {
    let mut seen = std::collections::HashSet::new();
    response
        .items
        .into_iter()
        .filter(|item| seen.insert(item.link.clone()))
        .take(MAX_RESULTS)
        .map(|item| {
            // snippet may be absent; fall back to the page's own metadata
            let snippet = item
                .snippet
                .filter(|s| !s.trim().is_empty())
                .or_else(|| {
                    item.pagemap.as_ref().and_then(|p| {
                        p.metatags
                            .iter()
                            .find_map(|tags| tags.get("og:description").cloned())
                    })
                })
                .unwrap_or_else(|| NO_DESCRIPTION.to_string());
            SearchResult::new(item.title, item.link, snippet)
        })
        .collect()
}

/// Turn a non-2xx response into a classified access error. The provider
/// reports a structured `reason` for every failure; mapping it through a
/// closed set (with an explicit Unknown) replaces ad hoc inspection of
/// arbitrarily-shaped payloads.
fn classify_error_body(status: u16, body: &str) -> SearchError {
    let parsed: Option<CseErrorBody> = serde_json::from_str(body).ok();
    let (reason, message) = match parsed {
        Some(parsed) => {
            let reason = parsed
                .error
                .errors
                .into_iter()
                .next()
                .map(|e| e.reason)
                .unwrap_or_default();
            (reason, parsed.error.message)
        }
        None => (String::new(), body.chars().take(200).collect()),
    };

    SearchError::Access {
        kind: classify_reason(&reason, status),
        status,
        message,
    }
}

fn classify_reason(reason: &str, status: u16) -> ProviderAccessKind {
    match reason {
        "quotaExceeded" | "dailyLimitExceeded" | "rateLimitExceeded" | "userRateLimitExceeded" => {
            ProviderAccessKind::QuotaExceeded
        }
        "accessNotConfigured" => ProviderAccessKind::ApiNotEnabled,
        "billingNotEnabled" => ProviderAccessKind::BillingNotEnabled,
        "keyInvalid" => ProviderAccessKind::InvalidKey,
        "ipRefererBlocked" => ProviderAccessKind::RefererBlocked,
        _ if status == 429 => ProviderAccessKind::QuotaExceeded,
        _ => ProviderAccessKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_body(reason: &str, message: &str) -> String {
        format!(
            r#"{{"error":{{"code":403,"message":"{message}","errors":[{{"domain":"usageLimits","reason":"{reason}","message":"{message}"}}]}}}}"#
        )
    }

    #[test]
    fn classifies_known_reasons() {
        let cases = [
            ("dailyLimitExceeded", ProviderAccessKind::QuotaExceeded),
            ("rateLimitExceeded", ProviderAccessKind::QuotaExceeded),
            ("accessNotConfigured", ProviderAccessKind::ApiNotEnabled),
            ("billingNotEnabled", ProviderAccessKind::BillingNotEnabled),
            ("keyInvalid", ProviderAccessKind::InvalidKey),
            ("ipRefererBlocked", ProviderAccessKind::RefererBlocked),
            ("somethingNovel", ProviderAccessKind::Unknown),
        ];
        for (reason, expected) in cases {
            let err = classify_error_body(403, &error_body(reason, "denied"));
            match err {
                SearchError::Access { kind, status, .. } => {
                    assert_eq!(kind, expected, "reason {reason}");
                    assert_eq!(status, 403);
                }
                other => panic!("expected Access error, got {other:?}"),
            }
        }
    }

    #[test]
    fn diagnoses_are_distinguishable() {
        // Two 403s with different reasons must read differently, and the
        // not-enabled one must name the enablement action.
        let not_enabled = classify_error_body(403, &error_body("accessNotConfigured", "x"));
        let bad_key = classify_error_body(403, &error_body("keyInvalid", "x"));
        assert!(not_enabled.to_string().contains("enable it"));
        assert!(bad_key.to_string().contains("new key"));
        assert_ne!(not_enabled.to_string(), bad_key.to_string());
    }

    #[test]
    fn unparseable_error_body_is_unknown() {
        let err = classify_error_body(500, "<html>Server Error</html>");
        match err {
            SearchError::Access { kind, message, .. } => {
                assert_eq!(kind, ProviderAccessKind::Unknown);
                assert!(message.contains("Server Error"));
            }
            other => panic!("expected Access error, got {other:?}"),
        }
    }

    #[test]
    fn plain_429_counts_as_quota() {
        let err = classify_error_body(429, "{}");
        assert!(matches!(
            err,
            SearchError::Access {
                kind: ProviderAccessKind::QuotaExceeded,
                ..
            }
        ));
    }

    #[test]
    fn maps_items_with_snippet_fallbacks() {
        let body = r#"{"items":[
            {"title":"A","link":"https://a.example/","snippet":"plain snippet"},
            {"title":"B","link":"https://b.example/","pagemap":{"metatags":[{"og:description":"meta description"}]}},
            {"title":"C","link":"https://c.example/"}
        ]}"#;
        let parsed: CseResponse = serde_json::from_str(body).unwrap();
        let results = map_items(parsed);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].snippet, "plain snippet");
        assert_eq!(results[1].snippet, "meta description");
        assert_eq!(results[2].snippet, NO_DESCRIPTION);
    }

    #[test]
    fn maps_at_most_five_unique_items() {
        let mut items = Vec::new();
        for i in 0..7 {
            items.push(format!(
                r#"{{"title":"T{i}","link":"https://example.com/{}","snippet":"s"}}"#,
                i % 6
            ));
        }
        let body = format!(r#"{{"items":[{}]}}"#, items.join(","));
        let parsed: CseResponse = serde_json::from_str(&body).unwrap();
        let results = map_items(parsed);
        assert_eq!(results.len(), 5);
        let urls: std::collections::HashSet<_> = results.iter().map(|r| &r.url).collect();
        assert_eq!(urls.len(), 5);
    }
}

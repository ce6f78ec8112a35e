use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::debug;

use super::{MAX_RESULTS, SearchError, SearchProvider};
use crate::config::HttpConfig;
use crate::data_models::SearchResult;
use crate::resolver::resolve_result_url;

const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const NO_DESCRIPTION: &str = "No description available";

/// HTML-scraping provider over DuckDuckGo's no-JS endpoint. Needs no API
/// key; the endpoint blocks default automated User-Agents, so the client
/// identifies as a browser.
pub struct DuckDuckGoProvider {
    client: Client,
}

impl DuckDuckGoProvider {
    pub fn new(config: &HttpConfig) -> DuckDuckGoProvider {
        let client = Client::builder()
            .timeout(config.search_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to build HTTP client");

        DuckDuckGoProvider { client }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(DDG_HTML_URL)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(SearchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::BadStatus {
                status: status.as_u16(),
                message: "search endpoint refused the request".to_string(),
            });
        }

        let html = response.text().await.map_err(SearchError::from_reqwest)?;
        Ok(parse_results(&html, MAX_RESULTS))
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

/// Pull `{title, url, snippet}` out of the result markup. Each `.result`
/// container holds an `a.result__a` anchor and a `.result__snippet`
/// scoped to that container. Hrefs go through the resolver; entries it
/// rejects are dropped, never fatal.
fn parse_results(html: &str, limit: usize) -> Vec<SearchResult> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse(".result").unwrap();
    let anchor_selector = Selector::parse("a.result__a").unwrap();
    let snippet_selector = Selector::parse(".result__snippet").unwrap();

    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut results = Vec::new();

    for container in document.select(&result_selector) {
        if results.len() >= limit {
            break;
        }
        let Some(anchor) = container.select(&anchor_selector).next() else {
            continue;
        };
        let title = collapse(&anchor.text().collect::<Vec<_>>().join(" "));
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_result_url(href) else {
            debug!("dropping unresolvable result href: {href}");
            continue;
        };
        if title.is_empty() || !seen_urls.insert(url.clone()) {
            continue;
        }

        let snippet = container
            .select(&snippet_selector)
            .next()
            .map(|s| collapse(&s.text().collect::<Vec<_>>().join(" ")))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        results.push(SearchResult::new(title, url, snippet));
    }

    results
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

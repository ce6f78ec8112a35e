use serde::{Deserialize, Serialize};

/// A single normalized result from a search provider, in relevance order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(title: String, url: String, snippet: String) -> SearchResult {
        SearchResult {
            title,
            url,
            snippet,
        }
    }
}

/// Readable content of one fetched page, segmented into bounded chunks.
/// Never present as a placeholder: a failed source simply has no document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub title: String,
    pub url: String,
    pub chunks: Vec<String>,
}

impl ExtractedDocument {
    pub fn new(title: String, url: String, chunks: Vec<String>) -> ExtractedDocument {
        ExtractedDocument { title, url, chunks }
    }
}

/// Aggregate outcome of one search-and-scrape run.
///
/// `sources` keeps every provider result in rank order regardless of how
/// its scrape went; `content` holds only the documents that extracted
/// successfully, in completion order.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchScrapeResponse {
    pub query: String,
    pub sources: Vec<SearchResult>,
    pub content: Vec<ExtractedDocument>,
}

impl SearchScrapeResponse {
    pub fn empty(query: String) -> SearchScrapeResponse {
        SearchScrapeResponse {
            query,
            sources: Vec::new(),
            content: Vec::new(),
        }
    }
}

use std::collections::HashSet;
use std::io::Cursor;

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Minimum readable-text length for the primary extraction to count.
const MIN_ARTICLE_CHARS: usize = 200;
/// Headline-digest qualification thresholds.
const MIN_HEADLINE_CHARS: usize = 20;
const MIN_HEADLINE_WORDS: usize = 4;
const MAX_HEADLINES: usize = 8;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("page has no extractable readable content")]
    NoReadableContent,
}

/// Title and plain text pulled out of one fetched page. The text is
/// whitespace-collapsed and ready for the chunker.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub title: String,
    pub text: String,
}

/// Two-tier content extraction.
///
/// Tier one runs a readability pass rooted at `source_url` and accepts
/// the result when it yields at least [`MIN_ARTICLE_CHARS`] characters
/// of text. Arbitrary third-party HTML defeats any single heuristic on
/// a meaningful fraction of pages, so a weak or failed pass falls back
/// to a digest of the page's h1-h3 headlines: a degraded but non-empty
/// signal for portal and listing pages that lack one coherent article
/// body. Only when both tiers come up empty does the source fail.
pub fn extract(html: &str, source_url: &Url) -> Result<ExtractedText, ExtractError> {
    let product =
        readability::extractor::extract(&mut Cursor::new(html.as_bytes()), source_url).ok();

    let title = product
        .as_ref()
        .map(|p| p.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| source_url.to_string());

    if let Some(product) = &product {
        let text = collapse_whitespace(&product.text);
        if text.chars().count() >= MIN_ARTICLE_CHARS {
            return Ok(ExtractedText { title, text });
        }
    }

    let headlines = headline_digest(html);
    if headlines.is_empty() {
        return Err(ExtractError::NoReadableContent);
    }
    debug!(
        "weak readability result for {source_url}, using {} headlines",
        headlines.len()
    );

    Ok(ExtractedText {
        title,
        text: headlines.join(". "),
    })
}

/// Collect qualifying h1-h3 headlines in document order: whitespace
/// normalized, at least 20 chars and 4 words, exact duplicates dropped,
/// capped at 8.
fn headline_digest(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h1, h2, h3").unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut headlines = Vec::new();

    for element in document.select(&selector) {
        let text = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        if text.chars().count() < MIN_HEADLINE_CHARS {
            continue;
        }
        if text.split(' ').count() < MIN_HEADLINE_WORDS {
            continue;
        }
        if !seen.insert(text.clone()) {
            continue;
        }
        headlines.push(text);
        if headlines.len() >= MAX_HEADLINES {
            break;
        }
    }

    headlines
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

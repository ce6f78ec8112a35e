use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::{Config, ProviderChoice};
use crate::data_models::SearchResult;

pub mod duckduckgo;
pub mod google;

pub use duckduckgo::DuckDuckGoProvider;
pub use google::GoogleSearchProvider;

/// Providers return at most this many results; it is also the de facto
/// fan-out width of the pipeline.
pub const MAX_RESULTS: usize = 5;

/// A search provider maps a query to a ranked set of result descriptors.
/// An empty result list is a valid success, not an error.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;

    fn name(&self) -> &'static str;
}

/// Closed classification of API-provider access failures. Callers must be
/// able to tell misconfigured credentials from a provider outage from the
/// error alone, so each kind names the operator action likely to fix it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderAccessKind {
    QuotaExceeded,
    ApiNotEnabled,
    BillingNotEnabled,
    InvalidKey,
    RefererBlocked,
    Unknown,
}

impl ProviderAccessKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::QuotaExceeded => "quota exceeded",
            Self::ApiNotEnabled => "API not enabled",
            Self::BillingNotEnabled => "billing not enabled",
            Self::InvalidKey => "invalid API key",
            Self::RefererBlocked => "referrer or IP blocked",
            Self::Unknown => "unknown provider error",
        }
    }

    /// Human-readable diagnosis naming the likely fix.
    pub fn diagnosis(&self) -> &'static str {
        match self {
            Self::QuotaExceeded => {
                "the daily search quota is exhausted; wait for the reset or raise the quota in the provider console"
            }
            Self::ApiNotEnabled => {
                "the Custom Search API is not enabled for this project; enable it in the provider console's API library"
            }
            Self::BillingNotEnabled => {
                "billing is not enabled for this project; attach a billing account in the provider console"
            }
            Self::InvalidKey => {
                "the API key is invalid or revoked; issue a new key and update GOOGLE_SEARCH_API_KEY"
            }
            Self::RefererBlocked => {
                "the key's referrer/IP restrictions reject this host; relax the key restrictions for this deployment"
            }
            Self::Unknown => {
                "unrecognized provider error; check the provider status page and the raw error message"
            }
        }
    }
}

/// Failures of the search leg of the pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request timed out")]
    Timeout,

    #[error("search transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search provider returned HTTP {status}: {message}")]
    BadStatus { status: u16, message: String },

    #[error("provider access error ({}): {}; upstream said: {message}", .kind.label(), .kind.diagnosis())]
    Access {
        kind: ProviderAccessKind,
        status: u16,
        message: String,
    },

    #[error("could not decode provider response: {0}")]
    Decode(String),
}

impl SearchError {
    pub(crate) fn from_reqwest(e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Transport(e)
        }
    }
}

/// Build the active provider from configuration.
pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn SearchProvider>> {
    match config.provider {
        ProviderChoice::DuckDuckGo => Ok(Arc::new(DuckDuckGoProvider::new(&config.http))),
        ProviderChoice::Google => {
            let credentials = config
                .google
                .clone()
                .ok_or_else(|| anyhow!("google provider selected but credentials are missing"))?;
            Ok(Arc::new(GoogleSearchProvider::new(
                credentials,
                &config.http,
            )))
        }
    }
}

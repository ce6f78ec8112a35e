use std::env;
use std::time::Duration;

use anyhow::{Result, bail};
use dotenvy::dotenv;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Shared HTTP client knobs, passed explicitly into each adapter and the
/// fetcher at construction. Search requests get a shorter deadline than
/// page fetches so a slow search engine fails before its results would.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub user_agent: String,
    pub search_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> HttpConfig {
        HttpConfig {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_timeout: Duration::from_secs(10),
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    DuckDuckGo,
    Google,
}

#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub api_key: String,
    pub engine_id: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderChoice,
    pub google: Option<GoogleCredentials>,
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// Selecting the Google provider without both credentials set is a
    /// configuration error, reported as such rather than failing later
    /// inside a request.
    pub fn from_env() -> Result<Config> {
        dotenv().ok(); // Load .env file if present

        let provider = match env::var("SEARCH_PROVIDER").as_deref() {
            Ok("google") => ProviderChoice::Google,
            Ok("duckduckgo") | Err(_) => ProviderChoice::DuckDuckGo,
            Ok(other) => bail!("unknown SEARCH_PROVIDER value: {other}"),
        };

        let google = match (
            env::var("GOOGLE_SEARCH_API_KEY"),
            env::var("GOOGLE_SEARCH_ENGINE_ID"),
        ) {
            (Ok(api_key), Ok(engine_id)) => Some(GoogleCredentials { api_key, engine_id }),
            _ => None,
        };

        if provider == ProviderChoice::Google && google.is_none() {
            bail!(
                "SEARCH_PROVIDER=google requires GOOGLE_SEARCH_API_KEY and GOOGLE_SEARCH_ENGINE_ID"
            );
        }

        Ok(Config {
            provider,
            google,
            http: HttpConfig::default(),
        })
    }
}

use url::Url;

const SEARCH_ENGINE_DOMAIN: &str = "duckduckgo.com";
const AD_REDIRECT_PATH: &str = "/y.js";

/// Resolve a raw href harvested from a result anchor into its canonical
/// destination, or `None` when nothing usable can be derived.
///
/// DuckDuckGo wraps most result links in a redirect of the form
/// `https://duckduckgo.com/l/?uddg=<percent-encoded destination>&...`
/// and serves ad clicks through `/y.js`. Anything else that is an
/// absolute http(s) URL passes through unchanged.
pub fn resolve_result_url(raw_url: &str) -> Option<String> {
    if !raw_url.starts_with("http") {
        return None;
    }
    let parsed = Url::parse(raw_url).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let host = parsed.host_str()?;
    if host == SEARCH_ENGINE_DOMAIN || host.ends_with(&format!(".{SEARCH_ENGINE_DOMAIN}")) {
        if parsed.path() == AD_REDIRECT_PATH {
            return None;
        }
        // query_pairs percent-decodes the destination for us
        return parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned());
    }

    Some(raw_url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_strings() {
        assert_eq!(resolve_result_url(""), None);
        assert_eq!(resolve_result_url("javascript:void(0)"), None);
        assert_eq!(resolve_result_url("ftp://example.com/file"), None);
        assert_eq!(resolve_result_url("/relative/path"), None);
        // protocol-relative hrefs are not absolute http(s)
        assert_eq!(resolve_result_url("//duckduckgo.com/l/?uddg=x"), None);
    }

    #[test]
    fn rejects_ad_redirect_path() {
        assert_eq!(
            resolve_result_url("https://duckduckgo.com/y.js?ad_provider=x&u3=abc"),
            None
        );
    }

    #[test]
    fn decodes_wrapped_destination() {
        let href = "https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage%3Fa%3D1&rut=abc";
        assert_eq!(
            resolve_result_url(href),
            Some("https://example.com/page?a=1".to_string())
        );
    }

    #[test]
    fn decodes_wrapped_destination_on_subdomain() {
        let href = "https://html.duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.org%2F";
        assert_eq!(
            resolve_result_url(href),
            Some("https://example.org/".to_string())
        );
    }

    #[test]
    fn rejects_internal_url_without_destination() {
        assert_eq!(resolve_result_url("https://duckduckgo.com/html/?q=rust"), None);
    }

    #[test]
    fn passes_through_other_absolute_urls() {
        let href = "https://example.com/article?id=42";
        assert_eq!(resolve_result_url(href), Some(href.to_string()));

        // a host that merely contains the engine name is not internal
        let href = "https://notduckduckgo.com/page";
        assert_eq!(resolve_result_url(href), Some(href.to_string()));
    }
}

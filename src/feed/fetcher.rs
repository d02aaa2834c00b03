use crate::feed::parser::parse_page;
use crate::feed::FeedItem;
use crate::util::{retry, DEFAULT_BACKOFF_SECONDS};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Per-request cap enforced at the transport boundary.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Query parameter carrying the page number for pages past the first.
const PAGE_PARAM: &str = "paged";

/// Errors that can occur while fetching a feed page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL could not be parsed
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
}

/// Fetches up to `pages` pages of a feed and returns the normalized items in
/// encounter order.
///
/// Each page body is fetched under the retry policy with `attempts` tries.
/// A page that still fails after retries is logged and skipped; one bad
/// page never aborts the cycle. Items are de-duplicated by link across all
/// pages of this call (empty links never count as duplicates), and a page
/// that contributes nothing new ends pagination early: the feed is treated
/// as exhausted even if `pages` was not reached.
///
/// The only hard failure is an unparseable base URL.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    attempts: u32,
    pages: u32,
) -> Result<Vec<FeedItem>, FetchError> {
    let base = Url::parse(url)?;

    // Seen-links set is local to this fetch cycle by design; nothing is
    // shared across calls.
    let mut seen: HashSet<String> = HashSet::new();
    let mut items: Vec<FeedItem> = Vec::new();

    for page in 1..=pages.max(1) {
        let page_url = page_url(&base, page);

        let body = match retry(
            || fetch_page(client, &page_url),
            attempts,
            DEFAULT_BACKOFF_SECONDS,
        )
        .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    page = page,
                    url = %page_url,
                    error = %e,
                    "Feed page fetch failed after retries, skipping page"
                );
                continue;
            }
        };

        let parsed = parse_page(body.as_bytes());
        if parsed.malformed {
            tracing::warn!(
                page = page,
                url = %page_url,
                "Feed page not well-formed, keeping recovered entries only"
            );
        }

        let mut new_on_page = 0usize;
        for entry in parsed.entries {
            if !entry.link.is_empty() && !seen.insert(entry.link.clone()) {
                continue;
            }
            items.push(FeedItem {
                title: entry.title,
                link: entry.link,
                published: entry.published.unwrap_or_else(Utc::now),
                summary: entry.summary,
            });
            new_on_page += 1;
        }

        tracing::debug!(
            page = page,
            new_items = new_on_page,
            total = items.len(),
            "Parsed feed page"
        );

        if new_on_page == 0 {
            tracing::debug!(page = page, "Feed page yielded nothing new, stopping pagination");
            break;
        }
    }

    Ok(items)
}

/// Builds the URL for one feed page. Page 1 is the base URL untouched;
/// later pages set (or override) the page parameter while preserving every
/// other query parameter.
fn page_url(base: &Url, page: u32) -> Url {
    if page <= 1 {
        return base.clone();
    }

    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        query.append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

async fn fetch_page(client: &reqwest::Client, url: &Url) -> Result<String, FetchError> {
    tracing::debug!(url = %url, "Fetching feed page");

    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(url.clone()).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    response.text().await.map_err(FetchError::Network)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rss_with_items(items: &[(&str, &str)]) -> String {
        let mut body = String::from(r#"<?xml version="1.0"?><rss version="2.0"><channel>"#);
        for (title, link) in items {
            body.push_str(&format!(
                "<item><title>{}</title><link>{}</link>\
                 <pubDate>Mon, 15 Sep 2025 10:00:00 GMT</pubDate></item>",
                title, link
            ));
        }
        body.push_str("</channel></rss>");
        body
    }

    const EMPTY_RSS: &str = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;

    #[test]
    fn test_page_one_url_unchanged() {
        let base = Url::parse("https://example.com/feed/?category=tech").unwrap();
        assert_eq!(page_url(&base, 1), base);
    }

    #[test]
    fn test_page_three_adds_param_and_preserves_existing() {
        let base = Url::parse("https://example.com/feed/?category=tech").unwrap();
        let url = page_url(&base, 3);

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("category".to_string(), "tech".to_string())));
        assert!(pairs.contains(&("paged".to_string(), "3".to_string())));
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_existing_page_param_overridden() {
        let base = Url::parse("https://example.com/feed/?paged=7").unwrap();
        let url = page_url(&base, 2);

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![("paged".to_string(), "2".to_string())]);
    }

    #[test]
    fn test_page_url_without_query_gets_only_page_param() {
        let base = Url::parse("https://example.com/feed/").unwrap();
        let url = page_url(&base, 2);
        assert_eq!(url.query(), Some("paged=2"));
    }

    #[tokio::test]
    async fn test_single_page_fetch_and_parse() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss_with_items(&[
                ("One", "https://example.com/one"),
                ("Two", "https://example.com/two"),
            ])))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 1, 1)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "One");
        assert_eq!(items[1].link, "https://example.com/two");
    }

    #[tokio::test]
    async fn test_duplicate_page_short_circuits_pagination() {
        let server = MockServer::start().await;
        let page_one = rss_with_items(&[
            ("One", "https://example.com/one"),
            ("Two", "https://example.com/two"),
        ]);

        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param_is_missing("paged"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_one.clone()))
            .expect(1)
            .mount(&server)
            .await;

        // Page 2 repeats page 1 verbatim: zero new items, so page 3 must
        // never be requested even though five pages were allowed.
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("paged", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page_one))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(query_param("paged", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RSS))
            .expect(0)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 1, 5)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicates_across_pages_skipped() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param_is_missing("paged"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss_with_items(&[
                ("One", "https://example.com/one"),
                ("Two", "https://example.com/two"),
            ])))
            .mount(&server)
            .await;

        // Page 2 repeats "two" and introduces "three".
        Mock::given(method("GET"))
            .and(query_param("paged", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss_with_items(&[
                ("Two", "https://example.com/two"),
                ("Three", "https://example.com/three"),
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("paged", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RSS))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 1, 5)
            .await
            .unwrap();

        let links: Vec<&str> = items.iter().map(|i| i.link.as_str()).collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/one",
                "https://example.com/two",
                "https://example.com/three",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_page_skipped_pagination_continues() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param_is_missing("paged"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("paged", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(rss_with_items(&[(
                "Survivor",
                "https://example.com/survivor",
            )])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(query_param("paged", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RSS))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 1, 3)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Survivor");
    }

    #[tokio::test]
    async fn test_malformed_page_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not really xml"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 1, 3)
            .await
            .unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_entries_without_links_never_deduplicated() {
        let server = MockServer::start().await;
        let body = r#"<?xml version="1.0"?><rss version="2.0"><channel>
            <item><title>Bare one</title></item>
            <item><title>Bare two</title></item>
        </channel></rss>"#;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 1, 1)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.link.is_empty()));
    }

    #[tokio::test]
    async fn test_retry_then_success_on_same_page() {
        use wiremock::matchers::any;

        let server = MockServer::start().await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_string(rss_with_items(&[(
                "Recovered",
                "https://example.com/recovered",
            )])))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let items = fetch_feed(&client, &format!("{}/feed", server.uri()), 2, 1)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Recovered");
    }

    #[tokio::test]
    async fn test_invalid_url_is_the_only_hard_failure() {
        let client = reqwest::Client::new();
        let result = fetch_feed(&client, "not a url", 1, 1).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }
}

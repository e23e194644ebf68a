//! Fetches a web page and reads its `<title>`.

use async_trait::async_trait;
use inetify_core::{FetchError, TitleVerifier};
use reqwest::{redirect::Policy, Client};
use std::error::Error as _;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub use inetify_core::is_expected_title;

pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Only this much of a page is searched for the title.
const MAX_BODY: usize = 128 * 1024;

#[derive(Debug, Clone)]
pub struct TitleFetchOptions {
    pub timeout_ms: u64,
    pub redirects: usize,
    pub user_agent: String,
}

impl Default for TitleFetchOptions {
    fn default() -> Self {
        TitleFetchOptions {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            redirects: 5,
            user_agent: format!("inetify/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `TitleVerifier` over HTTP. Each call is one request bounded by the
/// configured timeout.
#[derive(Debug, Clone)]
pub struct HttpTitleVerifier {
    client: Client,
    timeout_ms: u64,
}

impl HttpTitleVerifier {
    pub fn new(opts: TitleFetchOptions) -> anyhow::Result<Self> {
        let client = Client::builder()
            .redirect(Policy::limited(opts.redirects))
            .timeout(Duration::from_millis(opts.timeout_ms))
            .user_agent(opts.user_agent.clone())
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(HttpTitleVerifier { client, timeout_ms: opts.timeout_ms })
    }

    pub async fn fetch_title(&self, server: &str) -> Result<String, FetchError> {
        let url = normalize_address(server)?;
        debug!("fetching title of {url}");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(&e, self.timeout_ms))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = resp.bytes().await.map_err(|e| classify(&e, self.timeout_ms))?;
        let body = String::from_utf8_lossy(&bytes[..bytes.len().min(MAX_BODY)]);
        Ok(extract_title(&body).unwrap_or_default())
    }
}

#[async_trait]
impl TitleVerifier for HttpTitleVerifier {
    async fn page_title(&self, server: &str) -> Result<String, FetchError> {
        self.fetch_title(server).await
    }
}

/// Adds `http://` to addresses given without a scheme.
pub fn normalize_address(server: &str) -> Result<Url, FetchError> {
    let server = server.trim();
    if server.is_empty() {
        return Err(FetchError::InvalidAddress(server.to_string()));
    }
    let address = if server.contains("://") {
        server.to_string()
    } else {
        format!("http://{}", server)
    };
    let url = Url::parse(&address).map_err(|_| FetchError::InvalidAddress(server.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(FetchError::InvalidAddress(server.to_string())),
    }
}

/// Text of the first `<title>` element, whitespace collapsed and basic
/// entities decoded.
pub fn extract_title(body: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets valid for slicing `body`
    let lower = body.to_ascii_lowercase();
    let s = lower.find("<title")?;
    let gt = lower[s..].find('>')? + s + 1;
    let end = lower[gt..].find("</title")? + gt;
    let raw = body[gt..end].split_whitespace().collect::<Vec<_>>().join(" ");
    Some(decode_entities(&raw))
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn classify(err: &reqwest::Error, timeout_ms: u64) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout(timeout_ms);
    }
    if err.is_connect() {
        let mut source = err.source();
        while let Some(e) = source {
            let msg = e.to_string();
            if msg.contains("dns error") || msg.contains("failed to lookup address") {
                let host = err.url().and_then(|u| u.host_str()).unwrap_or_default();
                return FetchError::Dns(host.to_string());
            }
            source = e.source();
        }
        return FetchError::Connect(err.to_string());
    }
    if let Some(status) = err.status() {
        return FetchError::Status(status.as_u16());
    }
    FetchError::Body(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn verifier(timeout_ms: u64) -> HttpTitleVerifier {
        HttpTitleVerifier::new(TitleFetchOptions { timeout_ms, ..Default::default() }).unwrap()
    }

    #[test]
    fn adds_scheme_when_missing() {
        assert_eq!(normalize_address("www.google.com").unwrap().as_str(), "http://www.google.com/");
        assert_eq!(normalize_address("https://example.org/x").unwrap().as_str(), "https://example.org/x");
        assert!(normalize_address("").is_err());
        assert!(normalize_address("ftp://example.org").is_err());
    }

    #[test]
    fn title_extraction() {
        assert_eq!(extract_title("<html><head><TITLE>Google</TITLE></head></html>").as_deref(), Some("Google"));
        assert_eq!(extract_title("<title lang=\"en\">\n  Example\n  Domain </title>").as_deref(), Some("Example Domain"));
        assert_eq!(extract_title("<title>Fish &amp; Chips</title>").as_deref(), Some("Fish & Chips"));
        assert_eq!(extract_title("<title>Ünïcödé Café</title>").as_deref(), Some("Ünïcödé Café"));
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }

    #[tokio::test]
    async fn fetches_title_without_scheme() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html><head><title>Google</title></head></html>", "text/html"))
            .expect(1)
            .mount(&server)
            .await;

        let title = verifier(3000).page_title(&server.address().to_string()).await.unwrap();
        assert_eq!(title, "Google");
        assert!(verifier(3000).is_expected_title("google", &title));
    }

    #[tokio::test]
    async fn page_without_title_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain text"))
            .mount(&server)
            .await;

        assert_eq!(verifier(3000).page_title(&server.uri()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn error_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(verifier(3000).page_title(&server.uri()).await, Err(FetchError::Status(503)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<title>late</title>").set_delay(Duration::from_millis(1500)))
            .mount(&server)
            .await;

        assert_eq!(verifier(200).page_title(&server.uri()).await, Err(FetchError::Timeout(200)));
    }

    #[tokio::test]
    async fn refused_connection_fails() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let err = verifier(1000).page_title(&addr.to_string()).await.unwrap_err();
        assert!(matches!(err, FetchError::Connect(_)), "{err:?}");
    }
}

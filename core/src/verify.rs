use crate::error::FetchError;
use crate::outcome::TestInfo;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// True if `page_title` contains `title`, ignoring case. Empty input never matches.
pub fn is_expected_title(title: &str, page_title: &str) -> bool {
    if title.is_empty() || page_title.is_empty() {
        return false;
    }
    page_title.to_uppercase().contains(&title.to_uppercase())
}

/// Fetches the title of a web page and compares it to an expected one.
#[async_trait]
pub trait TitleVerifier: Send + Sync {
    /// One bounded fetch, no retries.
    async fn page_title(&self, server: &str) -> Result<String, FetchError>;

    fn is_expected_title(&self, title: &str, page_title: &str) -> bool {
        is_expected_title(title, page_title)
    }
}

/// Runs one connectivity probe.
///
/// Returns `None` when the probe does not apply to the current link, the
/// link goes away while testing, or `cancel` fires.
#[async_trait]
pub trait Tester: Send + Sync {
    async fn test(
        &self,
        retries: u32,
        delay: Duration,
        require_wifi: bool,
        cancel: CancellationToken,
    ) -> Option<TestInfo>;
}

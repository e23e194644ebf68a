//! One connectivity probe: optional startup delay, then up to N title
//! fetches while the link stays up.

use async_trait::async_trait;
use inetify_core::{now_millis, LinkMonitor, ProbeConfig, TestInfo, Tester, TitleVerifier};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub struct ProbeRunner {
    server: String,
    title: String,
    monitor: Arc<dyn LinkMonitor>,
    verifier: Arc<dyn TitleVerifier>,
}

impl ProbeRunner {
    pub fn new(
        server: impl Into<String>,
        title: impl Into<String>,
        monitor: Arc<dyn LinkMonitor>,
        verifier: Arc<dyn TitleVerifier>,
    ) -> Self {
        ProbeRunner { server: server.into(), title: title.into(), monitor, verifier }
    }

    pub fn from_config(config: &ProbeConfig, monitor: Arc<dyn LinkMonitor>, verifier: Arc<dyn TitleVerifier>) -> Self {
        ProbeRunner::new(config.server.clone(), config.title.clone(), monitor, verifier)
    }

    /// Runs `test` with the retries, delay and link requirement of `config`.
    pub async fn run(&self, config: &ProbeConfig, cancel: CancellationToken) -> Option<TestInfo> {
        self.test(config.retries, config.delay, config.require_wifi, cancel).await
    }
}

#[async_trait]
impl Tester for ProbeRunner {
    async fn test(
        &self,
        retries: u32,
        delay: Duration,
        require_wifi: bool,
        cancel: CancellationToken,
    ) -> Option<TestInfo> {
        if !delay.is_zero() {
            debug!("sleeping {} ms before testing internet connectivity", delay.as_millis());
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("probe cancelled during delay");
                    return None;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        let mut link = self.monitor.link_info();
        if !link.qualifies(require_wifi) {
            debug!("skipping test, no qualifying connection");
            return None;
        }

        let mut page_title = String::new();
        let mut is_expected = false;
        let mut error = None;
        let mut attempt = 0;
        while attempt < retries.max(1) && !is_expected {
            if cancel.is_cancelled() {
                debug!("probe cancelled before attempt {}", attempt + 1);
                return None;
            }
            link = self.monitor.link_info();
            if !link.qualifies(require_wifi) {
                debug!("connection lost before attempt {}, giving up", attempt + 1);
                return None;
            }
            attempt += 1;
            match self.verifier.page_title(&self.server).await {
                Ok(t) => {
                    is_expected = self.verifier.is_expected_title(&self.title, &t);
                    debug!(attempt, page_title = %t, is_expected, "fetched title");
                    page_title = t;
                    error = None;
                }
                Err(e) => {
                    debug!(attempt, "fetching title of {} failed: {e}", self.server);
                    error = Some(e.to_string());
                }
            }
        }

        if cancel.is_cancelled() {
            debug!("probe cancelled after {attempt} attempts");
            return None;
        }

        info!("internet connectivity: {is_expected}");
        Some(TestInfo::new(now_millis(), &link, &self.server, &self.title, page_title, is_expected, error))
    }
}

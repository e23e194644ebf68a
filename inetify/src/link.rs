use inetify_core::{LinkInfo, LinkMonitor};
use tokio::sync::watch;

/// Link state fed by the most recent event read from stdin.
pub struct WatchedLink(pub watch::Receiver<LinkInfo>);

impl LinkMonitor for WatchedLink {
    fn link_info(&self) -> LinkInfo {
        self.0.borrow().clone()
    }
}

/// Fixed link state given on the command line.
pub struct StaticLink(pub LinkInfo);

impl LinkMonitor for StaticLink {
    fn link_info(&self) -> LinkInfo {
        self.0.clone()
    }
}

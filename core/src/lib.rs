//! Core types and collaborator traits shared by the inetify crates.

pub mod error;
pub mod link;
pub mod notify;
pub mod outcome;
pub mod settings;
pub mod store;
pub mod verify;

pub use error::{FetchError, StoreError};
pub use link::{LinkEvent, LinkInfo, LinkMonitor, LinkType};
pub use notify::{Notification, NotificationKind, Notifier};
pub use outcome::TestInfo;
pub use settings::{ProbeConfig, Settings};
pub use store::{Coordinate, IgnoredWifi, WifiLocation, WifiStore};
pub use verify::{is_expected_title, Tester, TitleVerifier};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }

    #[test]
    fn now_millis_is_after_2020() {
        assert!(now_millis() > 1_577_836_800_000);
    }
}

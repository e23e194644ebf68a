//! Result record of one completed probe.

use crate::link::{LinkInfo, LinkType};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Outcome of a probe that ran to completion. Skipped or cancelled probes
/// produce no `TestInfo` at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestInfo {
    /// Epoch millis when the probe finished.
    pub timestamp: i64,
    pub link_type: i32,
    pub type_name: String,
    /// SSID of a Wifi link, or the subtype of a mobile link.
    pub extra: String,
    /// BSSID of a Wifi link.
    pub extra2: Option<String>,
    pub site: String,
    pub title: String,
    /// Empty if no attempt fetched a page.
    pub page_title: String,
    pub is_expected_title: bool,
    /// Error of the last attempt, `None` if it succeeded.
    pub error: Option<String>,
}

impl TestInfo {
    pub fn new(
        timestamp: i64,
        link: &LinkInfo,
        site: &str,
        title: &str,
        page_title: String,
        is_expected_title: bool,
        error: Option<String>,
    ) -> Self {
        let type_name = if link.type_name.is_empty() {
            link.link_type.label().to_string()
        } else {
            link.type_name.clone()
        };
        let extra = match link.link_type {
            LinkType::Wifi => link.ssid.clone(),
            _ => link.subtype_name.clone(),
        };
        let extra2 = match link.link_type {
            LinkType::Wifi => link.bssid.clone(),
            _ => None,
        };
        TestInfo {
            timestamp,
            link_type: link.link_type.code(),
            type_name,
            extra: extra.unwrap_or_default(),
            extra2,
            site: site.to_string(),
            title: title.to_string(),
            page_title,
            is_expected_title,
            error,
        }
    }

    pub fn timestamp_rfc3339(&self) -> String {
        OffsetDateTime::from_unix_timestamp_nanos(self.timestamp as i128 * 1_000_000)
            .ok()
            .and_then(|t| t.format(&Rfc3339).ok())
            .unwrap_or_else(|| self.timestamp.to_string())
    }
}

impl fmt::Display for TestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tested at:      {}", self.timestamp_rfc3339())?;
        match &self.extra2 {
            Some(bssid) => writeln!(f, "Connection:     {} {} ({})", self.type_name, self.extra, bssid)?,
            None => writeln!(f, "Connection:     {} {}", self.type_name, self.extra)?,
        }
        writeln!(f, "Site:           {}", self.site)?;
        writeln!(f, "Expected title: {}", self.title)?;
        writeln!(f, "Page title:     {}", self.page_title)?;
        if let Some(e) = &self.error {
            writeln!(f, "Error:          {}", e)?;
        }
        write!(
            f,
            "Internet:       {}",
            if self.is_expected_title { "OK" } else { "NOT OK" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_fields() {
        let info = TestInfo::new(0, &LinkInfo::wifi("Celsten", "00:21:29:A2:48:80"), "www.google.com", "google", "Google".into(), true, None);
        assert_eq!(info.link_type, 1);
        assert_eq!(info.type_name, "WIFI");
        assert_eq!(info.extra, "Celsten");
        assert_eq!(info.extra2.as_deref(), Some("00:21:29:A2:48:80"));
    }

    #[test]
    fn mobile_uses_subtype_as_extra() {
        let info = TestInfo::new(0, &LinkInfo::mobile("UMTS"), "s", "t", String::new(), false, Some("boom".into()));
        assert_eq!(info.link_type, 0);
        assert_eq!(info.extra, "UMTS");
        assert_eq!(info.extra2, None);
    }

    #[test]
    fn detail_text() {
        let info = TestInfo::new(0, &LinkInfo::wifi("Home", "AA"), "example.org", "Example", String::new(), false, Some("timed out after 3000 ms".into()));
        let text = info.to_string();
        assert!(text.starts_with("Tested at:      1970-01-01T00:00:00Z"));
        assert!(text.contains("WIFI Home (AA)"));
        assert!(text.contains("Error:          timed out after 3000 ms"));
        assert!(text.ends_with("NOT OK"));
    }

    #[test]
    fn json_keeps_every_field() {
        let info = TestInfo::new(42, &LinkInfo::wifi("Home", "AA"), "example.org", "Example", "Example Domain".into(), true, None);
        let json = serde_json::to_value(&info).unwrap();
        for key in ["timestamp", "link_type", "type_name", "extra", "extra2", "site", "title", "page_title", "is_expected_title", "error"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        let back: TestInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, info);
    }
}

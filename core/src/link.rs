//! Network link state as seen by the probe.

use serde::{Deserialize, Serialize};

/// Kind of network attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Wifi,
    Mobile,
    Other,
    #[default]
    None,
}

impl LinkType {
    /// Numeric code carried in a `TestInfo`.
    pub const fn code(self) -> i32 {
        match self {
            LinkType::Mobile => 0,
            LinkType::Wifi => 1,
            LinkType::Other => 9,
            LinkType::None => -1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            LinkType::Wifi => "WIFI",
            LinkType::Mobile => "MOBILE",
            LinkType::Other => "OTHER",
            LinkType::None => "NONE",
        }
    }
}

/// Snapshot of the active link, read fresh at each probe checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkInfo {
    #[serde(default, rename = "type")]
    pub link_type: LinkType,
    #[serde(default)]
    pub type_name: String,
    /// Mobile subtype such as "UMTS" or "LTE".
    #[serde(default)]
    pub subtype_name: Option<String>,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub bssid: Option<String>,
}

impl LinkInfo {
    pub fn disconnected() -> Self {
        LinkInfo::default()
    }

    pub fn wifi(ssid: impl Into<String>, bssid: impl Into<String>) -> Self {
        LinkInfo {
            link_type: LinkType::Wifi,
            type_name: LinkType::Wifi.label().to_string(),
            subtype_name: None,
            connected: true,
            ssid: Some(ssid.into()),
            bssid: Some(bssid.into()),
        }
    }

    pub fn mobile(subtype: impl Into<String>) -> Self {
        LinkInfo {
            link_type: LinkType::Mobile,
            type_name: LinkType::Mobile.label().to_string(),
            subtype_name: Some(subtype.into()),
            connected: true,
            ssid: None,
            bssid: None,
        }
    }

    /// (SSID, BSSID) of a Wifi link; `None` unless both are present and non-empty.
    pub fn identity(&self) -> Option<(&str, &str)> {
        if self.link_type != LinkType::Wifi {
            return None;
        }
        identity_of(self.ssid.as_deref(), self.bssid.as_deref())
    }

    pub fn is_connected(&self) -> bool {
        self.connected && self.link_type != LinkType::None
    }

    pub fn is_wifi_connected(&self) -> bool {
        self.is_connected() && self.identity().is_some()
    }

    /// Whether a probe may run on this link.
    pub fn qualifies(&self, require_wifi: bool) -> bool {
        if require_wifi {
            self.is_wifi_connected()
        } else {
            self.is_connected()
        }
    }
}

/// Inbound link-change notification consumed by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkEvent {
    pub connected: bool,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub bssid: Option<String>,
}

impl LinkEvent {
    pub fn identity(&self) -> Option<(&str, &str)> {
        identity_of(self.ssid.as_deref(), self.bssid.as_deref())
    }
}

impl From<&LinkInfo> for LinkEvent {
    fn from(info: &LinkInfo) -> Self {
        LinkEvent {
            connected: info.is_connected(),
            ssid: info.ssid.clone(),
            bssid: info.bssid.clone(),
        }
    }
}

fn identity_of<'a>(ssid: Option<&'a str>, bssid: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    match (ssid, bssid) {
        (Some(s), Some(b)) if !s.is_empty() && !b.is_empty() => Some((s, b)),
        _ => None,
    }
}

/// Source of the current link state.
pub trait LinkMonitor: Send + Sync {
    fn link_info(&self) -> LinkInfo;
}

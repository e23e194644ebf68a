//! Storage collaborator for ignored Wifi networks and saved Wifi locations.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredWifi {
    pub bssid: String,
    pub ssid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters.
    pub accuracy: f32,
    /// Epoch millis of the fix.
    pub time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiLocation {
    pub bssid: String,
    pub ssid: String,
    pub name: Option<String>,
    pub location: Coordinate,
}

/// Handle onto ignore-list and location records.
///
/// Implementations open their backing storage lazily on first access and
/// must serialize concurrent access. `close` releases the handle; the next
/// call reopens it.
pub trait WifiStore: Send + Sync {
    fn open(&self) -> Result<(), StoreError>;
    fn close(&self);
    fn is_open(&self) -> bool;

    /// Upserts by BSSID. Returns false if either value is empty.
    fn add_ignored(&self, bssid: &str, ssid: &str) -> Result<bool, StoreError>;
    fn is_ignored(&self, ssid: &str) -> Result<bool, StoreError>;
    /// Removes every record with the given SSID.
    fn delete_ignored(&self, ssid: &str) -> Result<bool, StoreError>;
    fn fetch_ignored(&self) -> Result<Vec<IgnoredWifi>, StoreError>;

    fn add_location(&self, bssid: &str, ssid: &str, name: Option<&str>, location: &Coordinate) -> Result<bool, StoreError>;
    fn delete_location(&self, bssid: &str) -> Result<bool, StoreError>;
    fn rename_location(&self, bssid: &str, name: &str) -> Result<bool, StoreError>;
    fn fetch_locations(&self) -> Result<Vec<WifiLocation>, StoreError>;
}

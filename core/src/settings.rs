use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// User settings, usually read from `inetify.yaml`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    pub server: String,
    pub title: String,
    /// Only notify when the expected title was not found.
    pub only_nok: bool,
    /// Notification tone; empty means silent.
    pub tone: String,
    pub light: bool,
    pub retries: u32,
    pub delay_ms: u64,
    pub timeout_ms: u64,
    pub require_wifi: bool,
    pub database: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enabled: false,
            server: "www.google.com".into(),
            title: "google".into(),
            only_nok: false,
            tone: String::new(),
            light: true,
            retries: 3,
            delay_ms: 10_000,
            timeout_ms: 3_000,
            require_wifi: true,
            database: PathBuf::from("inetify.db"),
        }
    }
}

impl Settings {
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            server: self.server.clone(),
            title: self.title.clone(),
            retries: self.retries.max(1),
            delay: Duration::from_millis(self.delay_ms),
            require_wifi: self.require_wifi,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Immutable per-probe configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub server: String,
    pub title: String,
    pub retries: u32,
    pub delay: Duration,
    pub require_wifi: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let s: Settings = serde_yaml::from_str("enabled: true\nserver: example.org\ntitle: Example\n").unwrap();
        assert!(s.enabled);
        assert_eq!(s.server, "example.org");
        assert_eq!(s.retries, 3);
        assert_eq!(s.delay_ms, 10_000);
        assert!(s.light);
        assert!(s.tone.is_empty());
    }

    #[test]
    fn retries_clamped_to_one() {
        let s = Settings { retries: 0, delay_ms: 0, ..Settings::default() };
        let cfg = s.probe_config();
        assert_eq!(cfg.retries, 1);
        assert_eq!(cfg.delay, Duration::ZERO);
    }
}

use clap::ValueEnum;
use inetify_core::notify::{NOTIFICATION_ID_NOK, NOTIFICATION_ID_OK};
use inetify_core::{Notification, Notifier, Settings, TestInfo};
use std::io::Write;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Output of `watch`; notifications are not tabular, so there is no CSV.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum NotifyFormat { Text, Json }

/// Prints notifications instead of showing them.
pub struct ConsoleNotifier<W: Write + Send> {
    settings: Settings,
    format: NotifyFormat,
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub fn new(settings: Settings, format: NotifyFormat, out: W) -> Self {
        ConsoleNotifier { settings, format, out: Mutex::new(out) }
    }

    fn render(&self, info: Option<TestInfo>) -> Option<String> {
        let Some(info) = info else {
            debug!("cancelling notifications");
            return Some(match self.format {
                NotifyFormat::Json => serde_json::json!({ "cancel": [NOTIFICATION_ID_OK, NOTIFICATION_ID_NOK] }).to_string(),
                NotifyFormat::Text => "Notifications cleared".to_string(),
            });
        };
        let Some(n) = Notification::for_outcome(info, &self.settings) else {
            debug!("internet connectivity OK, only failures are notified");
            return None;
        };
        debug!("issuing notification: {:?}", n.info);
        Some(match self.format {
            NotifyFormat::Json => serde_json::to_string(&n).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
            NotifyFormat::Text => {
                let mut text = format!("[{}] {}\n{}\n{}", n.id, n.title, n.text, n.info);
                if let Some(tone) = &n.tone {
                    text.push_str(&format!("\n(tone: {tone})"));
                }
                if n.light {
                    text.push_str("\n(light)");
                }
                text
            }
        })
    }
}

impl<W: Write + Send> Notifier for ConsoleNotifier<W> {
    fn notify(&self, info: Option<TestInfo>) {
        let Some(text) = self.render(info) else { return };
        let Ok(mut out) = self.out.lock() else {
            warn!("notifier output lock poisoned");
            return;
        };
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            warn!("could not write notification: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inetify_core::LinkInfo;

    fn info(ok: bool) -> TestInfo {
        TestInfo::new(0, &LinkInfo::wifi("Home", "AA"), "www.google.com", "google", "Google".into(), ok, None)
    }

    fn output(settings: Settings, format: NotifyFormat, infos: Vec<Option<TestInfo>>) -> String {
        let notifier = ConsoleNotifier::new(settings, format, Vec::new());
        for i in infos {
            notifier.notify(i);
        }
        String::from_utf8(notifier.out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn text_notification() {
        let out = output(Settings { tone: "bell".into(), ..Settings::default() }, NotifyFormat::Text, vec![Some(info(false))]);
        assert!(out.starts_with("[2] No internet connectivity"));
        assert!(out.contains("Site:           www.google.com"));
        assert!(out.contains("(tone: bell)"));
        assert!(out.contains("(light)"));
    }

    #[test]
    fn only_nok_prints_nothing_for_ok() {
        let out = output(Settings { only_nok: true, ..Settings::default() }, NotifyFormat::Text, vec![Some(info(true))]);
        assert!(out.is_empty());
    }

    #[test]
    fn json_clear_and_notify() {
        let out = output(Settings::default(), NotifyFormat::Json, vec![None, Some(info(true))]);
        let lines: Vec<serde_json::Value> = out.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines[0]["cancel"], serde_json::json!([1, 2]));
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["kind"], "ok");
        assert_eq!(lines[1]["info"]["extra"], "Home");
    }
}

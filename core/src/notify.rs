//! What gets shown to the user for a probe outcome.

use crate::outcome::TestInfo;
use crate::settings::Settings;
use serde::Serialize;

pub const NOTIFICATION_ID_OK: u32 = 1;
pub const NOTIFICATION_ID_NOK: u32 = 2;

/// Receives probe outcomes. `None` clears any notification this
/// subsystem has shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, info: Option<TestInfo>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Ok,
    NotOk,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: u32,
    pub kind: NotificationKind,
    pub title: &'static str,
    pub text: &'static str,
    pub tone: Option<String>,
    pub light: bool,
    pub info: TestInfo,
}

impl Notification {
    /// `None` when the outcome is OK and only failures are wanted.
    pub fn for_outcome(info: TestInfo, settings: &Settings) -> Option<Self> {
        if info.is_expected_title && settings.only_nok {
            return None;
        }
        let (id, kind, title, text) = if info.is_expected_title {
            (NOTIFICATION_ID_OK, NotificationKind::Ok, "Internet connectivity OK", "The expected page title was found")
        } else {
            (NOTIFICATION_ID_NOK, NotificationKind::NotOk, "No internet connectivity", "The expected page title was not found")
        };
        let tone = (!settings.tone.is_empty()).then(|| settings.tone.clone());
        Some(Notification { id, kind, title, text, tone, light: settings.light, info })
    }
}

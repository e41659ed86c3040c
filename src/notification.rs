//! Persistent status surface for a running study session.
//!
//! The host platform decides how the "ongoing" indicator is drawn; the timer
//! only talks to a [`StatusNotifier`].

use log::{info, warn};

use crate::settings::{NotificationSettings, SettingsStore};

pub const NOTIFICATION_CHANNEL_ID: &str = "STUDY_SESSION_TIMER";
pub const NOTIFICATION_ID: u32 = 10;

pub trait StatusNotifier: Send + Sync {
    /// Puts the ongoing indicator up. Called when the timer starts.
    fn show(&self, text: &str);
    /// Replaces the indicator text, once per tick.
    fn update(&self, text: &str);
    fn dismiss(&self);
}

/// Writes the status line to the log. Used where no native surface exists.
pub struct LogNotifier {
    settings: NotificationSettings,
}

impl LogNotifier {
    pub fn new(settings: NotificationSettings) -> Self {
        Self { settings }
    }
}

impl StatusNotifier for LogNotifier {
    fn show(&self, text: &str) {
        if self.settings.enabled {
            info!(
                "[{}#{NOTIFICATION_ID}] {}: {text}",
                NOTIFICATION_CHANNEL_ID, self.settings.channel_name
            );
        }
    }

    fn update(&self, text: &str) {
        if self.settings.enabled {
            log::debug!("[{NOTIFICATION_CHANNEL_ID}#{NOTIFICATION_ID}] {text}");
        }
    }

    fn dismiss(&self) {
        if self.settings.enabled {
            info!("[{NOTIFICATION_CHANNEL_ID}#{NOTIFICATION_ID}] dismissed");
        }
    }
}

/// Issues the notification permission prompt once. The outcome never gates
/// anything; a failure to record it is only logged.
pub fn request_permission(settings: &SettingsStore) {
    let mut notifications = settings.notifications();
    if notifications.permission_requested {
        return;
    }

    info!("Requesting permission to post notifications");
    notifications.permission_requested = true;
    if let Err(err) = settings.update_notifications(notifications) {
        warn!("Failed to record notification permission request: {err:#}");
    }
}

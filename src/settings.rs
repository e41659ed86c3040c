use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const DATA_DIR_ENV: &str = "STUDYSMART_DATA_DIR";
pub const DEBUG_ENV: &str = "STUDYSMART_DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub channel_name: String,
    /// Set once the startup permission prompt has been issued.
    pub permission_requested: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            channel_name: "Study Session Timer".into(),
            permission_requested: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserSettings {
    notifications: NotificationSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring unreadable settings at {}: {err}",
                    path.display()
                );
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn notifications(&self) -> NotificationSettings {
        self.read().notifications.clone()
    }

    pub fn update_notifications(&self, settings: NotificationSettings) -> Result<()> {
        let mut guard = self.write();
        guard.notifications = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

/// `STUDYSMART_DATA_DIR`, or the platform data directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    dirs::data_dir()
        .map(|dir| dir.join("studysmart"))
        .ok_or_else(|| anyhow!("could not determine a data directory; set {DATA_DIR_ENV}"))
}

pub fn debug_enabled() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.notifications(), NotificationSettings::default());
    }

    #[test]
    fn updates_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone()).unwrap();
        let mut notifications = store.notifications();
        notifications.permission_requested = true;
        notifications.enabled = false;
        store.update_notifications(notifications.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.notifications(), notifications);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "notifications": { "channel_name": "Focus" } }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let notifications = store.notifications();
        assert_eq!(notifications.channel_name, "Focus");
        assert!(notifications.enabled);
        assert!(!notifications.permission_requested);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.notifications(), NotificationSettings::default());
    }
}

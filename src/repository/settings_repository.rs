use crate::error::{io_err, VavooError};
use crate::model::UserSettings;
use crate::utils::{write_file_atomic, SETTINGS_FILE};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// Persistence port for the user settings.
pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<UserSettings, VavooError>;
    fn save(&self, settings: &UserSettings) -> Result<(), VavooError>;
}

pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(working_dir: &Path) -> Self {
        Self { path: working_dir.join(SETTINGS_FILE) }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<UserSettings, VavooError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => Ok(settings),
                Err(err) => {
                    warn!("Failed to parse settings file {}, using defaults: {err}", self.path.display());
                    Ok(UserSettings::default())
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(UserSettings::default()),
            Err(err) => Err(io_err!("Failed to read settings file {}: {err}", self.path.display())),
        }
    }

    fn save(&self, settings: &UserSettings) -> Result<(), VavooError> {
        let content = serde_json::to_vec_pretty(settings)
            .map_err(|err| io_err!("Failed to serialize settings: {err}"))?;
        write_file_atomic(&self.path, &content)
            .map_err(|err| io_err!("Failed to write settings file {}: {err}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use crate::model::{UserSettings, ViewType};
    use crate::repository::settings_repository::{JsonSettingsStore, SettingsStore};
    use crate::utils::SETTINGS_FILE;

    #[test]
    fn test_missing_settings_are_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path());
        assert_eq!(store.load().unwrap(), UserSettings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path());
        let mut settings = UserSettings { current_view: ViewType::Countries, last_update: Some("19/11/2025 05:00".to_string()), ..UserSettings::default() };
        settings.set_selection(ViewType::Countries, &["UK".to_string()]);
        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "[1,2").unwrap();
        let store = JsonSettingsStore::new(dir.path());
        assert_eq!(store.load().unwrap(), UserSettings::default());
    }
}

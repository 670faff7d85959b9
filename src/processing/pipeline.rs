use crate::error::VavooError;
use crate::model::{AppConfig, Config, Favourites, OutputConfig, UserSettings, ViewType};
use crate::processing::bouquet_writer::{BouquetWriter, RemovedFiles, WrittenFiles};
use crate::processing::ingester::PlaylistIngester;
use crate::processing::update_guard::UpdateGuard;
use crate::repository::favourites_repository::FavouritesRepository;
use crate::repository::settings_repository::{JsonSettingsStore, SettingsStore};
use crate::utils::{format_last_update, SETTINGS_FILE};
use crate::utils::network::signature::create_signature_provider;
use log::{error, info, warn};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    pub key: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub updated: Vec<String>,
    pub failed: Vec<String>,
    pub last_update: Option<String>,
}

/// Drives ingestion and bouquet writing for the cli and the scheduler.
pub struct Pipeline {
    app_config: Arc<AppConfig>,
    client: reqwest::Client,
    settings: Arc<dyn SettingsStore>,
    update_guard: UpdateGuard,
}

impl Pipeline {
    pub fn new(app_config: Arc<AppConfig>, client: reqwest::Client) -> Self {
        let settings = Arc::new(JsonSettingsStore::new(&app_config.current().working_path()));
        Self::with_settings_store(app_config, client, settings)
    }

    pub fn with_settings_store(app_config: Arc<AppConfig>, client: reqwest::Client, settings: Arc<dyn SettingsStore>) -> Self {
        Self { app_config, client, settings, update_guard: UpdateGuard::new() }
    }

    fn ingester(&self, config: &Config) -> PlaylistIngester {
        PlaylistIngester::new(self.client.clone(), config, Arc::clone(&self.app_config.file_locks))
    }

    fn writer(&self, config: &Config) -> BouquetWriter {
        BouquetWriter::new(self.client.clone(), config, Arc::clone(&self.app_config.file_locks))
    }

    fn favourites_repository(config: &Config) -> FavouritesRepository {
        FavouritesRepository::new(&config.working_path())
    }

    /// Load, change and save of the settings under the settings file lock.
    async fn update_settings<F>(&self, config: &Config, update: F) -> Result<(), VavooError>
    where
        F: FnOnce(&mut UserSettings),
    {
        let _lock = self.app_config.file_locks.write_lock(&config.working_path().join(SETTINGS_FILE)).await;
        let mut settings = self.settings.load()?;
        update(&mut settings);
        self.settings.save(&settings)
    }

    async fn update_favourites<F>(&self, config: &Config, update: F)
    where
        F: FnOnce(&FavouritesRepository) -> Result<(), VavooError>,
    {
        let repository = Self::favourites_repository(config);
        let _lock = self.app_config.file_locks.write_lock(repository.path()).await;
        if let Err(err) = update(&repository) {
            error!("{err}");
        }
    }

    pub fn settings(&self) -> Result<UserSettings, VavooError> {
        self.settings.load()
    }

    pub fn favourites(&self) -> Favourites {
        Self::favourites_repository(&self.app_config.current()).load()
    }

    /// Group keys of the view sorted by label, flagged with the saved selection.
    pub async fn list_groups(&self, view: ViewType) -> Result<Vec<GroupEntry>, VavooError> {
        let config = self.app_config.current();
        let playlist = self.ingester(&config).load_playlist(false).await?;
        let settings = self.settings.load()?;
        let selection = settings.selection(view);
        let mut groups: Vec<GroupEntry> = playlist.view_keys(view).into_iter()
            .map(|key| GroupEntry {
                key: key.clone(),
                label: config.output.group_label(key).to_string(),
                selected: selection.contains(key),
            })
            .collect();
        groups.sort_by_cached_key(|group| group.label.to_lowercase());
        Ok(groups)
    }

    /// Writes the bouquets of the given groups, an empty list uses the saved selection of the view.
    pub async fn create_bouquets(&self, view: ViewType, keys: &[String]) -> Result<WrittenFiles, VavooError> {
        let config = self.app_config.current();
        let mut keys = keys.to_vec();
        self.update_settings(&config, |settings| {
            if keys.is_empty() {
                keys = settings.selection(view).to_vec();
            }
            settings.current_view = view;
            settings.set_selection(view, &keys);
        }).await?;

        let selected: Vec<String> = keys.into_iter()
            .filter(|key| {
                let visible = view.matches(key);
                if !visible {
                    warn!("Group {key} is not part of the {view} view, skipping");
                }
                visible
            })
            .collect();
        if selected.is_empty() {
            info!("No groups selected for view {view}");
            return Ok(WrittenFiles::default());
        }

        let playlist = self.ingester(&config).load_playlist(false).await?;
        let signature_provider = create_signature_provider(&self.client, &config.signature)?;
        let result = self.writer(&config).write(&playlist, &selected, signature_provider.as_ref()).await?;

        let exported: Vec<String> = selected.into_iter()
            .filter(|key| result.written.contains(&OutputConfig::bouquet_filename(key)))
            .collect();
        self.update_favourites(&config, |favourites| favourites.record_export(&exported, view)).await;
        Ok(result)
    }

    pub async fn remove_bouquets(&self, keys: &[String]) -> Result<RemovedFiles, VavooError> {
        let config = self.app_config.current();
        let result = self.writer(&config).remove(keys).await?;
        self.update_favourites(&config, |favourites| favourites.remove(keys)).await;
        Ok(result)
    }

    pub async fn remove_all_bouquets(&self) -> Result<RemovedFiles, VavooError> {
        let config = self.app_config.current();
        let result = self.writer(&config).remove_all().await?;
        self.update_favourites(&config, FavouritesRepository::clear).await;
        Ok(result)
    }

    /// Re-downloads the channel list and rewrites every favourite group.
    /// Returns `None` when another update is still running.
    pub async fn run_scheduled_update(&self) -> Result<Option<UpdateReport>, VavooError> {
        let Some(_permit) = self.update_guard.try_update() else {
            warn!("Bouquet update already in progress, skipping");
            return Ok(None);
        };

        let config = self.app_config.current();
        let favourites = {
            let repository = Self::favourites_repository(&config);
            let _lock = self.app_config.file_locks.read_lock(repository.path()).await;
            repository.load()
        };
        if favourites.is_empty() {
            info!("No favourite groups, nothing to update");
            return Ok(Some(UpdateReport::default()));
        }

        let playlist = self.ingester(&config).load_playlist(true).await?;
        let signature_provider = create_signature_provider(&self.client, &config.signature)?;
        let writer = self.writer(&config);

        let mut report = UpdateReport::default();
        for record in &favourites.records {
            let keys = [record.group.clone()];
            match writer.write(&playlist, &keys, signature_provider.as_ref()).await {
                Ok(result) if result.has_changes() => report.updated.push(record.group.clone()),
                Ok(_) => {
                    warn!("Favourite group {} ({}) produced no bouquet", record.group, record.view);
                    report.failed.push(record.group.clone());
                }
                Err(err) => {
                    error!("Failed to update favourite group {}: {err}", record.group);
                    report.failed.push(record.group.clone());
                }
            }
        }

        if !report.updated.is_empty() {
            let last_update = format_last_update(&chrono::Local::now());
            self.update_settings(&config, |settings| settings.last_update = Some(last_update.clone())).await?;
            report.last_update = Some(last_update);
        }
        self.app_config.file_locks.prune_unused_locks().await;
        info!("Scheduled update finished, {} updated, {} failed", report.updated.len(), report.failed.len());
        Ok(Some(report))
    }
}

use crate::error::{network_err, VavooError};
use crate::model::{Config, GroupedPlaylist, RawEntry, SourceConfig};
use crate::processing::parser::vavoo::{group_entries, parse_vavoo_document};
use crate::repository::playlist_cache::PlaylistCache;
use crate::utils::network::request;
use crate::utils::FileLockManager;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::task::spawn_blocking;

/// Downloads the channel list and keeps the grouped result in the playlist cache.
pub struct PlaylistIngester {
    client: reqwest::Client,
    source: SourceConfig,
    cache: PlaylistCache,
    file_locks: Arc<FileLockManager>,
}

impl PlaylistIngester {
    pub fn new(client: reqwest::Client, config: &Config, file_locks: Arc<FileLockManager>) -> Self {
        Self {
            client,
            source: config.source.clone(),
            cache: PlaylistCache::new(&config.working_path()),
            file_locks,
        }
    }

    pub async fn fetch(&self) -> Result<Vec<RawEntry>, VavooError> {
        let document = request::get_json(&self.client, &self.source.url, self.source.timeout()).await?;
        spawn_blocking(move || parse_vavoo_document(&document))
            .await
            .map_err(|err| network_err!("Parsing channel list failed: {err}"))?
    }

    async fn load_cache(&self) -> Option<GroupedPlaylist> {
        let _lock = self.file_locks.read_lock(self.cache.path()).await;
        let cache = self.cache.clone();
        let max_age = self.source.cache_max_age();
        spawn_blocking(move || cache.load(max_age)).await.ok().flatten()
    }

    async fn save_cache(&self, playlist: &GroupedPlaylist) {
        let _lock = self.file_locks.write_lock(self.cache.path()).await;
        let cache = self.cache.clone();
        let playlist = playlist.clone();
        match spawn_blocking(move || cache.save(&playlist)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("{err}"),
            Err(err) => error!("Saving playlist cache failed: {err}"),
        }
    }

    async fn download(&self) -> Result<GroupedPlaylist, VavooError> {
        let entries = self.fetch().await?;
        let source = self.source.clone();
        let playlist = spawn_blocking(move || group_entries(entries, &source))
            .await
            .map_err(|err| network_err!("Grouping channel list failed: {err}"))?;
        info!("Downloaded channel list with {} channels in {} groups", playlist.channel_count(), playlist.len());
        Ok(playlist)
    }

    /// Returns the cached playlist while it is fresh, unless `force_refresh` is set.
    /// A failed download falls back to a fresh cache.
    pub async fn load_playlist(&self, force_refresh: bool) -> Result<GroupedPlaylist, VavooError> {
        if !force_refresh {
            if let Some(playlist) = self.load_cache().await {
                info!("Using cached channel list with {} groups", playlist.len());
                return Ok(playlist);
            }
        }

        match self.download().await {
            Ok(playlist) => {
                self.save_cache(&playlist).await;
                Ok(playlist)
            }
            Err(err) => {
                warn!("Failed to download channel list: {err}");
                match self.load_cache().await {
                    Some(playlist) => {
                        info!("Falling back to cached channel list with {} groups", playlist.len());
                        Ok(playlist)
                    }
                    None => Err(network_err!("playlist unavailable")),
                }
            }
        }
    }
}

use crate::error::{io_err, VavooError};
use crate::model::GroupedPlaylist;
use crate::utils::{get_file_age, open_readonly_file, file_reader, remove_file_if_exists, write_file_atomic, PLAYLIST_CACHE_FILE};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CACHE_VERSION: u8 = 1;

#[derive(Serialize, Deserialize)]
struct CacheDocument {
    version: u8,
    playlist: GroupedPlaylist,
}

/// Grouped playlist on disk, valid for `max_age` after the last write.
#[derive(Debug, Clone)]
pub struct PlaylistCache {
    path: PathBuf,
}

impl PlaylistCache {
    pub fn new(working_dir: &Path) -> Self {
        Self { path: working_dir.join(PLAYLIST_CACHE_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` when the cache is missing, unreadable or older than `max_age`.
    /// An expired cache file is deleted.
    pub fn load(&self, max_age: Duration) -> Option<GroupedPlaylist> {
        let age = match get_file_age(&self.path) {
            Ok(age) => age,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read playlist cache {}: {err}", self.path.display());
                }
                return None;
            }
        };

        if age > max_age {
            info!("Playlist cache expired ({}s old), removing {}", age.as_secs(), self.path.display());
            if let Err(err) = remove_file_if_exists(&self.path) {
                error!("Failed to remove expired playlist cache {}: {err}", self.path.display());
            }
            return None;
        }

        let file = open_readonly_file(&self.path)
            .map_err(|err| warn!("Failed to open playlist cache {}: {err}", self.path.display()))
            .ok()?;
        match serde_json::from_reader::<_, CacheDocument>(file_reader(file)) {
            Ok(doc) if doc.version == CACHE_VERSION => {
                debug!("Loaded playlist cache with {} groups", doc.playlist.len());
                Some(doc.playlist)
            }
            Ok(doc) => {
                warn!("Ignoring playlist cache with version {}", doc.version);
                None
            }
            Err(err) => {
                warn!("Ignoring corrupt playlist cache {}: {err}", self.path.display());
                None
            }
        }
    }

    pub fn save(&self, playlist: &GroupedPlaylist) -> Result<(), VavooError> {
        let doc = CacheDocument { version: CACHE_VERSION, playlist: playlist.clone() };
        let content = serde_json::to_vec(&doc)
            .map_err(|err| io_err!("Failed to serialize playlist cache: {err}"))?;
        write_file_atomic(&self.path, &content)
            .map_err(|err| io_err!("Failed to write playlist cache {}: {err}", self.path.display()))?;
        debug!("Persisted playlist cache {}", self.path.display());
        Ok(())
    }
}

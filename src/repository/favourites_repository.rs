use crate::error::{io_err, VavooError};
use crate::model::{Favourites, ViewType};
use crate::utils::{current_time_secs, write_file_atomic, FAVOURITES_FILE};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// The list of exported groups the scheduled update refreshes.
pub struct FavouritesRepository {
    path: PathBuf,
}

impl FavouritesRepository {
    pub fn new(working_dir: &Path) -> Self {
        Self { path: working_dir.join(FAVOURITES_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Favourites {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!("Failed to parse favourites file {}: {err}", self.path.display());
                Favourites::default()
            }),
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read favourites file {}: {err}", self.path.display());
                }
                Favourites::default()
            }
        }
    }

    pub fn save(&self, favourites: &Favourites) -> Result<(), VavooError> {
        let content = serde_json::to_vec_pretty(favourites)
            .map_err(|err| io_err!("Failed to serialize favourites: {err}"))?;
        write_file_atomic(&self.path, &content)
            .map_err(|err| io_err!("Failed to write favourites file {}: {err}", self.path.display()))
    }

    pub fn record_export(&self, groups: &[String], view: ViewType) -> Result<(), VavooError> {
        if groups.is_empty() {
            return Ok(());
        }
        let mut favourites = self.load();
        let now = current_time_secs();
        for group in groups {
            favourites.upsert(group, view, now);
        }
        self.save(&favourites)
    }

    pub fn remove(&self, groups: &[String]) -> Result<(), VavooError> {
        let mut favourites = self.load();
        if favourites.remove(groups) {
            self.save(&favourites)?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<(), VavooError> {
        self.save(&Favourites::default())
    }
}

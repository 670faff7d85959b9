use crate::error::{io_err, VavooError};
use crate::model::{Channel, Config, GroupedPlaylist, OutputConfig};
use crate::repository::bouquet_index::BouquetIndex;
use crate::utils::network::reload::reload_bouquets;
use crate::utils::network::signature::SignatureProvider;
use crate::utils::{list_files_with_prefix, remove_file_if_exists, write_file_atomic, FileLockManager, BOUQUET_FILE_PREFIX, BOUQUET_FILE_SUFFIX};
use log::{error, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::task::spawn_blocking;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    /// bouquet file names
    pub written: Vec<String>,
    /// group keys without channels
    pub skipped_empty: Vec<String>,
    /// group keys whose file could not be written
    pub failed: Vec<String>,
}

impl WrittenFiles {
    pub fn has_changes(&self) -> bool {
        !self.written.is_empty()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovedFiles {
    pub removed: Vec<String>,
    pub missing: Vec<String>,
    pub failed: Vec<String>,
    pub index_lines: usize,
}

impl RemovedFiles {
    pub fn has_changes(&self) -> bool {
        !self.removed.is_empty() || self.index_lines > 0
    }
}

struct BouquetJob {
    key: String,
    filename: String,
    label: String,
    channels: Vec<Channel>,
}

/// Appends the auth query and user agent, every `:` becomes `%3a`.
pub fn encode_stream_url(url: &str, signature: &str, user_agent: &str) -> String {
    format!("{}?n=1&b=5&vavoo_auth={signature}#User-Agent={user_agent}", url.trim())
        .replace(':', "%3a")
}

pub fn render_bouquet(label: &str, channels: &[Channel], signature: &str, output: &OutputConfig) -> String {
    let mut lines = Vec::with_capacity(channels.len() + 1);
    lines.push(format!("#NAME {label}"));
    for channel in channels {
        let encoded_url = encode_stream_url(&channel.url, signature, &output.stream_user_agent);
        lines.push(format!("#SERVICE {}:0:1:1:1:1:CCCC0000:0:0:0:{encoded_url}:{}", output.service_type, channel.name));
    }
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

fn write_bouquets(output: &OutputConfig, index: &BouquetIndex, jobs: Vec<BouquetJob>, signature: &str) -> Result<WrittenFiles, VavooError> {
    let bouquet_dir = output.bouquet_dir_path();
    let mut result = WrittenFiles::default();
    for job in jobs {
        if job.channels.is_empty() {
            info!("Group {} has no channels, skipping", job.key);
            result.skipped_empty.push(job.key);
            continue;
        }
        let filename = job.filename;
        let content = render_bouquet(&job.label, &job.channels, signature, output);
        match write_file_atomic(&bouquet_dir.join(&filename), content.as_bytes()) {
            Ok(()) => {
                info!("Created bouquet {filename} with {} channels", job.channels.len());
                result.written.push(filename);
            }
            Err(err) => {
                error!("Failed to write bouquet {filename}: {err}");
                result.failed.push(job.key);
            }
        }
    }

    if !result.written.is_empty() {
        index.add_references(&result.written)
            .map_err(|err| io_err!("Failed to update bouquet index {}: {err}", index.path().display()))?;
    }
    Ok(result)
}

fn remove_bouquet_files(bouquet_dir: &Path, index: &BouquetIndex, filenames: &[String], index_patterns: &[String]) -> Result<RemovedFiles, VavooError> {
    let mut result = RemovedFiles::default();
    for filename in filenames {
        match remove_file_if_exists(&bouquet_dir.join(filename)) {
            Ok(true) => {
                info!("Removed bouquet {filename}");
                result.removed.push(filename.clone());
            }
            Ok(false) => {
                info!("Bouquet {filename} does not exist");
                result.missing.push(filename.clone());
            }
            Err(err) => {
                error!("Failed to remove bouquet {filename}: {err}");
                result.failed.push(filename.clone());
            }
        }
    }
    result.index_lines = index.remove_references(index_patterns)
        .map_err(|err| io_err!("Failed to update bouquet index {}: {err}", index.path().display()))?;
    Ok(result)
}

/// Renders bouquet files and keeps the index in sync. All operations hold the
/// write lock of the bouquet directory.
pub struct BouquetWriter {
    client: reqwest::Client,
    output: OutputConfig,
    index: BouquetIndex,
    file_locks: Arc<FileLockManager>,
}

impl BouquetWriter {
    pub fn new(client: reqwest::Client, config: &Config, file_locks: Arc<FileLockManager>) -> Self {
        let output = config.output.clone();
        let index = BouquetIndex::new(output.index_file_path(), output.bouquet_dir_path());
        Self { client, output, index, file_locks }
    }

    fn collect_jobs(&self, grouped: &GroupedPlaylist, selected_keys: &[String]) -> Vec<BouquetJob> {
        let mut jobs: Vec<BouquetJob> = Vec::with_capacity(selected_keys.len());
        for key in selected_keys {
            if jobs.iter().any(|job| &job.key == key) {
                continue;
            }
            if let Some(channels) = grouped.get(key) {
                let filename = OutputConfig::bouquet_filename(key);
                if let Some(other) = jobs.iter().find(|job| job.filename == filename) {
                    warn!("Group {key} maps to bouquet {filename} of group {}, skipping", other.key);
                    continue;
                }
                let mut channels = channels.clone();
                channels.sort();
                jobs.push(BouquetJob { key: key.clone(), filename, label: self.output.group_label(key).to_string(), channels });
            } else {
                info!("Group {key} is not part of the channel list, skipping");
            }
        }
        jobs.sort_by_cached_key(|job| job.label.to_lowercase());
        jobs
    }

    async fn reload(&self) {
        reload_bouquets(&self.client, self.output.reload_url.as_deref()).await;
    }

    pub async fn write(&self, grouped: &GroupedPlaylist, selected_keys: &[String],
                       signature_provider: &dyn SignatureProvider) -> Result<WrittenFiles, VavooError> {
        let jobs = self.collect_jobs(grouped, selected_keys);
        if jobs.is_empty() {
            return Ok(WrittenFiles::default());
        }
        let signature = signature_provider.signature().await?;

        let result = {
            let _lock = self.file_locks.write_lock(&self.output.bouquet_dir_path()).await;
            let output = self.output.clone();
            let index = self.index.clone();
            spawn_blocking(move || write_bouquets(&output, &index, jobs, &signature))
                .await
                .map_err(|err| io_err!("Writing bouquets failed: {err}"))??
        };

        if result.has_changes() {
            self.reload().await;
        }
        Ok(result)
    }

    pub async fn remove(&self, keys: &[String]) -> Result<RemovedFiles, VavooError> {
        let mut filenames: Vec<String> = Vec::with_capacity(keys.len());
        for filename in keys.iter().map(|key| OutputConfig::bouquet_filename(key)) {
            if !filenames.contains(&filename) {
                filenames.push(filename);
            }
        }
        let patterns = filenames.clone();
        self.remove_files(filenames, patterns).await
    }

    /// Removes every `userbouquet.vavoo*.tv` in the bouquet directory.
    pub async fn remove_all(&self) -> Result<RemovedFiles, VavooError> {
        let bouquet_dir = self.output.bouquet_dir_path();
        let filenames = match list_files_with_prefix(&bouquet_dir, BOUQUET_FILE_PREFIX, BOUQUET_FILE_SUFFIX) {
            Ok(files) => files,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(io_err!("Failed to list bouquet directory {}: {err}", bouquet_dir.display())),
        };
        self.remove_files(filenames, vec![BOUQUET_FILE_PREFIX.to_string()]).await
    }

    async fn remove_files(&self, filenames: Vec<String>, patterns: Vec<String>) -> Result<RemovedFiles, VavooError> {
        let result = {
            let bouquet_dir = self.output.bouquet_dir_path();
            let _lock = self.file_locks.write_lock(&bouquet_dir).await;
            let index = self.index.clone();
            spawn_blocking(move || remove_bouquet_files(&bouquet_dir, &index, &filenames, &patterns))
                .await
                .map_err(|err| io_err!("Removing bouquets failed: {err}"))??
        };

        if result.has_changes() {
            self.reload().await;
        }
        Ok(result)
    }
}

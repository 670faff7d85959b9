use crate::error::{config_err_res, VavooError};
use crate::utils::{default_bouquet_dir, default_index_file, default_service_type, default_user_agent, make_path_absolute, sanitize_bouquet_name, BOUQUET_FILE_PREFIX, BOUQUET_FILE_SUFFIX};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_bouquet_dir")]
    pub bouquet_dir: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_service_type")]
    pub service_type: u32,
    // user agent the receiver sends when playing the stream
    #[serde(default = "default_user_agent")]
    pub stream_user_agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload_url: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub group_titles: HashMap<String, String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bouquet_dir: default_bouquet_dir(),
            index_file: default_index_file(),
            service_type: default_service_type(),
            stream_user_agent: default_user_agent(),
            reload_url: None,
            group_titles: HashMap::new(),
        }
    }
}

impl OutputConfig {
    pub(crate) fn prepare(&mut self, config_path: &str) -> Result<(), VavooError> {
        if self.bouquet_dir.trim().is_empty() {
            return config_err_res!("Output bouquet_dir can't be empty");
        }
        self.bouquet_dir = make_path_absolute(self.bouquet_dir.trim(), config_path).to_string_lossy().to_string();
        if self.index_file.trim().is_empty() {
            self.index_file = default_index_file();
        }
        if let Some(reload_url) = self.reload_url.as_ref() {
            if url::Url::parse(reload_url.trim()).is_err() {
                return config_err_res!("Invalid reload url: {reload_url}");
            }
        }
        Ok(())
    }

    pub fn bouquet_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.bouquet_dir)
    }

    /// The index file is relative to the bouquet directory unless absolute.
    pub fn index_file_path(&self) -> PathBuf {
        make_path_absolute(&self.index_file, &self.bouquet_dir)
    }

    /// Human readable label of a group, falls back to the key itself.
    pub fn group_label<'a>(&'a self, group_key: &'a str) -> &'a str {
        self.group_titles.get(group_key).map_or(group_key, String::as_str)
    }

    pub fn bouquet_filename(group_key: &str) -> String {
        format!("{BOUQUET_FILE_PREFIX}{}{BOUQUET_FILE_SUFFIX}", sanitize_bouquet_name(group_key))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::OutputConfig;

    #[test]
    fn test_bouquet_filename() {
        assert_eq!(OutputConfig::bouquet_filename("United Kingdom"), "userbouquet.vavoo.united_kingdom.tv");
    }

    #[test]
    fn test_index_file_path() {
        let mut output = OutputConfig { bouquet_dir: "enigma2".to_string(), ..OutputConfig::default() };
        output.prepare("/etc/vavoo").unwrap();
        assert_eq!(output.index_file_path().to_str(), Some("/etc/vavoo/enigma2/bouquets.tv"));
    }

    #[test]
    fn test_group_label() {
        let mut output = OutputConfig::default();
        output.group_titles.insert("Germany".to_string(), "Deutschland".to_string());
        assert_eq!(output.group_label("Germany"), "Deutschland");
        assert_eq!(output.group_label("Italy"), "Italy");
    }
}

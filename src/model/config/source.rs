use crate::error::{config_err_res, VavooError};
use crate::utils::{default_cache_max_age_secs, default_fetch_timeout_ms, default_source_url, default_stream_base_url, default_user_agent};
use std::time::Duration;

/// Where the channel list comes from and how stream urls are built.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub url: String,
    #[serde(default = "default_stream_base_url")]
    pub stream_base_url: String,
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            stream_base_url: default_stream_base_url(),
            timeout_ms: default_fetch_timeout_ms(),
            user_agent: default_user_agent(),
            cache_max_age_secs: default_cache_max_age_secs(),
        }
    }
}

impl SourceConfig {
    pub(crate) fn prepare(&mut self) -> Result<(), VavooError> {
        if url::Url::parse(self.url.trim()).is_err() {
            return config_err_res!("Invalid source url: {}", self.url);
        }
        self.url = self.url.trim().to_string();
        self.stream_base_url = self.stream_base_url.trim().trim_end_matches('/').to_string();
        if self.timeout_ms == 0 {
            self.timeout_ms = default_fetch_timeout_ms();
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    pub fn stream_url(&self, channel_id: &str) -> String {
        format!("{}/live2/play/{channel_id}.ts", self.stream_base_url)
    }
}

#[cfg(test)]
mod tests {
    use crate::model::SourceConfig;

    #[test]
    fn test_stream_url() {
        let mut source = SourceConfig { stream_base_url: "https://vavoo.to/".to_string(), ..SourceConfig::default() };
        source.prepare().unwrap();
        assert_eq!(source.stream_url("123"), "https://vavoo.to/live2/play/123.ts");
    }

    #[test]
    fn test_invalid_url() {
        let mut source = SourceConfig { url: "not a url".to_string(), ..SourceConfig::default() };
        assert!(source.prepare().is_err());
    }
}

use crate::error::VavooError;
use crate::model::{LogConfig, OutputConfig, ScheduleConfig, SignatureConfig, SourceConfig};
use crate::utils::{default_as_true, default_working_dir, make_path_absolute};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_path: String,
    pub config_file_path: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_working_dir")]
    pub working_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub signature: SignatureConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default = "default_as_true")]
    pub config_hot_reload: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            log: None,
            source: SourceConfig::default(),
            signature: SignatureConfig::default(),
            output: OutputConfig::default(),
            schedule: ScheduleConfig::default(),
            config_hot_reload: true,
        }
    }
}

impl Config {
    pub fn prepare(&mut self, config_path: &str) -> Result<(), VavooError> {
        self.working_dir = make_path_absolute(self.working_dir.trim(), config_path).to_string_lossy().to_string();
        self.source.prepare()?;
        self.signature.prepare()?;
        self.output.prepare(config_path)?;
        self.schedule.prepare()?;
        Ok(())
    }

    pub fn working_path(&self) -> PathBuf {
        PathBuf::from(&self.working_dir)
    }
}

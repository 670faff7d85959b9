use crate::error::{config_err_res, VavooError};
use crate::utils::{default_signature_field, default_signature_timeout_ms};
use std::time::Duration;

/// How the auth token appended to every stream url is obtained.
/// A `static_value` wins over the remote `url`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default = "default_signature_field")]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_value: Option<String>,
    #[serde(default = "default_signature_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            url: None,
            payload: None,
            field: default_signature_field(),
            static_value: None,
            timeout_ms: default_signature_timeout_ms(),
        }
    }
}

impl SignatureConfig {
    pub(crate) fn prepare(&mut self) -> Result<(), VavooError> {
        if let Some(url) = self.url.as_ref() {
            if url::Url::parse(url.trim()).is_err() {
                return config_err_res!("Invalid signature url: {url}");
            }
        }
        if self.field.trim().is_empty() {
            self.field = default_signature_field();
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

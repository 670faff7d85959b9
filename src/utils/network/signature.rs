use crate::error::{config_err, network_err, VavooError};
use crate::model::SignatureConfig;
use crate::utils::network::request;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

/// Supplies the auth token that is appended to every stream url.
pub trait SignatureProvider: Send + Sync {
    fn signature(&self) -> BoxFuture<'_, Result<String, VavooError>>;
}

pub struct StaticSignature {
    value: String,
}

impl StaticSignature {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl SignatureProvider for StaticSignature {
    fn signature(&self) -> BoxFuture<'_, Result<String, VavooError>> {
        futures::future::ready(Ok(self.value.clone())).boxed()
    }
}

/// Posts the configured payload and reads the token from a field of the json answer.
pub struct RemoteSignature {
    client: reqwest::Client,
    url: String,
    payload: serde_json::Value,
    field: String,
    timeout: Duration,
}

impl RemoteSignature {
    pub fn new(client: reqwest::Client, config: &SignatureConfig, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
            payload: config.payload.clone().unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
            field: config.field.clone(),
            timeout: config.timeout(),
        }
    }
}

impl SignatureProvider for RemoteSignature {
    fn signature(&self) -> BoxFuture<'_, Result<String, VavooError>> {
        async move {
            let response = request::post_json(&self.client, &self.url, &self.payload, self.timeout).await?;
            let sig = extract_signature(&response, &self.field)
                .ok_or_else(|| network_err!("Signature response of {} has no field {}", self.url, self.field))?;
            debug!("Received signature from {}", self.url);
            Ok(sig)
        }.boxed()
    }
}

fn extract_signature(response: &serde_json::Value, field: &str) -> Option<String> {
    match response.get(field)? {
        serde_json::Value::String(value) if !value.is_empty() => Some(value.clone()),
        serde_json::Value::Null | serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

pub fn create_signature_provider(client: &reqwest::Client, config: &SignatureConfig) -> Result<Arc<dyn SignatureProvider>, VavooError> {
    if let Some(value) = config.static_value.as_ref().filter(|v| !v.trim().is_empty()) {
        return Ok(Arc::new(StaticSignature::new(value.trim())));
    }
    match config.url.as_ref() {
        Some(url) => Ok(Arc::new(RemoteSignature::new(client.clone(), config, url.trim()))),
        None => Err(config_err!("No signature source configured, set signature.url or signature.static_value")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use crate::model::SignatureConfig;
    use crate::utils::network::signature::{create_signature_provider, extract_signature};

    #[test]
    fn test_extract_signature() {
        assert_eq!(extract_signature(&json!({"addonSig": "abc"}), "addonSig"), Some("abc".to_string()));
        assert_eq!(extract_signature(&json!({"addonSig": ""}), "addonSig"), None);
        assert_eq!(extract_signature(&json!({"other": "abc"}), "addonSig"), None);
    }

    #[tokio::test]
    async fn test_static_signature_wins() {
        let config = SignatureConfig {
            url: Some("https://example.org/ping".to_string()),
            static_value: Some("static-sig".to_string()),
            ..SignatureConfig::default()
        };
        let provider = create_signature_provider(&reqwest::Client::new(), &config).unwrap();
        assert_eq!(provider.signature().await.unwrap(), "static-sig");
    }

    #[test]
    fn test_missing_signature_source() {
        assert!(create_signature_provider(&reqwest::Client::new(), &SignatureConfig::default()).is_err());
    }
}

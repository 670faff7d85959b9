use crate::error::{network_err, parse_err, VavooError};
use crate::model::Config;
use crate::utils::debug_if_enabled;
use log::error;
use reqwest::StatusCode;
use std::time::Duration;

pub fn format_http_status(status: StatusCode) -> String {
    let code = status.as_u16();
    match status.canonical_reason() {
        Some(reason) => format!("{code} {reason}"),
        None => code.to_string(),
    }
}

pub fn create_client(config: &Config) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(config.source.user_agent.as_str())
        .connect_timeout(config.source.timeout())
}

fn map_request_error(url: &str, err: &reqwest::Error) -> VavooError {
    if err.is_timeout() {
        network_err!("Request timed out {url}")
    } else {
        network_err!("Request failed {url}: {err}")
    }
}

async fn read_json_response(url: &str, response: reqwest::Response) -> Result<serde_json::Value, VavooError> {
    let status = response.status();
    if !status.is_success() {
        return Err(network_err!("Request failed with status {} {url}", format_http_status(status)));
    }
    let bytes = response.bytes().await.map_err(|err| map_request_error(url, &err))?;
    serde_json::from_slice::<serde_json::Value>(&bytes)
        .map_err(|err| parse_err!("Response of {url} is no valid json: {err}"))
}

/// GET with a hard timeout, the body has to be json.
pub async fn get_json(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<serde_json::Value, VavooError> {
    debug_if_enabled!("Downloading {}", url);
    let response = client.get(url).timeout(timeout).send().await
        .map_err(|err| {
            let vavoo_err = map_request_error(url, &err);
            error!("{vavoo_err}");
            vavoo_err
        })?;
    read_json_response(url, response).await
}

pub async fn post_json(client: &reqwest::Client, url: &str, payload: &serde_json::Value, timeout: Duration) -> Result<serde_json::Value, VavooError> {
    debug_if_enabled!("Posting to {}", url);
    let response = client.post(url).json(payload).timeout(timeout).send().await
        .map_err(|err| map_request_error(url, &err))?;
    read_json_response(url, response).await
}

/// GET where only the status code matters.
pub async fn get_status(client: &reqwest::Client, url: &str, timeout: Duration) -> Result<(), VavooError> {
    let response = client.get(url).timeout(timeout).send().await
        .map_err(|err| map_request_error(url, &err))?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(network_err!("Request failed with status {} {url}", format_http_status(status)))
    }
}

use crate::utils::network::request;
use log::{info, warn};
use std::time::Duration;

const RELOAD_TIMEOUT: Duration = Duration::from_secs(5);

/// Asks the receiver to re-read its bouquets. A failure only means the user has to reload manually.
pub async fn reload_bouquets(client: &reqwest::Client, reload_url: Option<&str>) {
    if let Some(url) = reload_url {
        match request::get_status(client, url, RELOAD_TIMEOUT).await {
            Ok(()) => info!("Bouquet reload triggered"),
            Err(err) => warn!("Failed to trigger bouquet reload: {err}"),
        }
    }
}

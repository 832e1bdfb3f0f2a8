// Keepalive pinger - periodically GETs our own public URL so the hosting
// platform does not idle the process out.

use std::time::Duration;

const PING_INTERVAL: Duration = Duration::from_secs(300);
const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Ping `url` forever. Every outcome is logged; nothing escapes the loop.
pub async fn ping_loop(url: String) {
    let client = match reqwest::Client::builder().timeout(PING_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build keepalive HTTP client: {}", e);
            return;
        }
    };

    loop {
        match client.get(&url).send().await {
            Ok(response) => tracing::info!("Keepalive ping {} -> {}", url, response.status()),
            Err(e) => tracing::warn!("Keepalive ping to {} failed: {}", url, e),
        }

        tokio::time::sleep(PING_INTERVAL).await;
    }
}

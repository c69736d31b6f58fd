use anyhow::{Context, Result};
use tracing::info;

/// Entry URL; the canton redirects it to the current situation page.
pub const START_URL: &str = "https://www.be.ch/corona";

/// One GET, redirects followed, non-2xx is an error. No retries: if the page
/// is down the run fails and the next scheduled run tries again.
pub async fn fetch_page(url: &str) -> Result<String> {
    info!("Fetching {}", url);
    let client = reqwest::Client::new();
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()?
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;
    Ok(body)
}

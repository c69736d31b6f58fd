use anyhow::{bail, Context, Result};
use tracing::info;

use crate::config::NotifyConfig;

/// Event type the downstream publishing workflow listens for.
const EVENT_TYPE: &str = "update";

const USER_AGENT: &str = concat!("be_covid_scraper/", env!("CARGO_PKG_VERSION"));

fn dispatch_url(repo: &str) -> String {
    format!("https://api.github.com/repos/{}/dispatches", repo)
}

fn payload() -> serde_json::Value {
    serde_json::json!({ "event_type": EVENT_TYPE })
}

/// Fire one repository_dispatch event so the publishing pipeline re-runs.
pub async fn dispatch(cfg: &NotifyConfig) -> Result<()> {
    let url = dispatch_url(&cfg.repo);
    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .basic_auth(&cfg.username, Some(&cfg.token))
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .json(&payload())
        .send()
        .await
        .with_context(|| format!("POST {} failed", url))?;

    if !resp.status().is_success() {
        bail!("repository dispatch rejected: {}", resp.status());
    }
    info!("Dispatched '{}' event to {}", EVENT_TYPE, cfg.repo);
    Ok(())
}

// ── Tests ──

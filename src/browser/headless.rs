use anyhow::{anyhow, Result};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Launch a headless browser and navigate to the given URL.
pub async fn launch_headless_browser(url: &str) -> Result<(Browser, Page)> {
    info!("🚀 Launching headless browser...");
    debug!("Target URL: {}", url);

    let config = BrowserConfig::builder()
        .new_headless_mode()
        .args(vec![
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-search-engine-choice-screen",
            "--window-size=1920,1080",
        ])
        .build()
        .map_err(|e| {
            error!("Headless browser configuration failed: {}", e);
            anyhow!("headless browser configuration failed: {e}")
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("Headless browser launch failed: {}", e);
        anyhow!("headless browser launch failed: {e}")
    })?;
    debug!("Headless browser is up");

    // Drain browser events in the background.
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // Short settle delay so browser state is synchronized.
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page(url).await.map_err(|e| {
        error!("Page creation failed: {}", e);
        anyhow!("page creation failed: {e}")
    })?;

    info!("✅ Headless browser navigated to: {}", url);
    Ok((browser, page))
}

//! Chromium-driven session against the cadastre map service.
//!
//! Everything fragile lives here: the entry URL, the structural paths to
//! the search affordance and the coordinate display fields, and the timing
//! of the service's asynchronous rendering. None of it is visible past the
//! [`ExtractionSession`] trait.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Browser;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::browser::launch_headless_browser;
use crate::config::Config;
use crate::session::executor::PageExecutor;
use crate::session::{ExtractionSession, Outcome};

// Structural paths into the map UI. Brittle against upstream redesigns;
// when the site changes, this block is the whole blast radius.
const SEARCH_BUTTON: &str = r#"//*[@id="map_wrap"]/div[2]/div[1]/div[1]/a[1]"#;
const SEARCH_INPUT: &str = r#"//*[@id="map-search-tabs-1"]//input"#;
const COORDS_PANEL: &str = r#"//*[@id="map-coordinates"]"#;
const X_FIELD: &str = r#"//*[@id="map-coordinates"]/div/span[2]/span/span/input[1]"#;
const Y_FIELD: &str = r#"//*[@id="map-coordinates"]/div/span[3]/span/span/input[1]"#;

/// Settle delay after initial navigation, before the UI is poked.
const PAGE_SETTLE: Duration = Duration::from_secs(3);

pub struct CadastreSession {
    map_url: String,
    query_timeout: Duration,
    render_wait: Duration,
    browser: Option<Browser>,
    executor: Option<PageExecutor>,
}

impl CadastreSession {
    pub fn new(config: &Config) -> Self {
        Self {
            map_url: config.map_url.clone(),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            render_wait: Duration::from_millis(config.render_wait_ms),
            browser: None,
            executor: None,
        }
    }

    fn executor(&self) -> Result<&PageExecutor> {
        self.executor.as_ref().context("session not started")
    }

    /// The fallible body of `query`; the trait impl collapses its errors.
    async fn try_query(&self, id: &str) -> Result<Outcome> {
        let executor = self.executor()?;

        executor
            .require(&exists_js(SEARCH_INPUT), self.query_timeout, "search input")
            .await?;
        executor
            .eval(submit_query_js(id))
            .await
            .context("submitting the id into the search field")?;

        // The service renders asynchronously; give it its floor wait first.
        sleep(self.render_wait).await;

        if !executor
            .wait_until(&exists_js(COORDS_PANEL), self.query_timeout)
            .await
        {
            debug!("No coordinates panel rendered for {id}");
            return Ok(Outcome::NotFound);
        }

        let coords: CoordFields = executor
            .eval_as(read_coords_js())
            .await
            .context("reading the coordinate fields")?;

        match (non_empty(coords.x), non_empty(coords.y)) {
            (Some(x), Some(y)) => Ok(Outcome::Found { x, y }),
            _ => Ok(Outcome::NotFound),
        }
    }
}

#[async_trait]
impl ExtractionSession for CadastreSession {
    async fn start(&mut self) -> Result<()> {
        let (browser, page) = launch_headless_browser(&self.map_url).await?;
        self.browser = Some(browser);
        let executor = PageExecutor::new(page);

        sleep(PAGE_SETTLE).await;

        // Open the search affordance once; it stays open for the whole run.
        executor
            .require(&exists_js(SEARCH_BUTTON), self.query_timeout, "search button")
            .await?;
        executor
            .eval(click_js(SEARCH_BUTTON))
            .await
            .context("opening the map search panel")?;
        info!("✅ Map search panel is open");

        self.executor = Some(executor);
        Ok(())
    }

    async fn query(&mut self, id: &str) -> Outcome {
        match self.try_query(id).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::QueryError(format!("{e:#}")),
        }
    }

    async fn stop(&mut self) {
        self.executor = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser did not close cleanly: {e}");
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CoordFields {
    x: Option<String>,
    y: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `document.evaluate` lookup shared by all snippets.
fn xpath_prelude() -> String {
    r#"const xp = (p) => document.evaluate(p, document, null,
        XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;"#
        .to_string()
}

fn exists_js(xpath: &str) -> String {
    format!(
        "(() => {{ {prelude} return xp({path}) !== null; }})()",
        prelude = xpath_prelude(),
        path = js_str(xpath),
    )
}

fn click_js(xpath: &str) -> String {
    format!(
        "(() => {{ {prelude} xp({path}).click(); return true; }})()",
        prelude = xpath_prelude(),
        path = js_str(xpath),
    )
}

/// Clear the search input, type the id, and submit it.
fn submit_query_js(id: &str) -> String {
    format!(
        r#"(() => {{
            {prelude}
            const input = xp({input});
            input.focus();
            input.value = '';
            input.value = {id};
            input.dispatchEvent(new Event('input', {{ bubbles: true }}));
            const enter = {{ key: 'Enter', code: 'Enter', keyCode: 13, bubbles: true }};
            input.dispatchEvent(new KeyboardEvent('keydown', enter));
            input.dispatchEvent(new KeyboardEvent('keypress', enter));
            input.dispatchEvent(new KeyboardEvent('keyup', enter));
            if (input.form) {{ input.form.requestSubmit ? input.form.requestSubmit() : input.form.submit(); }}
            return true;
        }})()"#,
        prelude = xpath_prelude(),
        input = js_str(SEARCH_INPUT),
        id = js_str(id),
    )
}

/// Read both coordinate display fields; `title` wins over `value`.
fn read_coords_js() -> String {
    format!(
        r#"(() => {{
            {prelude}
            const field = (p) => {{
                const el = xp(p);
                if (!el) return null;
                return el.getAttribute('title') || el.value || null;
            }};
            return {{ x: field({x}), y: field({y}) }};
        }})()"#,
        prelude = xpath_prelude(),
        x = js_str(X_FIELD),
        y = js_str(Y_FIELD),
    )
}

fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

//! Page executor.
//!
//! Sole owner of the `Page` resource; exposes JS evaluation plus a bounded
//! poll, nothing else. Knows nothing about cadastral ids or coordinates.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::sleep;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

pub struct PageExecutor {
    page: Page,
}

impl PageExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// Evaluate JS and return the raw JSON result.
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }

    /// Evaluate JS and deserialize the result.
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let value = self.eval(js_code).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Poll a JS predicate until it is truthy or `timeout` passes.
    ///
    /// Returns `true` on success and `false` on timeout; evaluation errors
    /// inside one poll count as "not yet". Callers decide whether a timeout
    /// is an error or an answer.
    pub async fn wait_until(&self, predicate_js: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.eval_as::<bool>(format!("!!({predicate_js})")).await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => debug!("Predicate poll failed, retrying: {e}"),
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Like [`wait_until`], but a timeout is an error.
    ///
    /// [`wait_until`]: Self::wait_until
    pub async fn require(&self, predicate_js: &str, timeout: Duration, what: &str) -> Result<()> {
        if self.wait_until(predicate_js, timeout).await {
            Ok(())
        } else {
            bail!("timed out after {timeout:?} waiting for {what}");
        }
    }
}

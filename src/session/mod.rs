//! Extraction session boundary.
//!
//! The controller drives the map service only through [`ExtractionSession`];
//! the automation technology and selectors stay swappable behind it. Per-id
//! failures are values of [`Outcome`], never errors, so one bad lookup can
//! never abort a run.

pub mod cadastre;
pub mod executor;

use anyhow::Result;
use async_trait::async_trait;

pub use cadastre::CadastreSession;

/// Result of querying one identifier.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Both coordinate fields rendered; values are kept as display strings.
    Found { x: String, y: String },
    /// The service rendered no coordinates for this id.
    NotFound,
    /// The query itself failed (timeout, detached page, broken selector).
    QueryError(String),
}

/// One exclusively-owned interactive session against the remote service.
///
/// `start` failure is fatal for the run. `stop` must be safe to call at any
/// point, including after a partial startup, and is called on every exit
/// path.
#[async_trait]
pub trait ExtractionSession {
    async fn start(&mut self) -> Result<()>;

    /// Look up one identifier. Must not return an error: anything that goes
    /// wrong inside collapses to [`Outcome::QueryError`].
    async fn query(&mut self, id: &str) -> Outcome;

    async fn stop(&mut self);
}

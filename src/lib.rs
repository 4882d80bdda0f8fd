//! # cadastre_coords
//!
//! Resumable bulk collection of map coordinates for cadastral building ids,
//! spread across many short, wall-clock-limited invocations.
//!
//! ## Architecture
//!
//! ### ① Infrastructure
//! - `browser` - headless browser startup
//! - `session::executor` - sole `Page` owner, exposes eval and bounded polling
//!
//! ### ② Capabilities
//! - `store::ids` - load and normalize the candidate id list
//! - `store::progress` - append-only result store, doubling as the checkpoint
//! - `session` - the `ExtractionSession` boundary and its cadastre impl
//! - `retry` - bounded retry with linear backoff for the save path
//! - `budget` - wall-clock ceiling for one invocation
//!
//! ### ③ Planning
//! - `planner` - order-preserving remaining-work computation
//!
//! ### ④ Orchestration
//! - `app::Runner` - the one-pass state machine; its `RunStatus` maps to
//!   the exit code the external scheduler branches on (0 done, 1 re-run,
//!   2 investigate)

pub mod app;
pub mod browser;
pub mod budget;
pub mod config;
pub mod error;
pub mod logger;
pub mod planner;
pub mod retry;
pub mod session;
pub mod store;

pub use app::{Runner, RunStatus};
pub use config::Config;
pub use error::AppError;
pub use session::{CadastreSession, ExtractionSession, Outcome};
pub use store::{ProgressRecord, ProgressStore};

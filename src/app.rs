//! Run controller.
//!
//! One pass of the resumable loop: load the id list and the checkpoint,
//! plan the remaining work, drive the session item by item under the time
//! budget, persist each result through the save retrier, and report a
//! terminal status the scheduler can branch on.
//!
//! Severity rules: per-item failures become sentinel records and the loop
//! continues; the budget expiring is a graceful stop; only input, session
//! startup, and (optionally) persistence exhaustion abort the run.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::budget::TimeBudgetGuard;
use crate::config::Config;
use crate::planner;
use crate::retry::RetryPolicy;
use crate::session::{ExtractionSession, Outcome};
use crate::store::ids;
use crate::store::progress::{self, ProgressRecord, ProgressStore};

/// Terminal state of one invocation, translated to the process exit code
/// that tells the scheduler whether to invoke again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing left to do; do not re-invoke.
    Completed,
    /// Budget ran out with work remaining; re-invoke.
    NeedsContinuation,
    /// The run itself broke; re-invocation should not be blind.
    FatalError(String),
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::NeedsContinuation => 1,
            RunStatus::FatalError(_) => 2,
        }
    }
}

/// Why the item loop ended.
enum LoopEnd {
    Natural,
    Budget,
}

#[derive(Debug, Default)]
struct RunStats {
    found: usize,
    not_found: usize,
    errored: usize,
    dropped: usize,
}

pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Execute one full pass. Never panics its way out: every exit path
    /// stops the session and maps to a [`RunStatus`].
    pub async fn run<S: ExtractionSession>(&self, session: &mut S) -> RunStatus {
        let budget = TimeBudgetGuard::new(Duration::from_secs(self.config.max_run_secs));
        log_startup(&self.config);

        let all_ids = match ids::load_ids(&self.config.input_path, self.config.fail_on_missing_input)
        {
            Ok(list) => list,
            Err(e) => return fatal(format!("loading the id list: {e}")),
        };

        let store = ProgressStore::new(&self.config.output_path, self.config.strict_checkpoint);
        let completed = match store.load_completed_keys() {
            Ok(keys) => keys,
            Err(e) => return fatal(format!("loading the checkpoint: {e}")),
        };

        let plan = planner::plan(&all_ids, &completed);
        log_plan(all_ids.len(), completed.len(), plan.len());
        if plan.is_empty() {
            info!("✅ Nothing left to do, skipping session startup");
            return RunStatus::Completed;
        }

        if let Err(e) = session.start().await {
            session.stop().await;
            return fatal(format!("starting the extraction session: {e:#}"));
        }

        let outcome = self.process_items(session, &store, &plan, &budget).await;
        session.stop().await;

        match outcome {
            Ok((LoopEnd::Natural, stats)) => {
                log_finish(&stats, &budget, "all planned work done");
                RunStatus::Completed
            }
            Ok((LoopEnd::Budget, stats)) => {
                log_finish(&stats, &budget, "time budget exhausted, work remains");
                RunStatus::NeedsContinuation
            }
            Err(reason) => fatal(reason),
        }
    }

    /// The item loop. Returns `Err` only for conditions configured to be
    /// fatal; everything item-shaped is absorbed into the stats.
    async fn process_items<S: ExtractionSession>(
        &self,
        session: &mut S,
        store: &ProgressStore,
        plan: &[String],
        budget: &TimeBudgetGuard,
    ) -> Result<(LoopEnd, RunStats), String> {
        let retry = RetryPolicy::new(
            self.config.save_attempts,
            Duration::from_millis(self.config.save_backoff_ms),
        );
        let mut stats = RunStats::default();

        for (index, id) in plan.iter().enumerate() {
            if budget.exceeded() {
                info!(
                    "⏳ Time budget reached after {}/{} items, stopping gracefully",
                    index,
                    plan.len()
                );
                return Ok((LoopEnd::Budget, stats));
            }

            info!("🔍 Searching: {} ({}/{})", id, index + 1, plan.len());
            let record = classify(id, session.query(id).await, &mut stats);

            match retry.run("save record", || store.append(&record)).await {
                Ok(()) => {}
                Err(e) if self.config.fail_on_dropped_record => {
                    return Err(format!("persisting the record for {id}: {e}"));
                }
                Err(e) => {
                    stats.dropped += 1;
                    error!("⚠️ Dropping the record for {id}, save retries exhausted: {e}");
                }
            }

            let done = index + 1;
            if self.config.pacing_interval > 0
                && done % self.config.pacing_interval == 0
                && done < plan.len()
            {
                info!(
                    "😴 Pacing pause: {}s after {} items",
                    self.config.pacing_pause_secs, done
                );
                sleep(Duration::from_secs(self.config.pacing_pause_secs)).await;
            }
        }

        Ok((LoopEnd::Natural, stats))
    }
}

/// Collapse a query outcome into the row that gets persisted.
fn classify(id: &str, outcome: Outcome, stats: &mut RunStats) -> ProgressRecord {
    match outcome {
        Outcome::Found { x, y } => {
            stats.found += 1;
            ProgressRecord::new(id, x, y)
        }
        Outcome::NotFound => {
            stats.not_found += 1;
            info!("❓ No coordinates for {id}");
            ProgressRecord::new(id, progress::NOT_FOUND, progress::NOT_FOUND)
        }
        Outcome::QueryError(reason) => {
            stats.errored += 1;
            warn!("⚠️ Query failed for {id}: {reason}");
            ProgressRecord::new(id, progress::ERROR, progress::ERROR)
        }
    }
}

fn fatal(reason: String) -> RunStatus {
    error!("💥 Fatal: {reason}");
    RunStatus::FatalError(reason)
}

// ========== log helpers ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 Run started at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 Ids: {} → {}", config.input_path, config.output_path);
    info!(
        "⏱️ Budget: {}s, pacing every {} items",
        config.max_run_secs, config.pacing_interval
    );
    info!("{}", "=".repeat(60));
}

fn log_plan(total: usize, completed: usize, remaining: usize) {
    info!(
        "📋 {} ids total, {} already done, {} to process",
        total, completed, remaining
    );
}

fn log_finish(stats: &RunStats, budget: &TimeBudgetGuard, reason: &str) {
    let elapsed = budget.elapsed();
    info!("{}", "─".repeat(60));
    info!("🏁 {} ({} min elapsed)", reason, elapsed.as_secs() / 60);
    info!(
        "📊 Found {}, not found {}, errors {}, dropped {}",
        stats.found, stats.not_found, stats.errored, stats.dropped
    );
    info!("{}", "─".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_scheduler_contract() {
        assert_eq!(RunStatus::Completed.exit_code(), 0);
        assert_eq!(RunStatus::NeedsContinuation.exit_code(), 1);
        assert_eq!(RunStatus::FatalError("boom".into()).exit_code(), 2);
    }

    #[test]
    fn found_outcome_keeps_display_strings() {
        let mut stats = RunStats::default();
        let record = classify(
            "68134.4083.606",
            Outcome::Found {
                x: "450123.45".into(),
                y: "4582311.22".into(),
            },
            &mut stats,
        );
        assert_eq!(
            record,
            ProgressRecord::new("68134.4083.606", "450123.45", "4582311.22")
        );
        assert_eq!(stats.found, 1);
    }

    #[test]
    fn not_found_and_errors_become_sentinel_rows() {
        let mut stats = RunStats::default();
        let missing = classify("1", Outcome::NotFound, &mut stats);
        assert_eq!(missing, ProgressRecord::new("1", "Not Found", "Not Found"));

        let failed = classify("2", Outcome::QueryError("timeout".into()), &mut stats);
        assert_eq!(failed, ProgressRecord::new("2", "Error", "Error"));

        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.errored, 1);
    }
}

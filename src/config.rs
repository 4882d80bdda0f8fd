use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// Persistence retries below this are bumped up; a single attempt defeats
/// the point of the retrier.
pub const MIN_SAVE_ATTEMPTS: usize = 3;

/// Run configuration, bundled once and passed in at construction.
///
/// Every knob the run recognizes lives here; there are no ambient globals.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Id list: one cadastral identifier per row, single column, no header.
    pub input_path: String,
    /// Progress store: append-only CSV with a `Code,X,Y` header.
    pub output_path: String,
    /// Map service entry point.
    pub map_url: String,
    /// Wall-clock ceiling for one invocation, in seconds. Pick this with
    /// headroom below the scheduler's hard kill deadline.
    pub max_run_secs: u64,
    /// Pause after every this many processed items; `0` disables pacing.
    pub pacing_interval: usize,
    /// Length of the pacing pause, in seconds.
    pub pacing_pause_secs: u64,
    /// Attempts for one record save (minimum enforced at load).
    pub save_attempts: usize,
    /// Base delay between save attempts; backoff grows linearly from it.
    pub save_backoff_ms: u64,
    /// Ceiling for waiting on the coordinates panel after a query.
    pub query_timeout_secs: u64,
    /// Floor wait after submitting a query, before polling for the panel.
    pub render_wait_ms: u64,
    /// `true`: a missing id list aborts the run. `false`: a placeholder
    /// list is synthesized so a first run on a fresh machine can set up.
    pub fail_on_missing_input: bool,
    /// `true`: a corrupt progress store aborts the run instead of degrading
    /// to an empty checkpoint (which reprocesses everything).
    pub strict_checkpoint: bool,
    /// `true`: exhausting save retries aborts the run instead of dropping
    /// the record and moving on.
    pub fail_on_dropped_record: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "All_Sofia_IDs.csv".to_string(),
            output_path: "Gathered_Sofia_Coords.csv".to_string(),
            map_url: "https://kais.cadastre.bg/bg/Map".to_string(),
            // 95% of a six hour runner slot.
            max_run_secs: 20_520,
            pacing_interval: 50,
            pacing_pause_secs: 15,
            save_attempts: 3,
            save_backoff_ms: 500,
            query_timeout_secs: 15,
            render_wait_ms: 2_000,
            fail_on_missing_input: true,
            strict_checkpoint: false,
            fail_on_dropped_record: false,
        }
    }
}

impl Config {
    /// Load from `CADASTRE_CONFIG` (or `cadastre_coords.toml`) when the file
    /// exists, otherwise from environment variables.
    pub fn load() -> Result<Self, AppError> {
        let path = std::env::var("CADASTRE_CONFIG")
            .unwrap_or_else(|_| "cadastre_coords.toml".to_string());
        if Path::new(&path).exists() {
            Self::from_file(&path)
        } else {
            Ok(Self::from_env())
        }
    }

    pub fn from_file(path: &str) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {path}: {e}")))?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| AppError::Config(format!("cannot parse {path}: {e}")))?;
        Ok(config.normalized())
    }

    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            input_path: std::env::var("INPUT_PATH").unwrap_or(default.input_path),
            output_path: std::env::var("OUTPUT_PATH").unwrap_or(default.output_path),
            map_url: std::env::var("MAP_URL").unwrap_or(default.map_url),
            max_run_secs: std::env::var("MAX_RUN_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_run_secs),
            pacing_interval: std::env::var("PACING_INTERVAL").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_interval),
            pacing_pause_secs: std::env::var("PACING_PAUSE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_pause_secs),
            save_attempts: std::env::var("SAVE_ATTEMPTS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.save_attempts),
            save_backoff_ms: std::env::var("SAVE_BACKOFF_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.save_backoff_ms),
            query_timeout_secs: std::env::var("QUERY_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.query_timeout_secs),
            render_wait_ms: std::env::var("RENDER_WAIT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.render_wait_ms),
            fail_on_missing_input: std::env::var("FAIL_ON_MISSING_INPUT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fail_on_missing_input),
            strict_checkpoint: std::env::var("STRICT_CHECKPOINT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.strict_checkpoint),
            fail_on_dropped_record: std::env::var("FAIL_ON_DROPPED_RECORD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.fail_on_dropped_record),
        }
        .normalized()
    }

    /// Enforce cross-field rules every constructor must honor.
    fn normalized(mut self) -> Self {
        self.save_attempts = self.save_attempts.max(MIN_SAVE_ATTEMPTS);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(config.save_attempts >= MIN_SAVE_ATTEMPTS);
        assert!(config.fail_on_missing_input);
        assert!(!config.strict_checkpoint);
    }

    #[test]
    fn from_toml_overrides_and_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "ids.csv"
            max_run_secs = 60
            strict_checkpoint = true
            "#,
        )
        .expect("valid config");
        assert_eq!(config.input_path, "ids.csv");
        assert_eq!(config.max_run_secs, 60);
        assert!(config.strict_checkpoint);
        assert_eq!(config.output_path, Config::default().output_path);
    }

    #[test]
    fn save_attempts_below_minimum_are_bumped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "save_attempts = 1\n").unwrap();
        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.save_attempts, MIN_SAVE_ATTEMPTS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Config, _> = toml::from_str("no_such_option = 1");
        assert!(result.is_err());
    }
}

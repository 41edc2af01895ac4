use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::json;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::ScoringPolicy;

/// Loads the scoring policy from an optional YAML file and caches it.
pub struct SettingsService {
    path: Option<PathBuf>,
    cache: RwLock<Option<ScoringPolicy>>,
}

impl SettingsService {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            cache: RwLock::new(None),
        }
    }

    pub fn get(&self) -> AppResult<ScoringPolicy> {
        if let Ok(guard) = self.cache.read() {
            if let Some(policy) = guard.as_ref() {
                return Ok(policy.clone());
            }
        }

        let policy = Self::load(self.path.as_deref())?;
        if let Ok(mut guard) = self.cache.write() {
            *guard = Some(policy.clone());
        }
        Ok(policy)
    }

    /// Reads and validates a policy file. No path means built-in defaults.
    /// Keys missing from the file keep their default values.
    pub fn load(path: Option<&Path>) -> AppResult<ScoringPolicy> {
        let Some(path) = path else {
            return Ok(ScoringPolicy::default());
        };

        let raw = fs::read_to_string(path).map_err(|err| {
            AppError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        let policy = Self::parse(&raw)?;

        info!(
            target: "app::config",
            path = %path.display(),
            score_cap = policy.score_cap,
            thresholds = policy.status_thresholds.len(),
            "scoring policy loaded"
        );
        Ok(policy)
    }

    pub fn parse(raw: &str) -> AppResult<ScoringPolicy> {
        if raw.trim().is_empty() {
            warn!(target: "app::config", "empty scoring policy file; using defaults");
            return Ok(ScoringPolicy::default());
        }

        let mut policy: ScoringPolicy = serde_yaml::from_str(raw)?;
        validate_policy(&policy)?;
        policy
            .status_thresholds
            .sort_by(|a, b| b.min_score.total_cmp(&a.min_score));
        Ok(policy)
    }
}

fn validate_policy(policy: &ScoringPolicy) -> AppResult<()> {
    if !policy.score_cap.is_finite() || policy.score_cap <= 0.0 {
        return Err(AppError::validation_with_details(
            "scoreCap must be a positive number",
            json!({ "field": "scoreCap", "value": policy.score_cap.to_string() }),
        ));
    }

    for (index, threshold) in policy.status_thresholds.iter().enumerate() {
        if !threshold.min_score.is_finite() {
            return Err(AppError::validation_with_details(
                "status threshold minScore must be finite",
                json!({ "field": "statusThresholds", "index": index }),
            ));
        }
        if threshold.label.trim().is_empty() {
            return Err(AppError::validation_with_details(
                "status threshold label cannot be blank",
                json!({ "field": "statusThresholds", "index": index }),
            ));
        }
    }

    if policy.fallback_status.trim().is_empty() {
        return Err(AppError::validation("fallbackStatus cannot be blank"));
    }

    Ok(())
}

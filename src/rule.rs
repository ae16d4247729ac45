//! The OutOfBound rule engine.
//!
//! One [`OutOfBoundRule`] owns the trigger store for the current
//! configuration epoch and the latched state. A single reader-writer lock
//! guards the store: configuration swaps a fully parsed store in under one
//! write lock, while evaluation and trigger descriptions hold the read
//! lock for their whole duration.

use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{parse_rules, ConfigCategory, EngineConfig, SkippedEntry, RULE_CONFIG_ITEM};
use crate::error::{RuleError, RuleResult};
use crate::evaluator;
use crate::report::{self, ReasonDescriptor, TriggersDescriptor};
use crate::state::{RuleState, StateLatch};
use crate::store::TriggerStore;

fn lock_err(context: &'static str) -> RuleError {
    RuleError::internal(format!("poisoned lock: {context}"))
}

/// Identifies one loaded rule instance in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleInstanceId(Uuid);

impl RuleInstanceId {
    /// Creates a new random instance id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RuleInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RuleInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of applying a rules document.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureSummary {
    pub assets: usize,
    pub triggers: usize,
    pub skipped: Vec<SkippedEntry>,
    /// blake3 hex digest of the applied `rule_config` text.
    pub digest: String,
    /// True if the digest matches the previously applied document.
    pub unchanged: bool,
}

#[derive(Debug, Default)]
struct Configured {
    store: TriggerStore,
    digest: Option<String>,
}

/// Threshold notification rule over configured asset datapoints.
#[derive(Debug)]
pub struct OutOfBoundRule {
    id: RuleInstanceId,
    cfg: EngineConfig,
    configured: RwLock<Configured>,
    latch: StateLatch,
}

impl Default for OutOfBoundRule {
    fn default() -> Self {
        Self::new()
    }
}

impl OutOfBoundRule {
    /// Creates an unconfigured rule with the default engine policies.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an unconfigured rule with explicit engine policies.
    #[must_use]
    pub fn with_config(cfg: EngineConfig) -> Self {
        Self {
            id: RuleInstanceId::new(),
            cfg,
            configured: RwLock::new(Configured::default()),
            latch: StateLatch::new(),
        }
    }

    /// Instance id recorded on every log event of this rule.
    #[must_use]
    pub const fn id(&self) -> RuleInstanceId {
        self.id
    }

    /// Policies this rule evaluates with.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        self.cfg
    }

    /// Applies the `rule_config` item of a host configuration category.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the item is missing or the rules
    /// document is unusable; the current store is kept in that case.
    pub fn configure(&self, category: &ConfigCategory) -> RuleResult<ConfigureSummary> {
        let rule_config = category.get_value(RULE_CONFIG_ITEM)?;
        self.configure_rules(&rule_config)
    }

    /// Parses a rules document and replaces the trigger store with it.
    ///
    /// The old store is discarded even if the new document yields no
    /// triggers, as long as it has a `rules` array.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the document is not JSON or has no
    /// `rules` array; the current store is kept in that case.
    #[tracing::instrument(skip_all, fields(rule_id = %self.id))]
    pub fn configure_rules(&self, rule_config: &str) -> RuleResult<ConfigureSummary> {
        let parsed = parse_rules(rule_config)?;
        let digest = blake3::hash(rule_config.as_bytes()).to_hex().to_string();

        let assets = parsed.store.len();
        let triggers = parsed.store.trigger_count();

        let previous = {
            let mut configured = self
                .configured
                .write()
                .map_err(|_| lock_err("trigger store"))?;
            configured.store = parsed.store;
            configured.digest.replace(digest.clone())
        };

        let summary = ConfigureSummary {
            assets,
            triggers,
            skipped: parsed.skipped,
            unchanged: previous.as_deref() == Some(digest.as_str()),
            digest,
        };

        tracing::info!(
            assets = summary.assets,
            triggers = summary.triggers,
            skipped = summary.skipped.len(),
            digest = %summary.digest,
            unchanged = summary.unchanged,
            "Rule configured"
        );
        Ok(summary)
    }

    /// Evaluates a values document and latches the verdict.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidInput`] if `asset_values` is not JSON; the
    /// state is latched as cleared first.
    #[tracing::instrument(level = "debug", skip_all, fields(rule_id = %self.id))]
    pub fn eval(&self, asset_values: &str) -> RuleResult<bool> {
        let values: serde_json::Value = match serde_json::from_str(asset_values) {
            Ok(values) => values,
            Err(e) => {
                self.latch.set(RuleState::Cleared);
                return Err(RuleError::InvalidInput {
                    message: e.to_string(),
                });
            }
        };

        let verdict = {
            let configured = self
                .configured
                .read()
                .map_err(|_| lock_err("trigger store"))?;
            evaluator::evaluate(&configured.store, &values, &self.cfg)
        };

        if self.latch.set(RuleState::from_verdict(verdict)) {
            tracing::info!(state = %self.latch.get(), "Rule state changed");
        }
        tracing::debug!(verdict, "Rule evaluated");
        Ok(verdict)
    }

    /// Describes the configured assets for the host.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn triggers(&self) -> RuleResult<TriggersDescriptor> {
        self.read_store(report::describe)
    }

    /// The latched state as a reason document.
    #[must_use]
    pub fn reason(&self) -> ReasonDescriptor {
        ReasonDescriptor {
            reason: self.latch.get(),
        }
    }

    /// Latched state after the last evaluation.
    #[must_use]
    pub fn state(&self) -> RuleState {
        self.latch.get()
    }

    /// When the latched state last changed.
    #[must_use]
    pub fn state_changed_at(&self) -> Option<DateTime<Utc>> {
        self.latch.changed_at()
    }

    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn has_triggers(&self) -> RuleResult<bool> {
        self.read_store(TriggerStore::has_triggers)
    }

    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn asset_count(&self) -> RuleResult<usize> {
        self.read_store(TriggerStore::len)
    }

    /// A copy of the current trigger store.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn store_snapshot(&self) -> RuleResult<TriggerStore> {
        self.read_store(TriggerStore::clone)
    }

    /// Digest of the last applied rules document.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the store lock is poisoned.
    pub fn config_digest(&self) -> RuleResult<Option<String>> {
        let configured = self
            .configured
            .read()
            .map_err(|_| lock_err("trigger store"))?;
        Ok(configured.digest.clone())
    }

    fn read_store<T>(&self, f: impl FnOnce(&TriggerStore) -> T) -> RuleResult<T> {
        let configured = self
            .configured
            .read()
            .map_err(|_| lock_err("trigger store"))?;
        Ok(f(&configured.store))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const FLOW_RULES: &str = r#"{
        "rules": [{
            "asset": {"name": "flow"},
            "datapoints": [{"name": "random", "trigger_value": 101.3}],
            "eval_all_datapoints": true
        }]
    }"#;

    #[test]
    fn new_rule_is_cleared_and_empty() {
        let rule = OutOfBoundRule::new();
        assert_eq!(rule.state(), RuleState::Cleared);
        assert!(!rule.has_triggers().unwrap());
        assert!(rule.config_digest().unwrap().is_none());
        assert_eq!(rule.engine_config(), EngineConfig::default());
    }

    #[test]
    fn configure_from_category() {
        let rule = OutOfBoundRule::new();
        let category = ConfigCategory::new("outofbound").with_item(RULE_CONFIG_ITEM, FLOW_RULES);
        let summary = rule.configure(&category).unwrap();

        assert_eq!(summary.assets, 1);
        assert_eq!(summary.triggers, 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(rule.config_digest().unwrap(), Some(summary.digest));
    }

    #[test]
    fn summary_reports_unchanged_document() {
        let rule = OutOfBoundRule::new();
        assert!(!rule.configure_rules(FLOW_RULES).unwrap().unchanged);
        assert!(rule.configure_rules(FLOW_RULES).unwrap().unchanged);
        assert!(!rule.configure_rules(r#"{"rules": []}"#).unwrap().unchanged);
        assert!(!rule.configure_rules(FLOW_RULES).unwrap().unchanged);
    }

    #[test]
    fn configure_without_rule_config_item_fails() {
        let rule = OutOfBoundRule::new();
        let err = rule.configure(&ConfigCategory::new("outofbound")).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn invalid_document_keeps_previous_store() {
        let rule = OutOfBoundRule::new();
        rule.configure_rules(FLOW_RULES).unwrap();

        assert!(rule.configure_rules("{broken").unwrap_err().is_config());
        assert!(rule.configure_rules(r#"{"other": []}"#).is_err());
        assert_eq!(rule.asset_count().unwrap(), 1);
    }

    #[test]
    fn empty_rules_array_clears_store() {
        let rule = OutOfBoundRule::new();
        rule.configure_rules(FLOW_RULES).unwrap();
        rule.configure_rules(r#"{"rules": []}"#).unwrap();
        assert!(!rule.has_triggers().unwrap());
    }

    #[test]
    fn eval_latches_verdict() {
        let rule = OutOfBoundRule::new();
        rule.configure_rules(FLOW_RULES).unwrap();

        assert!(rule.eval(&json!({"flow": {"random": 150.0}}).to_string()).unwrap());
        assert_eq!(rule.state(), RuleState::Triggered);
        assert!(rule.state_changed_at().is_some());

        assert!(!rule.eval(&json!({"flow": {"random": 50.0}}).to_string()).unwrap());
        assert_eq!(rule.reason().reason, RuleState::Cleared);
    }

    #[test]
    fn invalid_values_clear_state() {
        let rule = OutOfBoundRule::new();
        rule.configure_rules(FLOW_RULES).unwrap();
        rule.eval(r#"{"flow": {"random": 150.0}}"#).unwrap();

        let err = rule.eval("not json").unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(rule.state(), RuleState::Cleared);
    }

    #[test]
    fn snapshot_is_independent_of_reconfiguration() {
        let rule = OutOfBoundRule::new();
        rule.configure_rules(FLOW_RULES).unwrap();
        let snapshot = rule.store_snapshot().unwrap();
        rule.configure_rules(r#"{"rules": []}"#).unwrap();

        assert_eq!(snapshot.len(), 1);
        assert!(rule.store_snapshot().unwrap().is_empty());
    }

    #[test]
    fn instance_ids_are_unique() {
        assert_ne!(OutOfBoundRule::new().id(), OutOfBoundRule::new().id());
    }
}

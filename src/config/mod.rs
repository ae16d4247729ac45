//! Rule configuration.
//!
//! The host hands the rule a configuration category whose `rule_config`
//! item holds the rules document. This module reads that category,
//! parses the rules into a [`TriggerStore`](crate::store::TriggerStore),
//! and carries the engine-level evaluation policies.

/// Host configuration category.
pub mod category;
/// Rules document parser.
pub mod parser;

pub use category::ConfigCategory;
pub use parser::{parse_rules, ParsedRules, SkipReason, SkippedEntry};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Name of the configuration item holding the rules document.
pub const RULE_CONFIG_ITEM: &str = "rule_config";

/// Default window length offered by the default configuration, in seconds.
pub const DEFAULT_TIME_INTERVAL: u32 = 30;

/// How per-asset results combine into the rule verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictPolicy {
    /// The verdict is the result of the last asset evaluated.
    #[default]
    LastWrite,
    /// The verdict is true only if every configured asset is true.
    LogicalAnd,
}

impl fmt::Display for VerdictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWrite => write!(f, "last_write"),
            Self::LogicalAnd => write!(f, "logical_and"),
        }
    }
}

/// How datapoint results combine when `eval_all_datapoints` is set.
///
/// With `eval_all_datapoints == false` both policies stop at the first
/// datapoint that exceeds its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatapointPolicy {
    /// The asset result is the result of the last datapoint evaluated.
    #[default]
    LastWrite,
    /// The asset result is true only if every datapoint is true.
    LogicalAnd,
}

impl fmt::Display for DatapointPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastWrite => write!(f, "last_write"),
            Self::LogicalAnd => write!(f, "logical_and"),
        }
    }
}

/// Engine-level settings chosen by the embedding host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How asset results combine into the rule verdict.
    pub verdict_policy: VerdictPolicy,
    /// How datapoint results combine when an asset evaluates all of them.
    pub datapoint_policy: DatapointPolicy,
}

impl EngineConfig {
    /// Both policies set to [`LogicalAnd`](VerdictPolicy::LogicalAnd).
    #[must_use]
    pub const fn logical_and() -> Self {
        Self {
            verdict_policy: VerdictPolicy::LogicalAnd,
            datapoint_policy: DatapointPolicy::LogicalAnd,
        }
    }
}

/// The default rules document rendered by the host's rule editor.
#[must_use]
pub fn default_rule_config() -> serde_json::Value {
    json!({
        "rules": [
            {
                "asset": {
                    "name": "",
                    "description": "The asset name for which notifications will be generated."
                },
                "eval_all_datapoints": "true",
                "datapoints": [
                    {
                        "name": "",
                        "type": "float",
                        "trigger_value": 0.0
                    }
                ],
                "evaluation_data": {
                    "description": "The rule evaluation data: single item or window",
                    "type": "enumeration",
                    "options": ["Single Item", "Window"],
                    "value": "Single Item"
                },
                "window_data": {
                    "description": "Window data evaluation type",
                    "type": "enumeration",
                    "options": ["All", "Maximum", "Minimum", "Average"],
                    "value": "Average"
                },
                "time_interval": {
                    "description": "Duration of the time window, in seconds, for collecting data points",
                    "type": "integer",
                    "value": DEFAULT_TIME_INTERVAL
                }
            }
        ]
    })
}

/// The default plugin configuration category.
#[must_use]
pub fn default_config() -> serde_json::Value {
    const DESCRIPTION: &str = "Generate a notification if the values of one or all the \
                               configured assets exceed a configured value";

    json!({
        "plugin": {
            "description": DESCRIPTION,
            "type": "string",
            "default": crate::plugin::RULE_NAME,
            "readonly": "true"
        },
        "description": {
            "description": DESCRIPTION,
            "type": "string",
            "default": "Generate a notification if all configured assets trigger",
            "displayName": "Rule",
            "readonly": "true"
        },
        RULE_CONFIG_ITEM: {
            "description": "The array of rules",
            "type": "JSON",
            "default": default_rule_config().to_string(),
            "displayName": "Configuration",
            "order": "1"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_defaults_to_last_write() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.verdict_policy, VerdictPolicy::LastWrite);
        assert_eq!(cfg.datapoint_policy, DatapointPolicy::LastWrite);
    }

    #[test]
    fn engine_config_deserializes_policies() {
        let cfg: EngineConfig = serde_json::from_value(json!({
            "verdict_policy": "logical_and",
            "datapoint_policy": "last_write"
        }))
        .unwrap();
        assert_eq!(cfg.verdict_policy, VerdictPolicy::LogicalAnd);
        assert_eq!(cfg.datapoint_policy, DatapointPolicy::LastWrite);
    }

    #[test]
    fn default_config_exposes_rule_config_item() {
        let category = ConfigCategory::from_value("OutOfBound", default_config()).unwrap();
        let rules = category.get_value(RULE_CONFIG_ITEM).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&rules).unwrap();
        assert!(doc["rules"].is_array());
        assert_eq!(doc["rules"][0]["time_interval"]["value"], json!(30));
    }

    #[test]
    fn default_rule_config_yields_no_triggers() {
        // Template entries carry empty asset and datapoint names.
        let parsed = parse_rules(&default_rule_config().to_string()).unwrap();
        assert!(parsed.store.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
    }
}

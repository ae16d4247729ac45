//! Host plugin boundary.
//!
//! The notification service drives a rule through a fixed set of entry
//! points: init, triggers, eval, reason, reconfigure and shutdown. Nothing
//! here returns an error to the host. Failures are logged and mapped to
//! the neutral outcome of each call: an unchanged configuration, an empty
//! triggers document, or a `false` verdict.

use serde::{Deserialize, Serialize};

use crate::config::{self, ConfigCategory, EngineConfig};
use crate::error::RuleError;
use crate::rule::OutOfBoundRule;

/// Name the rule registers under.
pub const RULE_NAME: &str = "OutOfBound";

/// Plugin kind tag for notification rules.
pub const PLUGIN_TYPE_NOTIFICATION_RULE: &str = "notificationRule";

/// Version of the host rule interface this plugin implements.
pub const INTERFACE_VERSION: &str = "1.0.0";

/// Category name used when wrapping a reconfiguration document.
const RECONFIGURE_CATEGORY: &str = "new_outofbound";

const EMPTY_TRIGGERS: &str = r#"{"triggers":[]}"#;
const CLEARED_REASON: &str = r#"{"reason":"cleared"}"#;

/// Static plugin descriptor.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInformation {
    pub name: String,
    pub version: String,
    pub flags: u32,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub interface_version: String,
    /// Default configuration category, as JSON text.
    pub config: String,
}

/// Returns the plugin descriptor.
#[must_use]
pub fn plugin_info() -> PluginInformation {
    PluginInformation {
        name: RULE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        flags: 0,
        plugin_type: PLUGIN_TYPE_NOTIFICATION_RULE.to_string(),
        interface_version: INTERFACE_VERSION.to_string(),
        config: config::default_config().to_string(),
    }
}

/// Entry points a notification service calls on a loaded rule.
///
/// Implementations never fail across this boundary.
pub trait NotificationRule: Send + Sync {
    /// JSON document describing the assets the rule needs.
    fn triggers(&self) -> String;

    /// Evaluates a JSON document of asset values.
    fn eval(&self, asset_values: &str) -> bool;

    /// JSON document with the latched `triggered`/`cleared` reason.
    fn reason(&self) -> String;

    /// Applies a new configuration category, given as JSON text.
    fn reconfigure(&self, new_config: &str);
}

impl NotificationRule for OutOfBoundRule {
    fn triggers(&self) -> String {
        match OutOfBoundRule::triggers(self).and_then(|t| t.to_json()) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(rule_id = %self.id(), error = %e, "Failed to describe triggers");
                EMPTY_TRIGGERS.to_string()
            }
        }
    }

    fn eval(&self, asset_values: &str) -> bool {
        match OutOfBoundRule::eval(self, asset_values) {
            Ok(verdict) => verdict,
            Err(e) if e.is_invalid_input() => {
                tracing::warn!(rule_id = %self.id(), error = %e, "Ignoring unparsable asset values");
                false
            }
            Err(e) => {
                tracing::error!(rule_id = %self.id(), error = %e, "Rule evaluation failed");
                false
            }
        }
    }

    fn reason(&self) -> String {
        OutOfBoundRule::reason(self).to_json().unwrap_or_else(|e| {
            tracing::error!(rule_id = %self.id(), error = %e, "Failed to render reason");
            CLEARED_REASON.to_string()
        })
    }

    fn reconfigure(&self, new_config: &str) {
        let applied = ConfigCategory::from_json(RECONFIGURE_CATEGORY, new_config)
            .map_err(RuleError::from)
            .and_then(|category| self.configure(&category));
        if let Err(e) = applied {
            tracing::warn!(rule_id = %self.id(), error = %e, "Reconfiguration ignored");
        }
    }
}

/// Creates a rule with the default engine policies and applies `config`.
///
/// An unusable configuration leaves the rule with no triggers.
#[must_use]
pub fn plugin_init(config: &ConfigCategory) -> OutOfBoundRule {
    plugin_init_with(config, EngineConfig::default())
}

/// Creates a rule with explicit engine policies and applies `config`.
#[must_use]
pub fn plugin_init_with(config: &ConfigCategory, engine: EngineConfig) -> OutOfBoundRule {
    let rule = OutOfBoundRule::with_config(engine);
    tracing::info!(
        rule_id = %rule.id(),
        category = config.name(),
        verdict_policy = %engine.verdict_policy,
        datapoint_policy = %engine.datapoint_policy,
        "Initialising rule"
    );
    if let Err(e) = rule.configure(config) {
        tracing::warn!(rule_id = %rule.id(), error = %e, "Initial configuration ignored");
    }
    rule
}

/// Releases a rule and its trigger store.
pub fn plugin_shutdown(rule: OutOfBoundRule) {
    tracing::info!(rule_id = %rule.id(), "Shutting down rule");
    drop(rule);
}

/// See [`NotificationRule::triggers`].
#[must_use]
pub fn plugin_triggers(rule: &dyn NotificationRule) -> String {
    rule.triggers()
}

/// See [`NotificationRule::eval`].
#[must_use]
pub fn plugin_eval(rule: &dyn NotificationRule, asset_values: &str) -> bool {
    rule.eval(asset_values)
}

/// See [`NotificationRule::reason`].
#[must_use]
pub fn plugin_reason(rule: &dyn NotificationRule) -> String {
    rule.reason()
}

/// See [`NotificationRule::reconfigure`].
pub fn plugin_reconfigure(rule: &dyn NotificationRule, new_config: &str) {
    rule.reconfigure(new_config);
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::config::RULE_CONFIG_ITEM;

    fn category(rules: &Value) -> ConfigCategory {
        ConfigCategory::new(RULE_NAME).with_item(RULE_CONFIG_ITEM, rules.to_string())
    }

    #[test]
    fn info_describes_rule_plugin() {
        let info = plugin_info();
        assert_eq!(info.name, "OutOfBound");
        assert_eq!(info.plugin_type, "notificationRule");
        assert_eq!(info.interface_version, "1.0.0");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));

        let default: Value = serde_json::from_str(&info.config).unwrap();
        assert_eq!(default["plugin"]["default"], json!("OutOfBound"));
        assert!(default[RULE_CONFIG_ITEM]["default"].is_string());
    }

    #[test]
    fn init_with_default_config_has_no_triggers() {
        let info = plugin_info();
        let category = ConfigCategory::from_json(RULE_NAME, &info.config).unwrap();
        let rule = plugin_init(&category);

        let triggers: Value = serde_json::from_str(&plugin_triggers(&rule)).unwrap();
        assert_eq!(triggers, json!({"triggers": []}));
        plugin_shutdown(rule);
    }

    #[test]
    fn init_with_missing_item_still_returns_rule() {
        let rule = plugin_init(&ConfigCategory::new(RULE_NAME));
        assert!(!rule.has_triggers().unwrap());
        assert!(!plugin_eval(&rule, "{}"));
    }

    #[test]
    fn eval_with_invalid_json_is_false() {
        let rule = plugin_init(&category(&json!({
            "rules": [{"asset": {"name": "flow"}, "datapoints": [{"name": "random", "trigger_value": 1}]}]
        })));
        assert!(!plugin_eval(&rule, "{{{"));
        assert_eq!(plugin_reason(&rule), r#"{"reason":"cleared"}"#);
    }

    #[test]
    fn reconfigure_replaces_triggers() {
        let rule = plugin_init(&category(&json!({
            "rules": [{"asset": {"name": "flow"}, "datapoints": [{"name": "random", "trigger_value": 1}]}]
        })));

        let new_config = json!({
            RULE_CONFIG_ITEM: {
                "type": "JSON",
                "value": json!({
                    "rules": [{
                        "asset": {"name": "pressure"},
                        "datapoints": [{"name": "psi", "trigger_value": 2}],
                        "evaluation_data": {"value": "Window"},
                        "window_data": {"value": "Average"},
                        "time_interval": 30
                    }]
                }).to_string()
            }
        });
        plugin_reconfigure(&rule, &new_config.to_string());

        let triggers: Value = serde_json::from_str(&plugin_triggers(&rule)).unwrap();
        assert_eq!(
            triggers,
            json!({"triggers": [{"asset": "pressure", "Average": 30}]})
        );
    }

    #[test]
    fn reconfigure_with_garbage_keeps_triggers() {
        let rule = plugin_init(&category(&json!({
            "rules": [{"asset": {"name": "flow"}, "datapoints": [{"name": "random", "trigger_value": 1}]}]
        })));
        plugin_reconfigure(&rule, "not json");
        plugin_reconfigure(&rule, r#"{"rule_config": {"value": "not json"}}"#);
        assert_eq!(rule.asset_count().unwrap(), 1);
    }

    #[test]
    fn rule_is_usable_as_trait_object() {
        let rule: Box<dyn NotificationRule> = Box::new(plugin_init(&category(&json!({
            "rules": [{"asset": {"name": "flow"}, "datapoints": [{"name": "random", "trigger_value": 1}]}]
        }))));
        assert!(rule.eval(r#"{"flow": {"random": 2}}"#));
        assert_eq!(rule.reason(), r#"{"reason":"triggered"}"#);
    }
}

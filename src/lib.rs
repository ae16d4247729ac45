//! # OutOfBound - threshold notification rule
//!
//! A rule a notification service loads to decide, for each batch of asset
//! readings, whether a configured threshold has been exceeded and the
//! notification should be raised or cleared.
//!
//! ## Core Concepts
//!
//! - **Asset**: a named source of readings, holding one or more datapoints
//! - **Trigger**: a threshold bound to one datapoint of an asset
//! - **Trigger store**: every configured asset with its ordered triggers
//! - **Latched state**: the last verdict, `triggered` or `cleared`
//!
//! ## Usage
//!
//! ```rust
//! use outofbound::{plugin_eval, plugin_init, plugin_reason, ConfigCategory};
//!
//! let rules = r#"{"rules": [{
//!     "asset": {"name": "flow"},
//!     "datapoints": [{"name": "random", "trigger_value": 101.3}],
//!     "eval_all_datapoints": true
//! }]}"#;
//!
//! let category = ConfigCategory::new("OutOfBound").with_item("rule_config", rules);
//! let rule = plugin_init(&category);
//!
//! assert!(plugin_eval(&rule, r#"{"flow": {"random": 150.0}}"#));
//! assert_eq!(plugin_reason(&rule), r#"{"reason":"triggered"}"#);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Data model
pub mod error;
pub mod state;
pub mod store;
pub mod trigger;
pub mod value;

// Configuration and evaluation
pub mod config;
pub mod evaluator;
pub mod report;
pub mod rule;

// Host boundary
pub mod logging;
pub mod plugin;

pub use config::{
    ConfigCategory, DatapointPolicy, EngineConfig, ParsedRules, SkipReason, SkippedEntry,
    VerdictPolicy,
};
pub use error::{ConfigError, RuleError, RuleResult, ValidationError};
pub use report::{AssetDescriptor, ReasonDescriptor, TriggersDescriptor};
pub use rule::{ConfigureSummary, OutOfBoundRule, RuleInstanceId};
pub use state::{RuleState, StateLatch};
pub use store::TriggerStore;
pub use trigger::{Evaluation, RuleTrigger, WindowKind};
pub use value::{Datapoint, DatapointValue, ThresholdType};

pub use plugin::{
    plugin_eval, plugin_info, plugin_init, plugin_init_with, plugin_reason, plugin_reconfigure,
    plugin_shutdown, plugin_triggers, NotificationRule, PluginInformation,
};

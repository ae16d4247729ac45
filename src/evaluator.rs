//! Threshold evaluation of asset values against the trigger store.
//!
//! Input documents map asset names to objects of datapoint values:
//!
//! ```json
//! { "flow": { "random": 150.0, "window": [10, 200, 5] } }
//! ```
//!
//! A number exceeds its threshold when it is strictly greater. An array
//! exceeds it when any element does. Every other JSON type never exceeds.

use serde_json::Value;

use crate::config::{DatapointPolicy, EngineConfig, VerdictPolicy};
use crate::store::TriggerStore;
use crate::trigger::RuleTrigger;
use crate::value::DatapointValue;

/// Computes the rule verdict for one values document.
///
/// Assets configured in `store` but absent from `values` evaluate false.
/// An empty store never triggers.
#[must_use]
pub fn evaluate(store: &TriggerStore, values: &Value, cfg: &EngineConfig) -> bool {
    let results = store.iter().map(|(asset, triggers)| {
        let result = match values.get(asset) {
            Some(asset_values) => evaluate_asset(asset_values, triggers, cfg.datapoint_policy),
            None => false,
        };
        tracing::trace!(asset, result, "Asset evaluated");
        result
    });

    match cfg.verdict_policy {
        VerdictPolicy::LastWrite => results.last().unwrap_or(false),
        VerdictPolicy::LogicalAnd => {
            let (seen, all) = results.fold((false, true), |(_, all), result| (true, all && result));
            seen && all
        }
    }
}

/// Evaluates one asset's datapoint values against its triggers.
///
/// When the asset's `eval_all_datapoints` flag is false, evaluation stops
/// at the first datapoint that exceeds its threshold and the asset is
/// true. Otherwise every datapoint is evaluated and `policy` decides how
/// the results combine.
#[must_use]
pub fn evaluate_asset(asset_values: &Value, triggers: &[RuleTrigger], policy: DatapointPolicy) -> bool {
    let Some(first) = triggers.first() else {
        return false;
    };
    let eval_all = first.eval_all_datapoints();

    let check = |trigger: &RuleTrigger| {
        asset_values
            .get(trigger.datapoint_name())
            .is_some_and(|point| check_limit(point, trigger.threshold()))
    };

    if !eval_all {
        return triggers.iter().any(check);
    }

    match policy {
        DatapointPolicy::LastWrite => triggers.iter().map(check).last().unwrap_or(false),
        DatapointPolicy::LogicalAnd => triggers.iter().all(check),
    }
}

/// True if `point` exceeds `threshold`. Non-float thresholds never match.
#[must_use]
pub fn check_limit(point: &Value, threshold: &DatapointValue) -> bool {
    let Some(limit) = threshold.as_float() else {
        return false;
    };

    match point {
        Value::Number(_) => exceeds(point, limit),
        Value::Array(items) => items.iter().any(|item| exceeds(item, limit)),
        _ => false,
    }
}

fn exceeds(point: &Value, limit: f64) -> bool {
    point.as_f64().is_some_and(|v| v > limit)
}

//! Parser for the `rule_config` rules document.
//!
//! The document is `{ "rules": [ entry, ... ] }`. Each entry names an
//! asset, lists datapoints with their trigger values, and optionally
//! describes how the values are aggregated. Malformed entries and
//! datapoints are skipped and recorded; they never abort the parse.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{ConfigError, ValidationError};
use crate::store::TriggerStore;
use crate::trigger::RuleTrigger;

const WINDOW_EVALUATION: &str = "Window";

/// Key the triggers document uses for the asset name; a mode may not shadow it.
const ASSET_KEY: &str = "asset";

/// Why a rule entry or a datapoint was not turned into a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum SkipReason {
    NotAnObject,
    MissingAssetAndDatapoints,
    MissingAssetName,
    EmptyAssetName,
    DatapointsNotArray,
    MissingDatapointName,
    EmptyDatapointName,
    NonNumericTriggerValue,
    MissingTriggerValue,
    NoValidDatapoints,
    ReservedEvaluationMode(String),
    Invalid(ValidationError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "rule entry is not an object"),
            Self::MissingAssetAndDatapoints => write!(f, "rule entry has neither asset nor datapoints"),
            Self::MissingAssetName => write!(f, "asset name is missing"),
            Self::EmptyAssetName => write!(f, "asset name is empty"),
            Self::DatapointsNotArray => write!(f, "datapoints is not an array"),
            Self::MissingDatapointName => write!(f, "datapoint name is missing"),
            Self::EmptyDatapointName => write!(f, "datapoint name is empty"),
            Self::NonNumericTriggerValue => write!(f, "trigger_value is not numeric"),
            Self::MissingTriggerValue => write!(f, "trigger_value is missing"),
            Self::NoValidDatapoints => write!(f, "no valid datapoints"),
            Self::ReservedEvaluationMode(mode) => {
                write!(f, "evaluation mode '{mode}' clashes with the asset key")
            }
            Self::Invalid(e) => write!(f, "{e}"),
        }
    }
}

/// A rule entry or datapoint that was skipped during parsing.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub rule_index: usize,
    pub asset: Option<String>,
    pub datapoint: Option<String>,
    pub reason: SkipReason,
}

/// Result of parsing a rules document.
#[allow(missing_docs)]
#[derive(Debug, Default)]
pub struct ParsedRules {
    pub store: TriggerStore,
    pub skipped: Vec<SkippedEntry>,
}

impl ParsedRules {
    fn skip(
        &mut self,
        rule_index: usize,
        asset: Option<&str>,
        datapoint: Option<&str>,
        reason: SkipReason,
    ) {
        tracing::warn!(
            rule_index,
            asset = asset.unwrap_or_default(),
            datapoint = datapoint.unwrap_or_default(),
            %reason,
            "Skipping rule configuration entry"
        );
        self.skipped.push(SkippedEntry {
            rule_index,
            asset: asset.map(str::to_string),
            datapoint: datapoint.map(str::to_string),
            reason,
        });
    }
}

/// Evaluation descriptor resolved from a rule entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Descriptor {
    mode: String,
    interval_secs: u32,
}

/// Parses a `rule_config` document into a fresh trigger store.
///
/// # Errors
///
/// Fails only when the document as a whole is unusable: invalid JSON, no
/// `rules` member, or `rules` not being an array. Callers keep their
/// current store in those cases.
pub fn parse_rules(rule_config: &str) -> Result<ParsedRules, ConfigError> {
    let doc: Value = serde_json::from_str(rule_config)
        .map_err(|e| ConfigError::invalid_json(super::RULE_CONFIG_ITEM, &e))?;

    let rules = doc.get("rules").ok_or(ConfigError::MissingRules)?;
    let rules = rules.as_array().ok_or(ConfigError::RulesNotArray)?;

    let mut parsed = ParsedRules::default();
    for (index, rule) in rules.iter().enumerate() {
        parse_entry(&mut parsed, index, rule);
    }

    Ok(parsed)
}

fn parse_entry(parsed: &mut ParsedRules, index: usize, rule: &Value) {
    let Some(entry) = rule.as_object() else {
        parsed.skip(index, None, None, SkipReason::NotAnObject);
        return;
    };

    if !entry.contains_key("asset") && !entry.contains_key("datapoints") {
        parsed.skip(index, None, None, SkipReason::MissingAssetAndDatapoints);
        return;
    }

    let Some(asset) = entry
        .get("asset")
        .and_then(|a| a.get("name"))
        .and_then(Value::as_str)
    else {
        parsed.skip(index, None, None, SkipReason::MissingAssetName);
        return;
    };
    if asset.is_empty() {
        parsed.skip(index, Some(asset), None, SkipReason::EmptyAssetName);
        return;
    }

    let Some(datapoints) = entry.get("datapoints").and_then(Value::as_array) else {
        parsed.skip(index, Some(asset), None, SkipReason::DatapointsNotArray);
        return;
    };

    let descriptor = match resolve_descriptor(entry, asset) {
        Ok(descriptor) => descriptor,
        Err(reason) => {
            parsed.skip(index, Some(asset), None, reason);
            return;
        }
    };
    let eval_all_datapoints = resolve_eval_all(entry);

    let mut created = 0usize;
    for dp in datapoints {
        let Some(name) = dp.get("name").and_then(Value::as_str) else {
            parsed.skip(index, Some(asset), None, SkipReason::MissingDatapointName);
            continue;
        };
        if name.is_empty() {
            parsed.skip(index, Some(asset), Some(name), SkipReason::EmptyDatapointName);
            continue;
        }

        let threshold = match dp.get("trigger_value") {
            None => {
                parsed.skip(index, Some(asset), Some(name), SkipReason::MissingTriggerValue);
                continue;
            }
            Some(v) => match v.as_f64() {
                Some(t) => t,
                None => {
                    parsed.skip(index, Some(asset), Some(name), SkipReason::NonNumericTriggerValue);
                    continue;
                }
            },
        };

        let added = RuleTrigger::new(name, threshold)
            .and_then(|mut trigger| {
                trigger.add_evaluation(
                    descriptor.mode.clone(),
                    descriptor.interval_secs,
                    eval_all_datapoints,
                )?;
                Ok(trigger)
            })
            .and_then(|trigger| parsed.store.add_trigger(asset, trigger));

        match added {
            Ok(()) => created += 1,
            Err(e) => parsed.skip(index, Some(asset), Some(name), SkipReason::Invalid(e)),
        }
    }

    if created == 0 {
        parsed.skip(index, Some(asset), None, SkipReason::NoValidDatapoints);
    }
}

/// Text of an enumeration-style item: `{ "value": "..." }`, or a bare string.
fn item_str(item: &Value) -> Option<&str> {
    match item {
        Value::String(s) => Some(s.as_str()),
        Value::Object(fields) => fields.get("value").and_then(Value::as_str),
        _ => None,
    }
}

fn resolve_descriptor(entry: &Map<String, Value>, asset: &str) -> Result<Descriptor, SkipReason> {
    if let Some(evaluation_type) = entry.get("evaluation_type") {
        let mode = item_str(evaluation_type).unwrap_or_default();
        if mode.is_empty() || mode.eq_ignore_ascii_case("latest") {
            return Ok(Descriptor::default());
        }
        return aggregated(entry, asset, mode);
    }

    let windowed = entry
        .get("evaluation_data")
        .and_then(item_str)
        .is_some_and(|v| v == WINDOW_EVALUATION);
    if !windowed {
        return Ok(Descriptor::default());
    }

    let mode = entry
        .get("window_data")
        .and_then(item_str)
        .unwrap_or_default();
    if mode.is_empty() {
        tracing::warn!(asset, "Window evaluation without window_data, using single values");
        return Ok(Descriptor::default());
    }

    aggregated(entry, asset, mode)
}

fn aggregated(entry: &Map<String, Value>, asset: &str, mode: &str) -> Result<Descriptor, SkipReason> {
    if mode == ASSET_KEY {
        return Err(SkipReason::ReservedEvaluationMode(mode.to_string()));
    }
    Ok(Descriptor {
        mode: mode.to_string(),
        interval_secs: resolve_interval(entry, asset),
    })
}

fn resolve_interval(entry: &Map<String, Value>, asset: &str) -> u32 {
    let Some(item) = entry.get("time_interval") else {
        tracing::warn!(asset, "Aggregated evaluation without time_interval, using 0");
        return 0;
    };

    let raw = match item {
        Value::Object(fields) => fields.get("value"),
        other => Some(other),
    };

    let secs = match raw {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match secs.and_then(|s| u32::try_from(s).ok()) {
        Some(s) => s,
        None => {
            tracing::warn!(asset, time_interval = ?raw, "Invalid time_interval, using 0");
            0
        }
    }
}

fn resolve_eval_all(entry: &Map<String, Value>) -> bool {
    match entry.get("eval_all_datapoints") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.trim().eq_ignore_ascii_case("false"),
        _ => true,
    }
}

//! Trigger store: asset name to the ordered list of its triggers.
//!
//! Assets iterate in sorted name order. Within an asset, triggers keep
//! the order of the configured datapoints array, which decides which
//! datapoint wins when evaluation short-circuits.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::trigger::RuleTrigger;

/// Ordered mapping from asset name to its rule triggers.
///
/// Every asset entry holds at least one trigger, and all triggers of an
/// asset carry the same `eval_all_datapoints` flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerStore {
    assets: BTreeMap<String, Vec<RuleTrigger>>,
}

impl TriggerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a trigger under `asset`.
    ///
    /// The first trigger registered for an asset fixes its
    /// `eval_all_datapoints` flag; later triggers are aligned to it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAssetName`] for an empty asset name.
    pub fn add_trigger(
        &mut self,
        asset: impl Into<String>,
        mut trigger: RuleTrigger,
    ) -> Result<(), ValidationError> {
        let asset = asset.into();
        if asset.is_empty() {
            return Err(ValidationError::EmptyAssetName);
        }

        let triggers = self.assets.entry(asset).or_default();
        if let Some(first) = triggers.first() {
            let flag = first.eval_all_datapoints();
            if trigger.eval_all_datapoints() != flag {
                tracing::warn!(
                    datapoint = trigger.datapoint_name(),
                    eval_all_datapoints = flag,
                    "Conflicting eval_all_datapoints for asset, keeping first value"
                );
                trigger.set_eval_all_datapoints(flag);
            }
        }
        triggers.push(trigger);
        Ok(())
    }

    /// Removes every asset and trigger.
    pub fn remove_triggers(&mut self) {
        self.assets.clear();
    }

    /// True if at least one asset has triggers.
    #[must_use]
    pub fn has_triggers(&self) -> bool {
        !self.assets.is_empty()
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True if no asset is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Total number of triggers across all assets.
    #[must_use]
    pub fn trigger_count(&self) -> usize {
        self.assets.values().map(Vec::len).sum()
    }

    /// Triggers of `asset`, in configuration order.
    #[must_use]
    pub fn get(&self, asset: &str) -> Option<&[RuleTrigger]> {
        self.assets.get(asset).map(Vec::as_slice)
    }

    /// The asset-level `eval_all_datapoints` flag.
    #[must_use]
    pub fn eval_all_datapoints(&self, asset: &str) -> Option<bool> {
        self.assets
            .get(asset)
            .and_then(|t| t.first())
            .map(RuleTrigger::eval_all_datapoints)
    }

    /// Configured asset names, sorted.
    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    /// Assets with their triggers, sorted by asset name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleTrigger])> {
        self.assets
            .iter()
            .map(|(asset, triggers)| (asset.as_str(), triggers.as_slice()))
    }
}

//! Host-facing description of the configured triggers.
//!
//! The host asks the rule which assets it needs data for and how that data
//! should be aggregated:
//!
//! ```json
//! { "triggers": [ { "asset": "flow" }, { "asset": "pressure", "Average": 30 } ] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::state::RuleState;
use crate::store::TriggerStore;

/// One asset entry of the triggers descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// Asset name.
    pub asset: String,
    /// Evaluation mode to window length; empty for single-value assets.
    #[serde(flatten)]
    pub window: BTreeMap<String, u32>,
}

/// The triggers descriptor returned to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggersDescriptor {
    /// One entry per configured asset, in store order.
    pub triggers: Vec<AssetDescriptor>,
}

impl TriggersDescriptor {
    /// Renders the descriptor as JSON text.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn to_json(&self) -> RuleResult<String> {
        serde_json::to_string(self)
            .map_err(|e| RuleError::internal(format!("failed to serialize triggers: {e}")))
    }
}

/// The `{"reason": "triggered" | "cleared"}` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonDescriptor {
    /// Latched rule state.
    pub reason: RuleState,
}

impl ReasonDescriptor {
    /// Renders the reason as JSON text.
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails.
    pub fn to_json(&self) -> RuleResult<String> {
        serde_json::to_string(self)
            .map_err(|e| RuleError::internal(format!("failed to serialize reason: {e}")))
    }
}

/// Describes every asset in the store, one entry per asset. The window
/// pair comes from the asset's first trigger.
#[must_use]
pub fn describe(store: &TriggerStore) -> TriggersDescriptor {
    let triggers = store
        .iter()
        .map(|(asset, triggers)| {
            let mut window = BTreeMap::new();
            if let Some(first) = triggers.first() {
                if !first.evaluation().is_empty() {
                    window.insert(first.evaluation().to_string(), first.interval());
                }
            }
            AssetDescriptor {
                asset: asset.to_string(),
                window,
            }
        })
        .collect();

    TriggersDescriptor { triggers }
}

//! Latched triggered/cleared state of a rule.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The current notification state held between evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleState {
    /// The last evaluation exceeded a threshold.
    Triggered,
    /// Nothing exceeded, or nothing has been evaluated yet.
    #[default]
    Cleared,
}

impl RuleState {
    /// Maps an evaluation verdict to the state it latches.
    #[must_use]
    pub const fn from_verdict(verdict: bool) -> Self {
        if verdict {
            Self::Triggered
        } else {
            Self::Cleared
        }
    }

    /// True for [`RuleState::Triggered`].
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        matches!(self, Self::Triggered)
    }

    /// The reason string reported to the host.
    #[must_use]
    pub const fn as_reason(self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::Cleared => "cleared",
        }
    }
}

impl fmt::Display for RuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reason())
    }
}

/// Holds the last verdict. Starts cleared; keeps no history beyond the
/// time of the last transition.
#[derive(Debug, Default)]
pub struct StateLatch {
    triggered: AtomicBool,
    changed_at: Mutex<Option<DateTime<Utc>>>,
}

impl StateLatch {
    /// Creates a latch in the cleared state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches `state`. Returns true if the state changed.
    pub fn set(&self, state: RuleState) -> bool {
        let triggered = state.is_triggered();
        let previous = self.triggered.swap(triggered, Ordering::AcqRel);
        if previous == triggered {
            return false;
        }

        if let Ok(mut changed_at) = self.changed_at.lock() {
            *changed_at = Some(Utc::now());
        }
        true
    }

    /// Current latched state.
    #[must_use]
    pub fn get(&self) -> RuleState {
        RuleState::from_verdict(self.triggered.load(Ordering::Acquire))
    }

    /// When the state last changed, if it ever has.
    #[must_use]
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        self.changed_at.lock().ok().and_then(|guard| *guard)
    }
}

//! Rule triggers: one datapoint threshold plus its evaluation metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::value::{Datapoint, DatapointValue};

/// Known window reduction kinds.
///
/// The reduction itself is performed by the caller; the rule only reports
/// the configured kind and evaluates the values it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowKind {
    /// Every value in the window.
    All,
    /// Largest value in the window.
    Maximum,
    /// Smallest value in the window.
    Minimum,
    /// Mean of the window.
    Average,
}

impl FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(Self::All),
            "Maximum" => Ok(Self::Maximum),
            "Minimum" => Ok(Self::Minimum),
            "Average" => Ok(Self::Average),
            _ => Err(format!("unknown window kind: {s}")),
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::Maximum => write!(f, "Maximum"),
            Self::Minimum => write!(f, "Minimum"),
            Self::Average => write!(f, "Average"),
        }
    }
}

/// Evaluation metadata attached to a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Aggregation kind; empty means "latest single value".
    pub mode: String,
    /// Window length in seconds, 0 for single-value evaluation.
    pub interval_secs: u32,
    /// Per-asset flag, replicated on every trigger of the asset.
    pub eval_all_datapoints: bool,
}

impl Default for Evaluation {
    fn default() -> Self {
        Self {
            mode: String::new(),
            interval_secs: 0,
            eval_all_datapoints: true,
        }
    }
}

/// A threshold check bound to one datapoint of an asset.
///
/// # Examples
///
/// ```
/// use outofbound::RuleTrigger;
///
/// let mut trigger = RuleTrigger::new("random", 101.3).unwrap();
/// trigger.add_evaluation("Average", 30, true).unwrap();
/// assert_eq!(trigger.evaluation(), "Average");
/// assert_eq!(trigger.interval(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTrigger {
    datapoint: Datapoint,
    evaluation: Option<Evaluation>,
}

impl RuleTrigger {
    /// Creates a trigger for `datapoint_name` with a numeric threshold.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the name is empty or the threshold is
    /// not a float.
    pub fn new(
        datapoint_name: impl Into<String>,
        threshold: impl Into<DatapointValue>,
    ) -> Result<Self, ValidationError> {
        let datapoint_name = datapoint_name.into();
        if datapoint_name.is_empty() {
            return Err(ValidationError::EmptyDatapointName);
        }

        let threshold = threshold.into();
        if !threshold.is_float() {
            return Err(ValidationError::NonNumericThreshold {
                datapoint: datapoint_name,
            });
        }

        Ok(Self {
            datapoint: Datapoint::new(datapoint_name, threshold),
            evaluation: None,
        })
    }

    /// Attaches evaluation metadata. May be called once per trigger.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EvaluationAlreadySet`] on a second call.
    pub fn add_evaluation(
        &mut self,
        mode: impl Into<String>,
        interval_secs: u32,
        eval_all_datapoints: bool,
    ) -> Result<(), ValidationError> {
        if self.evaluation.is_some() {
            return Err(ValidationError::EvaluationAlreadySet {
                datapoint: self.datapoint.name().to_string(),
            });
        }

        self.evaluation = Some(Evaluation {
            mode: mode.into(),
            interval_secs,
            eval_all_datapoints,
        });
        Ok(())
    }

    /// The datapoint and threshold this trigger watches.
    #[must_use]
    pub const fn datapoint(&self) -> &Datapoint {
        &self.datapoint
    }

    /// Name of the watched datapoint.
    #[must_use]
    pub fn datapoint_name(&self) -> &str {
        self.datapoint.name()
    }

    /// Threshold a value must strictly exceed.
    #[must_use]
    pub const fn threshold(&self) -> &DatapointValue {
        self.datapoint.value()
    }

    /// The evaluation mode, empty when none was attached.
    #[must_use]
    pub fn evaluation(&self) -> &str {
        self.evaluation.as_ref().map_or("", |e| e.mode.as_str())
    }

    /// Aggregation window in seconds; 0 for single values.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.evaluation.as_ref().map_or(0, |e| e.interval_secs)
    }

    /// Defaults to `true` when no evaluation was attached.
    #[must_use]
    pub fn eval_all_datapoints(&self) -> bool {
        self.evaluation.as_ref().map_or(true, |e| e.eval_all_datapoints)
    }

    /// The evaluation mode as a known window kind, if it is one.
    #[must_use]
    pub fn window_kind(&self) -> Option<WindowKind> {
        self.evaluation().parse().ok()
    }

    pub(crate) fn set_eval_all_datapoints(&mut self, eval_all_datapoints: bool) {
        self.evaluation
            .get_or_insert_with(Evaluation::default)
            .eval_all_datapoints = eval_all_datapoints;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trigger_has_single_value_defaults() {
        let trigger = RuleTrigger::new("random", 101.3).unwrap();
        assert_eq!(trigger.datapoint_name(), "random");
        assert_eq!(trigger.threshold().as_float(), Some(101.3));
        assert_eq!(trigger.evaluation(), "");
        assert_eq!(trigger.interval(), 0);
        assert!(trigger.eval_all_datapoints());
        assert_eq!(trigger.window_kind(), None);
    }

    #[test]
    fn rejects_non_numeric_threshold() {
        let err = RuleTrigger::new("state", "open").unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonNumericThreshold {
                datapoint: "state".to_string()
            }
        );
    }

    #[test]
    fn rejects_empty_datapoint_name() {
        let err = RuleTrigger::new("", 1.0).unwrap_err();
        assert_eq!(err, ValidationError::EmptyDatapointName);
    }

    #[test]
    fn evaluation_can_only_be_attached_once() {
        let mut trigger = RuleTrigger::new("random", 1.0).unwrap();
        trigger.add_evaluation("Maximum", 10, false).unwrap();
        assert_eq!(trigger.window_kind(), Some(WindowKind::Maximum));
        assert!(!trigger.eval_all_datapoints());

        let err = trigger.add_evaluation("Minimum", 5, true).unwrap_err();
        assert!(matches!(err, ValidationError::EvaluationAlreadySet { .. }));
        assert_eq!(trigger.evaluation(), "Maximum");
        assert_eq!(trigger.interval(), 10);
    }

    #[test]
    fn window_kind_round_trips_names() {
        for name in ["All", "Maximum", "Minimum", "Average"] {
            let kind: WindowKind = name.parse().unwrap();
            assert_eq!(kind.to_string(), name);
        }
        assert!("Median".parse::<WindowKind>().is_err());
    }
}

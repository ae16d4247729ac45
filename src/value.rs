//! Datapoint value types used as trigger thresholds.
//!
//! Only float thresholds take part in evaluation. Other value kinds can be
//! represented so a datapoint is never silently reinterpreted, but they
//! never match.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of value a datapoint threshold holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdType {
    /// Numeric threshold, the only kind that can match.
    Float,
    /// Text threshold.
    String,
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A typed datapoint value.
///
/// # Examples
///
/// ```
/// use outofbound::DatapointValue;
///
/// let limit = DatapointValue::Float(101.3);
/// assert!(limit.is_float());
/// assert_eq!(limit.as_float(), Some(101.3));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DatapointValue {
    /// Numeric value.
    Float(f64),
    /// Text value.
    String(String),
}

impl DatapointValue {
    /// True for a numeric value.
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    /// The numeric value, if any.
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::String(_) => None,
        }
    }

    /// Kind of this value.
    pub const fn threshold_type(&self) -> ThresholdType {
        match self {
            Self::Float(_) => ThresholdType::Float,
            Self::String(_) => ThresholdType::String,
        }
    }
}

impl From<f64> for DatapointValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for DatapointValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for DatapointValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl fmt::Display for DatapointValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "\"{v}\""),
        }
    }
}

/// A named datapoint threshold: the value a datapoint must exceed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    name: String,
    value: DatapointValue,
}

impl Datapoint {
    /// Creates a named datapoint.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<DatapointValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Datapoint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Datapoint value.
    #[must_use]
    pub const fn value(&self) -> &DatapointValue {
        &self.value
    }
}

//! Host configuration category.
//!
//! A category is a JSON object of named items. Each item is an object
//! carrying a `value` and/or a `default`; the effective value is `value`
//! when present. `JSON`-typed items are usually stored as strings, but an
//! inline object is accepted and rendered back to text.

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// A host configuration category: item name to `{value, default}` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigCategory {
    name: String,
    items: Map<String, Value>,
}

impl ConfigCategory {
    /// Creates an empty category.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Map::new(),
        }
    }

    /// Parses a category from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJson`] if the text is not a JSON object.
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, ConfigError> {
        let name = name.into();
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::invalid_json(&name, &e))?;
        Self::from_value(name, value)
    }

    /// Builds a category from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJson`] if the value is not an object.
    pub fn from_value(name: impl Into<String>, value: Value) -> Result<Self, ConfigError> {
        let name = name.into();
        match value {
            Value::Object(items) => Ok(Self { name, items }),
            other => Err(ConfigError::InvalidJson {
                context: name,
                message: format!("expected an object, found {}", json_type(&other)),
            }),
        }
    }

    /// Adds or replaces an item holding `value`.
    #[must_use]
    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut item = Map::new();
        item.insert("value".to_string(), Value::String(value.into()));
        self.items.insert(key.into(), Value::Object(item));
        self
    }

    /// Category name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the category has an item named `key`.
    #[must_use]
    pub fn item_exists(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    /// The effective value of an item as text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingItem`] if the item is absent or has
    /// neither a `value` nor a `default`.
    pub fn get_value(&self, key: &str) -> Result<String, ConfigError> {
        let missing = || ConfigError::MissingItem {
            item: key.to_string(),
        };

        let item = self.items.get(key).ok_or_else(missing)?;
        let effective = match item {
            Value::Object(fields) => fields
                .get("value")
                .or_else(|| fields.get("default"))
                .ok_or_else(missing)?,
            // Flat categories map the key straight to its value.
            other => other,
        };

        Ok(match effective {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

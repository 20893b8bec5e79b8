use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::collector::ErrorLevel;

pub type PluginOptions = Map<String, Value>;

/// A named analysis rule and its options.
///
/// Lists of specs are ordered; plugins run in that order against one shared collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PluginOptions>,
}

impl PluginSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: None,
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.as_ref().and_then(|options| options.get(key))
    }

    /// Severity requested through the `level` option, if it names a valid one.
    pub fn level(&self) -> Option<ErrorLevel> {
        self.option("level")
            .and_then(Value::as_u64)
            .and_then(ErrorLevel::from_number)
    }
}

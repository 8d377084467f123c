//! Uniform result of a provider `notify` call.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of a vendor action.
///
/// `success` and `message` are always present; everything action-specific
/// (ticket ids, affected counts, task ids) is flattened next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            details: Map::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Result for an `action` value the provider does not handle, or one
    /// whose companion fields are missing.
    pub fn unsupported(action: &str) -> Self {
        Self::failure(format!("Unsupported action: {action}"))
    }

    /// Attach an action-specific field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

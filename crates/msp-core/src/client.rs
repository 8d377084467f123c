//! Client records as seen by the provider layer.
//!
//! The record-keeping service owns clients; providers only read the fields
//! needed to map a client onto vendor entities.

use serde::{Deserialize, Deserializer, Serialize};

use crate::vendor::Vendor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Internal client identifier. Numeric ids in YAML are accepted.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// External system the client was imported from (e.g. "connectwise").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_system: Option<String>,
    /// Identifier of the client in `external_system`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Free-form metadata; vendor mappings live under `Vendor::metadata_key`.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl ClientRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            external_system: None,
            external_id: None,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_external(mut self, system: impl Into<String>, id: impl Into<String>) -> Self {
        self.external_system = Some(system.into());
        self.external_id = Some(id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// The stored external id, if it belongs to `vendor`.
    pub fn external_id_for(&self, vendor: Vendor) -> Option<&str> {
        let system = self.external_system.as_deref()?;
        if !vendor.matches_system(system) {
            return None;
        }
        self.external_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Vendor-specific mapping blob from metadata, ignoring nulls.
    pub fn vendor_metadata(&self, vendor: Vendor) -> Option<&serde_json::Value> {
        self.metadata
            .get(vendor.metadata_key())
            .filter(|value| !value.is_null())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_id_only_for_matching_vendor() {
        let client = ClientRecord::new("7", "Acme").with_external("itglue", "4411");
        assert_eq!(client.external_id_for(Vendor::ItGlue), Some("4411"));
        assert_eq!(client.external_id_for(Vendor::SentinelOne), None);
    }

    #[test]
    fn blank_external_id_is_ignored() {
        let client = ClientRecord::new("7", "Acme").with_external("itglue", "  ");
        assert_eq!(client.external_id_for(Vendor::ItGlue), None);
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let client: ClientRecord = serde_yaml::from_str("id: 12\nname: Acme\n").unwrap();
        assert_eq!(client.id, "12");
        assert!(client.metadata.is_null());
    }
}

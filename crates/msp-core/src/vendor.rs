//! The vendors the provider layer integrates with.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    ConnectWise,
    SentinelOne,
    Veeam,
    ItGlue,
}

impl Vendor {
    pub const ALL: [Vendor; 4] = [
        Vendor::ConnectWise,
        Vendor::SentinelOne,
        Vendor::Veeam,
        Vendor::ItGlue,
    ];

    /// Provider type tag used by the registry and as alert source.
    pub fn provider_type(&self) -> &'static str {
        match self {
            Vendor::ConnectWise => "connectwise-manage",
            Vendor::SentinelOne => "sentinelone",
            Vendor::Veeam => "veeam",
            Vendor::ItGlue => "itglue",
        }
    }

    /// Short name stored in `ClientRecord::external_system`.
    pub fn system_name(&self) -> &'static str {
        match self {
            Vendor::ConnectWise => "connectwise",
            Vendor::SentinelOne => "sentinelone",
            Vendor::Veeam => "veeam",
            Vendor::ItGlue => "itglue",
        }
    }

    /// Key under `ClientRecord::metadata` holding vendor-specific mappings.
    pub fn metadata_key(&self) -> &'static str {
        match self {
            Vendor::ConnectWise => "connectwise_companies",
            Vendor::SentinelOne => "sentinelone_sites",
            Vendor::Veeam => "veeam_filters",
            Vendor::ItGlue => "itglue_organizations",
        }
    }

    /// Whether an `external_system` value refers to this vendor.
    ///
    /// Accepts the short system name and the provider type tag, ignoring case.
    pub fn matches_system(&self, external_system: &str) -> bool {
        let system = external_system.trim();
        system.eq_ignore_ascii_case(self.system_name())
            || system.eq_ignore_ascii_case(self.provider_type())
    }

    pub fn from_provider_type(tag: &str) -> Option<Vendor> {
        Vendor::ALL
            .into_iter()
            .find(|vendor| vendor.provider_type() == tag)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.provider_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_system_matching_is_lenient() {
        assert!(Vendor::ConnectWise.matches_system("connectwise"));
        assert!(Vendor::ConnectWise.matches_system("ConnectWise-Manage"));
        assert!(Vendor::ItGlue.matches_system(" ITGlue "));
        assert!(!Vendor::ItGlue.matches_system("connectwise"));
    }

    #[test]
    fn provider_type_round_trips() {
        for vendor in Vendor::ALL {
            assert_eq!(Vendor::from_provider_type(vendor.provider_type()), Some(vendor));
        }
        assert_eq!(Vendor::from_provider_type("datto"), None);
    }
}

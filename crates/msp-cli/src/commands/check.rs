//! `msp check` command implementation.
//!
//! Reports, per configured provider, whether its type is known and whether
//! the adapter would come up enabled, plus client records whose
//! `external_system` names no known vendor.

use anyhow::{Result, bail};
use msp_core::{MspConfig, Vendor};
use msp_providers::{ProviderContext, ProviderRegistry};
use std::path::Path;

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// What the finding is about, e.g. `provider:cw-main`.
    pub subject: String,
    pub message: String,
}

impl CheckFinding {
    fn new(severity: Severity, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

/// Run every check against an already loaded configuration.
pub fn findings(config: &MspConfig) -> Vec<CheckFinding> {
    let registry = ProviderRegistry::with_builtin();
    let mut findings = Vec::new();

    if config.providers.is_empty() {
        findings.push(CheckFinding::new(Severity::Warning, "providers", "no providers configured"));
    }

    for provider_config in &config.providers {
        let subject = format!("provider:{}", provider_config.provider_id);
        let Some(descriptor) = registry.get(provider_config.provider_type.trim()) else {
            findings.push(CheckFinding::new(
                Severity::Error,
                subject,
                format!("unknown provider type '{}'", provider_config.provider_type),
            ));
            continue;
        };
        match registry.create(provider_config.clone(), ProviderContext::default()) {
            Ok(provider) if provider.is_enabled() => findings.push(CheckFinding::new(
                Severity::Info,
                subject,
                format!("{} adapter ready", descriptor.display_name),
            )),
            Ok(_) => findings.push(CheckFinding::new(
                Severity::Warning,
                subject,
                format!(
                    "{} adapter disabled: missing or invalid settings, see log",
                    descriptor.display_name
                ),
            )),
            Err(e) => findings.push(CheckFinding::new(Severity::Error, subject, e.to_string())),
        }
    }

    for client in &config.clients {
        if let Some(system) = client.external_system.as_deref()
            && !Vendor::ALL.iter().any(|vendor| vendor.matches_system(system))
        {
            findings.push(CheckFinding::new(
                Severity::Warning,
                format!("client:{}", client.id),
                format!("external_system '{system}' matches no vendor; its external_id is ignored"),
            ));
        }
    }

    findings
}

pub fn run(config_path: &Path, config: &MspConfig) -> Result<()> {
    println!("Checking {}", config_path.display());

    let mut findings = findings(config);
    findings.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.subject.cmp(&b.subject)));
    for finding in &findings {
        println!("  [{}] {}: {}", finding.severity, finding.subject, finding.message);
    }

    let errors = findings.iter().filter(|f| f.severity == Severity::Error).count();
    let warnings = findings.iter().filter(|f| f.severity == Severity::Warning).count();
    println!();
    println!(
        "{} provider(s), {} client(s): {errors} error(s), {warnings} warning(s)",
        config.providers.len(),
        config.clients.len()
    );

    if errors > 0 {
        bail!("configuration has {errors} error(s)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severities(yaml: &str) -> Vec<(Severity, String)> {
        let config = MspConfig::from_yaml(yaml).unwrap();
        findings(&config)
            .into_iter()
            .map(|f| (f.severity, f.subject))
            .collect()
    }

    #[test]
    fn reports_ready_disabled_and_unknown_providers() {
        let found = severities(
            r#"
providers:
  - provider_id: itg
    type: itglue
    authentication:
      api_key: key
  - provider_id: s1
    type: sentinelone
  - provider_id: rmm
    type: datto-rmm
"#,
        );
        assert_eq!(
            found,
            vec![
                (Severity::Info, "provider:itg".to_string()),
                (Severity::Warning, "provider:s1".to_string()),
                (Severity::Error, "provider:rmm".to_string()),
            ]
        );
    }

    #[test]
    fn flags_clients_with_unknown_external_system() {
        let found = severities(
            r#"
providers:
  - provider_id: itg
    type: itglue
    authentication:
      api_key: key
clients:
  - id: 1
    name: Acme
    external_system: ConnectWise-Manage
    external_id: "250"
  - id: 2
    name: Globex
    external_system: autotask
    external_id: "9"
"#,
        );
        assert!(found.contains(&(Severity::Warning, "client:2".to_string())));
        assert!(!found.iter().any(|(_, subject)| subject == "client:1"));
    }

    #[test]
    fn empty_configuration_warns() {
        let found = severities("{}");
        assert_eq!(found, vec![(Severity::Warning, "providers".to_string())]);
    }
}

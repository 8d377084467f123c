//! `msp providers` command implementation.

use anyhow::Result;
use msp_providers::ProviderRegistry;

use super::print_json;

pub fn run(json: bool) -> Result<()> {
    let registry = ProviderRegistry::with_builtin();
    let descriptors = registry.descriptors();

    if json {
        return print_json(&descriptors);
    }

    for descriptor in descriptors {
        println!("{} ({})", descriptor.display_name, descriptor.provider_type);
        println!("  {}", descriptor.description);
        println!("  categories:   {}", descriptor.categories.join(", "));
        println!("  tags:         {}", descriptor.tags.join(", "));
        println!("  fingerprint:  {}", descriptor.fingerprint_fields.join(", "));
        println!("  query types:  {}", descriptor.query_types.join(", "));
        println!("  actions:      {}", descriptor.actions.join(", "));
        println!();
    }
    Ok(())
}

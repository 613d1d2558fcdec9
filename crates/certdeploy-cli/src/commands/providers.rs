//! Provider identifier commands.

use anyhow::Result;

use certdeploy_core::provider::LEGACY_ALIASES;
use certdeploy_core::{ProviderIdentifier, Taxonomy};
use certdeploy_deployer::Registry;

pub fn list(taxonomy: Option<&str>) -> Result<()> {
    let taxonomies = match taxonomy {
        Some(t) => vec![t.parse::<Taxonomy>()?],
        None => Taxonomy::ALL.to_vec(),
    };
    let registry = Registry::builtin();

    for taxonomy in taxonomies {
        println!("{}:", taxonomy.as_str());
        for id in taxonomy.identifiers() {
            let mut notes = Vec::new();
            if taxonomy == Taxonomy::Deployment && registry.contains(id) {
                notes.push("deployer".to_string());
            }
            if let Some((_, _, target)) = LEGACY_ALIASES
                .iter()
                .find(|(t, legacy, _)| *t == taxonomy && legacy == id)
            {
                notes.push(format!("alias of {}", target));
            }

            if notes.is_empty() {
                println!("  {}", id);
            } else {
                println!("  {} ({})", id, notes.join(", "));
            }
        }
    }
    Ok(())
}

pub fn check(taxonomy: &str, id: &str) -> Result<()> {
    for line in describe(taxonomy, id)? {
        println!("{}", line);
    }
    Ok(())
}

/// Human-readable facts about one provider identifier.
pub(crate) fn describe(taxonomy: &str, id: &str) -> Result<Vec<String>> {
    let taxonomy = taxonomy.parse::<Taxonomy>()?;
    let resolved = ProviderIdentifier::resolve(taxonomy, id)?;
    let canonical = ProviderIdentifier::canonical(taxonomy, id)?;

    let mut lines = Vec::new();
    if resolved.is_legacy_alias() {
        lines.push(format!("{} is a legacy alias of {}", id, canonical));
    } else {
        lines.push(format!("{} is a known {} provider", id, taxonomy.as_str()));
    }
    if taxonomy != Taxonomy::Access {
        lines.push(format!("  access kind: {}", canonical.access_kind()));
    }
    if taxonomy == Taxonomy::Deployment {
        let supported = Registry::builtin().contains(canonical.as_str());
        lines.push(format!(
            "  deployer available: {}",
            if supported { "yes" } else { "no" }
        ));
    }
    Ok(lines)
}

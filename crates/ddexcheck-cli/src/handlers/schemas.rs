//! Schemas command handler: what validation can be run against

use crate::cli::{OutputFormat, SchemasArgs};
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use ddexcheck_core::default_rules;
use ddexcheck_core::schema::registry_for;
use ddexcheck_schemas::loader::DEFAULT_RESOURCE;
use ddexcheck_schemas::SchemaSource;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SchemaEntry {
    version: String,
    source: String,
    default: bool,
}

#[derive(Debug, Serialize)]
struct RuleEntry {
    id: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
struct Listing {
    schemas: Vec<SchemaEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rules: Option<Vec<RuleEntry>>,
}

/// Handle the schemas command
pub fn handle_schemas(args: SchemasArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let listing = build_listing(&args, config)?;

    if output.format() != OutputFormat::Human {
        return output.data(&listing);
    }

    output.section("Schemas")?;
    let rows = listing
        .schemas
        .iter()
        .map(|s| {
            let marker = if s.default { "default" } else { "" };
            vec![s.version.clone(), s.source.clone(), marker.to_string()]
        })
        .collect();
    output.table(&["Version", "Source", ""], rows)?;

    if let Some(rules) = &listing.rules {
        output.section("Business rules")?;
        let rows = rules
            .iter()
            .map(|r| vec![r.id.to_string(), r.description.to_string()])
            .collect();
        output.table(&["Rule", "Description"], rows)?;
    }
    Ok(())
}

/// Built-in schemas plus the one named in the config file, if any
fn build_listing(args: &SchemasArgs, config: &Config) -> Result<Listing> {
    let registry = registry_for(&config.validation)?;
    let fallback = SchemaSource::Resource(DEFAULT_RESOURCE.to_string());

    let schemas = registry
        .iter()
        .map(|descriptor| SchemaEntry {
            version: descriptor.version.clone(),
            source: descriptor.source.to_string(),
            default: config.validation.schema_source.as_ref().unwrap_or(&fallback) == &descriptor.source,
        })
        .collect();

    let rules = args.rules.then(|| {
        default_rules()
            .iter()
            .map(|rule| RuleEntry {
                id: rule.id(),
                description: rule.description(),
            })
            .collect()
    });

    Ok(Listing { schemas, rules })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_listing() {
        let listing = build_listing(&SchemasArgs { rules: false }, &Config::default()).unwrap();
        let versions: Vec<&str> = listing.schemas.iter().map(|s| s.version.as_str()).collect();
        assert_eq!(versions, vec!["3.8.2", "4.1"]);

        let defaults: Vec<&str> = listing
            .schemas
            .iter()
            .filter(|s| s.default)
            .map(|s| s.source.as_str())
            .collect();
        assert_eq!(defaults, vec!["builtin:ern-382"]);
        assert!(listing.rules.is_none());
    }

    #[test]
    fn test_configured_schema_is_default() {
        let mut config = Config::default();
        config.validation.schema_source = Some(SchemaSource::Resource("ern-41".into()));

        let listing = build_listing(&SchemasArgs { rules: true }, &config).unwrap();
        let default = listing.schemas.iter().find(|s| s.default).unwrap();
        assert_eq!(default.version, "4.1");

        let rules = listing.rules.unwrap();
        assert_eq!(rules.len(), default_rules().len());
        assert!(rules.iter().any(|r| r.id == "deal-completeness"));
    }
}

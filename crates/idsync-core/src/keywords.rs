//! Keyword mappings for replaying exported files across environments.
//!
//! Exported files carry `{{KEYWORD}}` placeholders. The mapping used to fill
//! them comes from the global `keywordMappings` table unless the resource
//! type declares its own per-resource table.

use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{SyncError, SyncResult};
use crate::models::ResourceType;

/// Placeholder name to substitution value.
pub type KeywordMapping = BTreeMap<String, serde_yaml::Value>;

/// Per-resource keyword settings, keyed by resource name in the override table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceKeywordConfig {
    #[serde(default)]
    pub keyword_mappings: Option<KeywordMapping>,
}

/// Keyword configuration: one global default and optional per-type tables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordConfig {
    #[serde(default)]
    pub keyword_mappings: KeywordMapping,
    #[serde(default)]
    pub applications: Option<BTreeMap<String, ResourceKeywordConfig>>,
    #[serde(default)]
    pub identity_providers: Option<BTreeMap<String, ResourceKeywordConfig>>,
}

impl KeywordConfig {
    /// Override table declared for a resource type, if any.
    pub fn overrides_for(
        &self,
        resource_type: ResourceType,
    ) -> Option<&BTreeMap<String, ResourceKeywordConfig>> {
        match resource_type {
            ResourceType::Application => self.applications.as_ref(),
            ResourceType::IdentityProvider => self.identity_providers.as_ref(),
        }
    }
}

/// Resolve the keyword mapping for one resource.
///
/// With an override table for the type, resolution is delegated to
/// [`resolve_advanced`]; without one the global mapping is returned as is.
pub fn resolve_keywords(
    config: &KeywordConfig,
    resource_type: ResourceType,
    resource_name: &str,
) -> KeywordMapping {
    match config.overrides_for(resource_type) {
        Some(table) => resolve_advanced(resource_name, table, &config.keyword_mappings),
        None => config.keyword_mappings.clone(),
    }
}

/// Resolve a name against a per-resource table.
///
/// A name with its own `keywordMappings` gets them layered over `defaults`
/// (its own keys win). Any other name gets `defaults`.
pub fn resolve_advanced(
    resource_name: &str,
    table: &BTreeMap<String, ResourceKeywordConfig>,
    defaults: &KeywordMapping,
) -> KeywordMapping {
    let Some(own) = table
        .get(resource_name)
        .and_then(|entry| entry.keyword_mappings.as_ref())
    else {
        return defaults.clone();
    };

    debug!(resource = %resource_name, "using resource specific keyword mapping");
    let mut merged = defaults.clone();
    for (key, value) in own {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("Invalid placeholder pattern")
});

/// Result of expanding placeholders in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Placeholders with no mapping entry; left verbatim in `text`.
    pub unresolved: Vec<String>,
}

/// Replace `{{KEYWORD}}` placeholders with values from `mapping`.
///
/// Scalars are inserted as plain text. Sequences and mappings are inserted
/// as inline JSON, which is valid YAML flow syntax.
pub fn expand(text: &str, mapping: &KeywordMapping) -> SyncResult<Expansion> {
    let mut rendered = BTreeMap::new();
    for (key, value) in mapping {
        rendered.insert(key.as_str(), render_value(key, value)?);
    }

    let mut unresolved = BTreeSet::new();
    let text = PLACEHOLDER
        .replace_all(text, |caps: &Captures| match rendered.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                unresolved.insert(caps[1].to_string());
                caps[0].to_string()
            }
        })
        .into_owned();

    Ok(Expansion {
        text,
        unresolved: unresolved.into_iter().collect(),
    })
}

fn render_value(key: &str, value: &serde_yaml::Value) -> SyncResult<String> {
    use serde_yaml::Value;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        other => serde_json::to_string(other)
            .map_err(|e| SyncError::Template(format!("cannot render keyword '{key}': {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(yaml: &str) -> KeywordMapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn config(yaml: &str) -> KeywordConfig {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_no_override_table_returns_global_for_any_name() {
        let config = config("keywordMappings:\n  ENV: dev\n  PORT: 9443\n");

        for name in ["console", "", "does-not-exist", "My App"] {
            let resolved = resolve_keywords(&config, ResourceType::Application, name);
            assert_eq!(resolved, config.keyword_mappings);
        }
    }

    #[test]
    fn test_override_for_named_resource() {
        let config = config(
            r#"
keywordMappings:
  ENV: dev
  HOST: localhost
applications:
  console:
    keywordMappings:
      ENV: console-dev
"#,
        );

        let resolved = resolve_keywords(&config, ResourceType::Application, "console");
        assert_eq!(resolved["ENV"], serde_yaml::Value::from("console-dev"));
        assert_eq!(resolved["HOST"], serde_yaml::Value::from("localhost"));
    }

    #[test]
    fn test_override_table_without_entry_falls_back_to_global() {
        let config = config(
            r#"
keywordMappings:
  ENV: dev
applications:
  console:
    keywordMappings:
      ENV: console-dev
"#,
        );

        let resolved = resolve_keywords(&config, ResourceType::Application, "myaccount");
        assert_eq!(resolved, config.keyword_mappings);
    }

    #[test]
    fn test_override_table_is_per_type() {
        let config = config(
            r#"
keywordMappings:
  ENV: dev
applications:
  Google:
    keywordMappings:
      ENV: app-only
"#,
        );

        let resolved = resolve_keywords(&config, ResourceType::IdentityProvider, "Google");
        assert_eq!(resolved["ENV"], serde_yaml::Value::from("dev"));
    }

    #[test]
    fn test_entry_without_mappings_uses_defaults() {
        let table: BTreeMap<String, ResourceKeywordConfig> =
            serde_yaml::from_str("console: {}\n").unwrap();
        let defaults = mapping("ENV: dev\n");

        assert_eq!(resolve_advanced("console", &table, &defaults), defaults);
    }

    #[test]
    fn test_expand_scalars() {
        let mapping = mapping("HOST: iam.example.com\nPORT: 9443\nSECURE: true\n");
        let text = "url: https://{{HOST}}:{{ PORT }}/oauth2\nsecure: {{SECURE}}\n";

        let expansion = expand(text, &mapping).unwrap();
        assert_eq!(
            expansion.text,
            "url: https://iam.example.com:9443/oauth2\nsecure: true\n"
        );
        assert!(expansion.unresolved.is_empty());
    }

    #[test]
    fn test_expand_sequence_as_flow() {
        let mapping = mapping("ORIGINS:\n  - https://a.example.com\n  - https://b.example.com\n");
        let expansion = expand("allowedOrigins: {{ORIGINS}}\n", &mapping).unwrap();

        assert_eq!(
            expansion.text,
            "allowedOrigins: [\"https://a.example.com\",\"https://b.example.com\"]\n"
        );
        let parsed: serde_yaml::Value = serde_yaml::from_str(&expansion.text).unwrap();
        assert_eq!(parsed["allowedOrigins"].as_sequence().unwrap().len(), 2);
    }

    #[test]
    fn test_expand_reports_unresolved_once() {
        let mapping = mapping("ENV: dev\n");
        let expansion = expand("a: {{MISSING}}\nb: {{MISSING}}\nc: {{ENV}}\n", &mapping).unwrap();

        assert_eq!(expansion.text, "a: {{MISSING}}\nb: {{MISSING}}\nc: dev\n");
        assert_eq!(expansion.unresolved, vec!["MISSING".to_string()]);
    }
}

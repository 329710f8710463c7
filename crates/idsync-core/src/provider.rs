//! Resource providers.
//!
//! Each resource type supplies the same capability set; the reconciliation
//! driver works against [`ResourceProvider`] only.

use std::path::Path;
use tracing::{debug, warn};

use crate::auth::{self, AuthConfig};
use crate::config::ServerIdentity;
use crate::error::{SyncError, SyncResult};
use crate::guard;
use crate::keywords::{self, KeywordConfig, KeywordMapping};
use crate::lister::ResourceLister;
use crate::masking;
use crate::models::{Resource, ResourceType};
use crate::transport::ResourceTransport;

/// Outcome of preparing a local file for import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportCheck {
    /// File content with keywords expanded.
    pub content: String,
    /// Placeholders that had no keyword mapping.
    pub unresolved: Vec<String>,
    pub warnings: Vec<String>,
}

/// Capabilities of one remote resource type.
pub trait ResourceProvider {
    fn resource_type(&self) -> ResourceType;

    /// All remote resources of this type.
    fn list(&self) -> SyncResult<Vec<Resource>>;

    /// Total number of remote resources of this type.
    fn count(&self) -> SyncResult<u32>;

    /// YAML export of one remote resource.
    fn fetch_file(&self, resource: &Resource) -> SyncResult<String>;

    /// Keyword mapping for a resource name.
    fn resolve_keywords(&self, name: &str) -> KeywordMapping;

    /// Name the serialized resource declares for itself, if any.
    fn declared_name(&self, data: &str) -> SyncResult<Option<String>>;

    fn deployed_names(&self) -> SyncResult<Vec<String>> {
        Ok(self.list()?.into_iter().map(|r| r.name).collect())
    }

    /// Whether the serialized resource uses OAuth2. Always `false` for types
    /// without inbound authentication.
    fn is_oauth(&self, _data: &str) -> SyncResult<bool> {
        Ok(false)
    }

    /// Whether a local file must survive stale-file cleanup.
    fn is_protected(&self, _dir: &Path, _file_name: &str) -> SyncResult<bool> {
        Ok(false)
    }

    /// Transform an exported file before it is written to disk.
    fn prepare_for_export(&self, data: &str) -> SyncResult<String> {
        Ok(data.to_string())
    }

    /// Expand keywords in a local file and collect import warnings.
    fn check_import(&self, name: &str, data: &str) -> SyncResult<ImportCheck> {
        let mapping = self.resolve_keywords(name);
        let expansion = keywords::expand(data, &mapping)?;
        Ok(ImportCheck {
            content: expansion.text,
            unresolved: expansion.unresolved,
            warnings: Vec::new(),
        })
    }
}

/// Top-level string field of a YAML document; `None` when absent or null.
fn declared_field(data: &str, field: &str) -> SyncResult<Option<String>> {
    let document: serde_yaml::Value = serde_yaml::from_str(data)?;
    match document.get(field) {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(name)) => Ok(Some(name.clone())),
        Some(_) => Err(SyncError::Parse {
            source_name: format!("{field} field"),
            message: "expected a string".to_string(),
        }),
    }
}

fn fetch_resource_file<T: ResourceTransport>(
    transport: &T,
    resource_type: ResourceType,
    resource: &Resource,
) -> SyncResult<String> {
    let operation = format!("exporting {} {}", resource_type.label(), resource.name);
    let response = transport.get_resource_file(resource_type, &resource.id)?;

    if !response.is_success() {
        return Err(SyncError::status(operation, response.status));
    }

    String::from_utf8(response.body).map_err(|e| SyncError::Parse {
        source_name: operation,
        message: e.to_string(),
    })
}

/// Applications: OAuth2-aware, secret-masking, guarded.
#[derive(Debug)]
pub struct ApplicationProvider<'a, T> {
    lister: ResourceLister<T>,
    keywords: &'a KeywordConfig,
    identity: &'a ServerIdentity,
}

impl<'a, T: ResourceTransport> ApplicationProvider<'a, T> {
    pub fn new(transport: T, keywords: &'a KeywordConfig, identity: &'a ServerIdentity) -> Self {
        Self {
            lister: ResourceLister::new(transport),
            keywords,
            identity,
        }
    }
}

impl<T: ResourceTransport> ResourceProvider for ApplicationProvider<'_, T> {
    fn resource_type(&self) -> ResourceType {
        ResourceType::Application
    }

    fn list(&self) -> SyncResult<Vec<Resource>> {
        self.lister.get_list(ResourceType::Application)
    }

    fn count(&self) -> SyncResult<u32> {
        self.lister.get_total_count(ResourceType::Application)
    }

    fn fetch_file(&self, resource: &Resource) -> SyncResult<String> {
        fetch_resource_file(self.lister.transport(), ResourceType::Application, resource)
    }

    fn resolve_keywords(&self, name: &str) -> KeywordMapping {
        keywords::resolve_keywords(self.keywords, ResourceType::Application, name)
    }

    fn declared_name(&self, data: &str) -> SyncResult<Option<String>> {
        declared_field(data, "applicationName")
    }

    fn is_oauth(&self, data: &str) -> SyncResult<bool> {
        auth::is_oauth_app(data)
    }

    fn is_protected(&self, dir: &Path, file_name: &str) -> SyncResult<bool> {
        guard::is_protected_resource(dir, file_name, self.identity)
    }

    fn prepare_for_export(&self, data: &str) -> SyncResult<String> {
        if auth::is_oauth_app(data)? {
            debug!("masking OAuth consumer secret");
            return Ok(masking::mask_str(data).into_owned());
        }
        Ok(data.to_string())
    }

    fn check_import(&self, name: &str, data: &str) -> SyncResult<ImportCheck> {
        let mapping = self.resolve_keywords(name);
        let expansion = keywords::expand(data, &mapping)?;
        let config = AuthConfig::parse(&expansion.text)?;

        let mut warnings = Vec::new();
        if config.is_oauth() {
            let secret = config
                .request_configs()
                .iter()
                .filter(|c| c.is_oauth2())
                .find_map(|c| c.consumer_secret());
            match secret {
                None => warnings.push(format!(
                    "OAuth consumer secret not provided for application {name}; the server keeps its current secret"
                )),
                Some(s) if masking::is_masked(s) => warnings.push(format!(
                    "OAuth consumer secret of application {name} is masked; replace it or the server keeps its current secret"
                )),
                Some(_) => {}
            }
        }

        for warning in &warnings {
            warn!(application = %name, "{warning}");
        }

        Ok(ImportCheck {
            content: expansion.text,
            unresolved: expansion.unresolved,
            warnings,
        })
    }
}

/// Identity providers: no inbound authentication concept.
#[derive(Debug)]
pub struct IdentityProviderProvider<'a, T> {
    lister: ResourceLister<T>,
    keywords: &'a KeywordConfig,
}

impl<'a, T: ResourceTransport> IdentityProviderProvider<'a, T> {
    pub fn new(transport: T, keywords: &'a KeywordConfig) -> Self {
        Self {
            lister: ResourceLister::new(transport),
            keywords,
        }
    }
}

impl<T: ResourceTransport> ResourceProvider for IdentityProviderProvider<'_, T> {
    fn resource_type(&self) -> ResourceType {
        ResourceType::IdentityProvider
    }

    fn list(&self) -> SyncResult<Vec<Resource>> {
        self.lister.get_list(ResourceType::IdentityProvider)
    }

    fn count(&self) -> SyncResult<u32> {
        self.lister.get_total_count(ResourceType::IdentityProvider)
    }

    fn fetch_file(&self, resource: &Resource) -> SyncResult<String> {
        fetch_resource_file(
            self.lister.transport(),
            ResourceType::IdentityProvider,
            resource,
        )
    }

    fn resolve_keywords(&self, name: &str) -> KeywordMapping {
        keywords::resolve_keywords(self.keywords, ResourceType::IdentityProvider, name)
    }

    fn declared_name(&self, data: &str) -> SyncResult<Option<String>> {
        declared_field(data, "identityProviderName")
    }
}

/// Build the provider for a resource type.
pub fn provider_for<'a, T: ResourceTransport + 'a>(
    resource_type: ResourceType,
    transport: T,
    keywords: &'a KeywordConfig,
    identity: &'a ServerIdentity,
) -> Box<dyn ResourceProvider + 'a> {
    match resource_type {
        ResourceType::Application => {
            Box::new(ApplicationProvider::new(transport, keywords, identity))
        }
        ResourceType::IdentityProvider => {
            Box::new(IdentityProviderProvider::new(transport, keywords))
        }
    }
}

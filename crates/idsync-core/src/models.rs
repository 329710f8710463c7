//! Remote resource model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource types managed by the reconciliation subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    Application,
    IdentityProvider,
}

impl ResourceType {
    /// All supported resource types, in export order.
    pub const ALL: [ResourceType; 2] = [ResourceType::Application, ResourceType::IdentityProvider];

    /// Path segment of the list endpoint.
    pub fn api_path(&self) -> &'static str {
        match self {
            ResourceType::Application => "applications",
            ResourceType::IdentityProvider => "identity-providers",
        }
    }

    /// Field holding the items in a list response.
    pub fn items_field(&self) -> &'static str {
        match self {
            ResourceType::Application => "applications",
            ResourceType::IdentityProvider => "identityProviders",
        }
    }

    /// Path of the single-resource YAML export endpoint.
    pub fn export_path(&self, id: &str) -> String {
        match self {
            ResourceType::Application => format!("applications/{id}/exportFile"),
            ResourceType::IdentityProvider => format!("identity-providers/{id}/export"),
        }
    }

    /// Directory holding this type's files inside an export directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ResourceType::Application => "Applications",
            ResourceType::IdentityProvider => "IdentityProviders",
        }
    }

    /// Short label used in log lines and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ResourceType::Application => "application",
            ResourceType::IdentityProvider => "IDP",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_path())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "applications" | "application" | "apps" | "app" => Ok(ResourceType::Application),
            "identity-providers" | "identity-provider" | "idps" | "idp" => {
                Ok(ResourceType::IdentityProvider)
            }
            other => Err(format!(
                "unknown resource type '{other}' (expected 'applications' or 'identity-providers')"
            )),
        }
    }
}

/// One remote resource as returned by a list query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
}

/// Decoded list response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceList {
    /// Total number of resources on the server, independent of page size.
    pub total_results: u32,
    pub items: Vec<Resource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawList {
    #[serde(default)]
    total_results: u32,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl ResourceList {
    /// Decode a list response body for the given resource type.
    ///
    /// Missing `totalResults` or items fields decode as zero/empty; only a
    /// body that is not the expected shape is an error.
    pub fn from_json(resource_type: ResourceType, body: &[u8]) -> serde_json::Result<Self> {
        let mut raw: RawList = serde_json::from_slice(body)?;
        let items = match raw.rest.remove(resource_type.items_field()) {
            Some(serde_json::Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value)?,
        };

        Ok(Self {
            total_results: raw.total_results,
            items,
        })
    }
}

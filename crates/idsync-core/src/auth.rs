//! Inbound authentication configuration and auth-type classification.

use serde::{Deserialize, Deserializer};

use crate::error::{SyncError, SyncResult};

/// Marker of OAuth2 / OIDC inbound authentication (compared lower-cased).
pub const OAUTH2: &str = "oauth2";

/// The part of a resource file describing its inbound authentication.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub inbound_authentication_config: InboundAuthenticationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundAuthenticationConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub inbound_authentication_request_configs: Vec<InboundAuthRequestConfig>,
}

/// One protocol binding of a resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundAuthRequestConfig {
    #[serde(default, deserialize_with = "scalar_text")]
    pub inbound_auth_type: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub inbound_auth_key: Option<String>,
    #[serde(default)]
    pub inbound_configuration_protocol: Option<InboundConfigurationProtocol>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundConfigurationProtocol {
    #[serde(default, deserialize_with = "scalar_text")]
    pub oauth_consumer_secret: Option<String>,
}

impl InboundAuthRequestConfig {
    /// Whether this binding is OAuth2, in any letter casing.
    pub fn is_oauth2(&self) -> bool {
        self.inbound_auth_type
            .as_deref()
            .is_some_and(|t| t.to_lowercase() == OAUTH2)
    }

    /// Consumer secret, when one is present and non-empty.
    pub fn consumer_secret(&self) -> Option<&str> {
        self.inbound_configuration_protocol
            .as_ref()
            .and_then(|p| p.oauth_consumer_secret.as_deref())
            .filter(|s| !s.is_empty())
    }
}

impl AuthConfig {
    /// Parse the auth block out of a serialized resource file.
    pub fn parse(data: &str) -> SyncResult<Self> {
        serde_yaml::from_str(data).map_err(|e| SyncError::Parse {
            source_name: "auth config".to_string(),
            message: e.to_string(),
        })
    }

    pub fn request_configs(&self) -> &[InboundAuthRequestConfig] {
        &self
            .inbound_authentication_config
            .inbound_authentication_request_configs
    }

    pub fn is_oauth(&self) -> bool {
        self.request_configs().iter().any(InboundAuthRequestConfig::is_oauth2)
    }

    pub fn has_oauth_secret(&self) -> bool {
        self.request_configs()
            .iter()
            .any(|c| c.is_oauth2() && c.consumer_secret().is_some())
    }

    /// Whether any binding is keyed by `client_id`.
    pub fn has_auth_key(&self, client_id: &str) -> bool {
        self.request_configs()
            .iter()
            .any(|c| c.inbound_auth_key.as_deref() == Some(client_id))
    }
}

/// Whether the serialized resource declares an OAuth2 inbound binding.
///
/// Only malformed input is an error; no OAuth2 entry is a plain `false`.
pub fn is_oauth_app(data: &str) -> SyncResult<bool> {
    Ok(AuthConfig::parse(data)?.is_oauth())
}

/// Whether an OAuth2 binding in the serialized resource carries a secret.
pub fn is_secret_provided(data: &str) -> SyncResult<bool> {
    Ok(AuthConfig::parse(data)?.has_oauth_secret())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read any YAML scalar as text; `null` reads as absent.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {other:?}"
        ))),
    }
}

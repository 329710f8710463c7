//! HTTP transport to the identity server's management API.
//!
//! Every call returns a [`RawResponse`] whose body has already been read in
//! full, so connections are released on every path, including errors.

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::{SyncError, SyncResult};
use crate::models::ResourceType;

/// Page size for a list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// Only `totalResults` is wanted; no `limit` is sent.
    CountOnly,
    /// Ask for up to this many items.
    Limit(u32),
}

/// Status and fully drained body of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Requests the reconciliation subsystem makes against the server.
pub trait ResourceTransport {
    /// Issue a paginated list query.
    fn get_list(&self, resource_type: ResourceType, page: PageRequest) -> SyncResult<RawResponse>;

    /// Fetch the YAML export of one resource.
    fn get_resource_file(&self, resource_type: ResourceType, id: &str)
        -> SyncResult<RawResponse>;
}

impl<T: ResourceTransport + ?Sized> ResourceTransport for &T {
    fn get_list(&self, resource_type: ResourceType, page: PageRequest) -> SyncResult<RawResponse> {
        (**self).get_list(resource_type, page)
    }

    fn get_resource_file(
        &self,
        resource_type: ResourceType,
        id: &str,
    ) -> SyncResult<RawResponse> {
        (**self).get_resource_file(resource_type, id)
    }
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport from server settings.
    pub fn new(config: &ServerConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.tls_verify)
            .user_agent(concat!("idsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(config, client))
    }

    /// Create a transport with a pre-built client (for testing).
    pub fn with_client(config: &ServerConfig, client: Client) -> Self {
        let base_url = config.base_url.trim_end_matches('/');
        Self {
            client,
            api_base: format!("{}/t/{}/api/server/v1", base_url, config.tenant_domain),
            token: config.token.clone(),
        }
    }

    /// Base URL of the management API.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn get(&self, url: &str, query: &[(&str, String)], accept: &str) -> SyncResult<RawResponse> {
        debug!(url = %url, query = ?query, "GET");
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?;
        debug!(url = %url, status, bytes = body.len(), "response received");

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

impl ResourceTransport for HttpTransport {
    fn get_list(&self, resource_type: ResourceType, page: PageRequest) -> SyncResult<RawResponse> {
        let url = format!("{}/{}", self.api_base, resource_type.api_path());
        let query = match page {
            PageRequest::CountOnly => Vec::new(),
            PageRequest::Limit(limit) => vec![("limit", limit.to_string())],
        };
        self.get(&url, &query, "application/json")
    }

    fn get_resource_file(
        &self,
        resource_type: ResourceType,
        id: &str,
    ) -> SyncResult<RawResponse> {
        let url = format!("{}/{}", self.api_base, resource_type.export_path(id));
        self.get(&url, &[], "application/yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_config(base_url: &str) -> ServerConfig {
        serde_yaml::from_str(&format!("base_url: {base_url}\n")).unwrap()
    }

    #[test]
    fn test_api_base_includes_tenant() {
        let transport = HttpTransport::new(&server_config("https://localhost:9443/")).unwrap();
        assert_eq!(
            transport.api_base(),
            "https://localhost:9443/t/carbon.super/api/server/v1"
        );
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(302, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }

    #[test]
    fn test_raw_response_text_lossy() {
        let response = RawResponse::new(200, vec![b'o', b'k', 0xff]);
        assert!(response.text().starts_with("ok"));
    }
}

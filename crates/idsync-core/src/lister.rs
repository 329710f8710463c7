//! Paginated listing with count discovery.

use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};
use crate::models::{Resource, ResourceList, ResourceType};
use crate::transport::{PageRequest, ResourceTransport};

/// Page size used when the total count cannot be discovered.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Lists remote resources of any type through a [`ResourceTransport`].
#[derive(Debug, Clone)]
pub struct ResourceLister<T> {
    transport: T,
}

impl<T: ResourceTransport> ResourceLister<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Discover how many resources of this type exist.
    ///
    /// Any failure here is recoverable: [`ResourceLister::get_list`] falls
    /// back to [`DEFAULT_PAGE_SIZE`].
    pub fn get_total_count(&self, resource_type: ResourceType) -> SyncResult<u32> {
        let label = resource_type.label();
        let response = self
            .transport
            .get_list(resource_type, PageRequest::CountOnly)
            .map_err(|e| match e {
                SyncError::Network(msg) => {
                    SyncError::Network(format!("failed to retrieve available {label} list. {msg}"))
                }
                other => other,
            })?;

        if !response.is_success() {
            return Err(SyncError::status(
                format!("retrieving {label} count"),
                response.status,
            ));
        }

        let list = ResourceList::from_json(resource_type, &response.body).map_err(|e| {
            SyncError::Parse {
                source_name: format!("retrieved {label} count"),
                message: e.to_string(),
            }
        })?;

        debug!(resource_type = %resource_type, count = list.total_results, "discovered resource count");
        Ok(list.total_results)
    }

    /// Fetch every resource of this type, in server order.
    pub fn get_list(&self, resource_type: ResourceType) -> SyncResult<Vec<Resource>> {
        let label = resource_type.label();
        let count = match self.get_total_count(resource_type) {
            Ok(count) => count,
            Err(e) => {
                warn!(
                    resource_type = %resource_type,
                    error = %e,
                    default_page_size = DEFAULT_PAGE_SIZE,
                    "Error while retrieving {label} count. Retrieving only the default count."
                );
                DEFAULT_PAGE_SIZE
            }
        };

        let response = self
            .transport
            .get_list(resource_type, PageRequest::Limit(count))?;

        if !response.is_success() {
            return Err(SyncError::status(
                format!("retrieving {label} list"),
                response.status,
            ));
        }

        let list = ResourceList::from_json(resource_type, &response.body).map_err(|e| {
            SyncError::Decode {
                operation: format!("decoding the retrieved {label} list"),
                message: e.to_string(),
            }
        })?;

        if (list.items.len() as u64) < u64::from(list.total_results.min(count)) {
            warn!(
                resource_type = %resource_type,
                received = list.items.len(),
                total = list.total_results,
                "server returned fewer items than requested"
            );
        }

        Ok(list.items)
    }

    /// Names of the resources currently deployed on the server.
    pub fn get_deployed_names(&self, resource_type: ResourceType) -> SyncResult<Vec<String>> {
        Ok(self
            .get_list(resource_type)?
            .into_iter()
            .map(|r| r.name)
            .collect())
    }
}
